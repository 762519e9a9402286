//! Response bodies. Reads are bare JSON arrays of row objects; writes are
//! `{"status":"success"}` with extra fields where an endpoint carries them.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusBody {
    pub status: &'static str,
}

/// Login payload: user row (hash already stripped by serialization) plus token.
#[derive(Serialize)]
pub struct LoginBody<T: Serialize> {
    pub status: &'static str,
    pub user: T,
    pub token: String,
}

#[derive(Serialize)]
pub struct UploadBody {
    pub status: &'static str,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

pub fn success() -> Json<StatusBody> {
    Json(StatusBody { status: "success" })
}

/// Bare array body for list reads.
pub fn rows<T: Serialize>(rows: Vec<T>) -> Json<Vec<T>> {
    Json(rows)
}

/// Single-row helpers (`get_user_details`, `get_live_status`) return the row
/// object, or `{}` when absent, matching the legacy wire shape.
pub fn row_or_empty<T: Serialize>(row: Option<T>) -> Json<serde_json::Value> {
    match row {
        Some(r) => Json(serde_json::to_value(r).unwrap_or_else(|_| serde_json::json!({}))),
        None => Json(serde_json::json!({})),
    }
}

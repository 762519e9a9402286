//! Resources group: the standalone resource listing and upload actions.
//! Listing here orders by upload time, unlike the mentorship group's
//! id ordering.

use crate::auth::Session;
use crate::db::resources::{self, NewResource, ResourceOrder};
use crate::error::AppError;
use crate::response;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ResourcesPost {
    AddResource(NewResource),
}

pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    match super::param(&params, "action")? {
        "get_resources" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            let rows = resources::list(&state.pool, mentor_id, ResourceOrder::NewestFirst).await?;
            Ok(response::rows(rows).into_response())
        }
        other => Err(AppError::Validation(format!("unknown action '{}'", other))),
    }
}

pub async fn post(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let v = super::require_body(body)?;
    match super::decode_action::<ResourcesPost>(v, None)? {
        ResourcesPost::AddResource(form) => {
            session.require_uid(&form.mentor_id)?;
            resources::insert(&state.pool, &form).await?;
            Ok(response::success().into_response())
        }
    }
}

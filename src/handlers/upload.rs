//! File uploads. Files land in the configured upload directory under a
//! timestamp-prefixed name and are served back via the static `/uploads`
//! route.

use crate::auth::Session;
use crate::error::AppError;
use crate::response::UploadBody;
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;

/// Strip any path components and unusual characters from a client-supplied
/// file name. Never trusts the client for the on-disk path.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "file".into()
    } else {
        cleaned
    }
}

pub async fn upload(
    State(state): State<AppState>,
    _session: Session,
    mut multipart: Multipart,
) -> Result<Json<UploadBody>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("file").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {}", e)))?;

        let stored = format!("{}_{}", Utc::now().timestamp(), sanitize_filename(&original));
        let dir = &state.settings.upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("cannot create upload dir: {}", e)))?;
        let path = std::path::Path::new(dir).join(&stored);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(format!("cannot write upload: {}", e)))?;

        let file_url = format!(
            "{}/uploads/{}",
            state.settings.public_base_url.trim_end_matches('/'),
            stored
        );
        tracing::info!(name = %stored, size = data.len(), "file uploaded");
        return Ok(Json(UploadBody {
            status: "success",
            file_url,
        }));
    }
    Err(AppError::Validation("no file field in request".into()))
}

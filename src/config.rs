//! Environment-driven settings. `.env` is loaded by main before this runs.

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Directory uploaded files are written to; created on demand.
    pub upload_dir: String,
    /// Base URL prepended to stored file names to form `fileUrl` responses.
    /// Explicit config rather than trusting the request Host header.
    pub public_base_url: String,
    pub jwt_secret: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Internal("DATABASE_URL is not set".into()))?;
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal("JWT_SECRET is not set".into()))?;
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", bind_addr));
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Ok(Settings {
            database_url,
            bind_addr,
            upload_dir,
            public_base_url,
            jwt_secret,
            request_timeout_secs,
        })
    }
}

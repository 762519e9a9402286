//! Registration and login.

use crate::auth::{hash_password, issue_token, verify_password};
use crate::db::users::{self, NewUser};
use crate::error::{is_unique_violation, unique_constraint, AppError};
use crate::response::{self, LoginBody, StatusBody};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"))
}

fn validate_registration(form: &NewUser) -> Result<(), AppError> {
    if !email_regex().is_match(form.email.trim()) {
        return Err(AppError::Validation("invalid email address".into()));
    }
    if form.password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }
    if form.role != "mentor" && form.role != "student" {
        return Err(AppError::Validation(
            "role must be 'mentor' or 'student'".into(),
        ));
    }
    if form.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(())
}

/// Duplicate-key message keyed on the violated constraint: the uid index
/// and the email key are distinct conflicts.
fn registration_conflict(constraint: Option<&str>) -> AppError {
    match constraint {
        Some("users_uid_key") => AppError::Conflict("Uid already registered".into()),
        _ => AppError::Conflict("Email already registered".into()),
    }
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusBody>, AppError> {
    let v = super::require_body(body)?;
    let form: NewUser = serde_json::from_value(v)
        .map_err(|e| AppError::Validation(format!("invalid request: {}", e)))?;
    validate_registration(&form)?;
    let hash = hash_password(&form.password);
    users::insert(&state.pool, &form, &hash).await.map_err(|e| match e {
        AppError::Db(ref db) if is_unique_violation(db) => {
            registration_conflict(unique_constraint(db))
        }
        other => other,
    })?;
    tracing::info!(email = %form.email, role = %form.role, "user registered");
    Ok(response::success())
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    #[serde(default)]
    uid: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LoginBody<crate::models::User>>, AppError> {
    let v = super::require_body(body)?;
    let form: LoginForm = serde_json::from_value(v)
        .map_err(|e| AppError::Validation(format!("invalid request: {}", e)))?;

    let mut user = users::find_by_email(&state.pool, &form.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    if !verify_password(&form.password, &user.password) {
        return Err(AppError::Unauthorized("Wrong password".into()));
    }

    // One-time uid sync: accounts predating the device id get it persisted
    // on first login. Idempotent; never overwrites an existing uid.
    if let Some(uid) = form.uid.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        if user.uid.as_deref().map(str::trim).unwrap_or("").is_empty() {
            users::backfill_uid(&state.pool, &form.email, uid).await?;
            user.uid = Some(uid.to_string());
        }
    }

    // A token with an empty subject would pass no ownership check but must
    // not exist at all; legacy rows without a uid have to supply one here.
    let uid = user.uid.clone().unwrap_or_default();
    if uid.trim().is_empty() {
        return Err(AppError::Unauthorized(
            "Account has no uid; include a uid when logging in".into(),
        ));
    }
    let token = issue_token(&state.settings.jwt_secret, &uid, &user.role)?;
    tracing::debug!(email = %form.email, "login ok");
    Ok(Json(LoginBody {
        status: "success",
        user,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, role: &str, password: &str) -> NewUser {
        serde_json::from_value(serde_json::json!({
            "uid": "u1",
            "name": "Name",
            "email": email,
            "password": password,
            "role": role,
            "phone": "123"
        }))
        .unwrap()
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validate_registration(&form("a@b.co", "student", "pw")).is_ok());
        assert!(validate_registration(&form("a@b.co", "mentor", "pw")).is_ok());
    }

    #[test]
    fn rejects_bad_email_role_or_password() {
        assert!(validate_registration(&form("not-an-email", "student", "pw")).is_err());
        assert!(validate_registration(&form("a@b.co", "admin", "pw")).is_err());
        assert!(validate_registration(&form("a@b.co", "student", "")).is_err());
    }

    #[test]
    fn conflict_message_follows_the_violated_constraint() {
        assert_eq!(
            registration_conflict(Some("users_uid_key")).to_string(),
            "Uid already registered"
        );
        assert_eq!(
            registration_conflict(Some("users_email_key")).to_string(),
            "Email already registered"
        );
        assert_eq!(
            registration_conflict(None).to_string(),
            "Email already registered"
        );
    }
}

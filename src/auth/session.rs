//! Bearer-token sessions: login issues an HS256 JWT; write handlers extract
//! a `Session` from the Authorization header and check ownership against the
//! identity fields in the request.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime: seven days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's `uid`.
    pub sub: String,
    pub role: String,
    pub jti: String,
    pub exp: i64,
}

pub fn issue_token(secret: &str, uid: &str, role: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: uid.to_string(),
        role: role.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding: {}", e)))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("token validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".into())
    })
}

/// Authenticated caller. Required on every write handler.
#[derive(Clone, Debug)]
pub struct Session {
    pub uid: String,
    pub role: String,
}

impl Session {
    /// Writes must act on the caller's own identity: the uid named in the
    /// request has to match the session uid. Blank identities never match,
    /// so a token minted without a uid cannot act on rows with empty
    /// identity fields.
    pub fn require_uid(&self, uid: &str) -> Result<(), AppError> {
        let own = self.uid.trim();
        let requested = uid.trim();
        if !own.is_empty() && own == requested {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "Caller identity does not match the acted-on user".into(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Expected Bearer token".into()))?;
        let claims = verify_token(&state.settings.jwt_secret, token.trim())?;
        Ok(Session {
            uid: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = issue_token("test-secret", "u-42", "mentor").unwrap();
        let claims = verify_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, "u-42");
        assert_eq!(claims.role, "mentor");
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret-a", "u-42", "student").unwrap();
        assert!(verify_token("secret-b", &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("secret", "not.a.jwt").is_err());
    }

    #[test]
    fn require_uid_trims_before_comparing() {
        let s = Session {
            uid: "u-1".into(),
            role: "student".into(),
        };
        assert!(s.require_uid(" u-1 ").is_ok());
        assert!(s.require_uid("u-2").is_err());
    }

    #[test]
    fn blank_identities_never_match() {
        let blank = Session {
            uid: "  ".into(),
            role: "student".into(),
        };
        assert!(blank.require_uid("").is_err());
        assert!(blank.require_uid("u-1").is_err());

        let s = Session {
            uid: "u-1".into(),
            role: "student".into(),
        };
        assert!(s.require_uid("").is_err());
    }
}

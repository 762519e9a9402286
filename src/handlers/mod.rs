//! HTTP handlers, one module per endpoint group. POST bodies carry a tagged
//! `action` field and deserialize into per-group enums, so unknown actions
//! fail statically instead of being silently ignored.

pub mod auth;
pub mod courses;
pub mod mentorship;
pub mod resources;
pub mod tasks;
pub mod upload;

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

/// Unwrap a JSON body, keeping the legacy message for missing or
/// undecodable POST bodies.
pub(crate) fn require_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(v)) => Ok(v),
        Err(_) => Err(AppError::Validation("No data provided".into())),
    }
}

/// Decode a tagged action body into the group's action enum. Groups with a
/// default action (courses) get it injected when the tag is absent.
pub(crate) fn decode_action<T: serde::de::DeserializeOwned>(
    body: Value,
    default_action: Option<&str>,
) -> Result<T, AppError> {
    let mut obj = match body {
        Value::Object(m) => m,
        _ => return Err(AppError::Validation("No data provided".into())),
    };
    if !obj.contains_key("action") {
        match default_action {
            Some(a) => {
                obj.insert("action".into(), Value::String(a.to_string()));
            }
            None => return Err(AppError::Validation("missing 'action'".into())),
        }
    }
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| AppError::Validation(format!("invalid request: {}", e)))
}

/// Required string parameter from a GET query.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Result<&'a str, AppError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::Validation(format!("missing '{}'", key)))
}

/// Required integer parameter from a GET query (sent as a string).
pub(crate) fn param_i64(params: &HashMap<String, String>, key: &str) -> Result<i64, AppError> {
    param(params, key)?
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("'{}' must be a number", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(tag = "action", rename_all = "snake_case")]
    enum Probe {
        AddThing { name: String },
        ListThings {},
    }

    #[test]
    fn decodes_tagged_action() {
        let v = json!({"action": "add_thing", "name": "x"});
        assert_eq!(
            decode_action::<Probe>(v, None).unwrap(),
            Probe::AddThing { name: "x".into() }
        );
    }

    #[test]
    fn injects_default_action() {
        let v = json!({"name": "x"});
        assert_eq!(
            decode_action::<Probe>(v, Some("add_thing")).unwrap(),
            Probe::AddThing { name: "x".into() }
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        let v = json!({"action": "drop_things"});
        assert!(decode_action::<Probe>(v, None).is_err());
    }

    #[test]
    fn missing_action_without_default_is_rejected() {
        let v = json!({"name": "x"});
        assert!(decode_action::<Probe>(v, None).is_err());
    }

    #[test]
    fn non_object_body_is_no_data() {
        let err = decode_action::<Probe>(json!([1, 2]), None).unwrap_err();
        assert!(err.to_string().contains("No data provided"));
    }
}

//! Courses group: course and module reads/writes. `get_courses` and
//! `add_course` are the group's default actions.

use crate::auth::Session;
use crate::db::courses::{self, NewCourse, NewModule};
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
enum CoursesPost {
    AddCourse(NewCourse),
    AddModule(NewModule),
}

pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let action = params.get("action").map(String::as_str).unwrap_or("get_courses");
    match action {
        "get_courses" => {
            let mentor_id = params.get("mentor_id").map(String::as_str);
            let rows = courses::list(&state.pool, mentor_id).await?;
            Ok(response::rows(rows).into_response())
        }
        "get_modules" => {
            let course_id = super::param_i64(&params, "course_id")?;
            let rows = courses::modules(&state.pool, course_id).await?;
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
    match super::decode_action::<CoursesPost>(v, Some("add_course"))? {
        CoursesPost::AddCourse(course) => {
            session.require_uid(&course.mentor_id)?;
            courses::insert(&state.pool, &course).await?;
            Ok(response::success().into_response())
        }
        CoursesPost::AddModule(module) => {
            let owner = courses::owner(&state.pool, module.course_id)
                .await?
                .ok_or_else(|| AppError::NotFound("course not found".into()))?;
            session.require_uid(&owner)?;
            courses::insert_module(&state.pool, &module).await?;
            Ok(response::success().into_response())
        }
    }
}

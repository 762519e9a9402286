//! Tasks group: assignment, submission, and evaluation.

use crate::auth::Session;
use crate::db::{
    courses,
    tasks::{self, EvaluateTaskForm, NewTask, SubmitTaskForm},
};
use crate::error::AppError;
use crate::idset::parse_id_set;
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
enum TasksPost {
    AddTask(NewTask),
    SubmitTask(SubmitTaskForm),
    EvaluateTask(EvaluateTaskForm),
}

pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    match super::param(&params, "action")? {
        "get_tasks" => {
            let course_id = super::param_i64(&params, "course_id")?;
            let student_id = super::param(&params, "student_id")?;
            let role = params.get("role").map(String::as_str).unwrap_or("student");
            if role == "mentor" {
                let rows = tasks::mentor_view(&state.pool, course_id, student_id).await?;
                Ok(response::rows(rows).into_response())
            } else {
                let rows = tasks::student_view(&state.pool, course_id, student_id).await?;
                Ok(response::rows(rows).into_response())
            }
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
    match super::decode_action::<TasksPost>(v, None)? {
        TasksPost::AddTask(form) => {
            let owner = courses::owner(&state.pool, form.course_id)
                .await?
                .ok_or_else(|| AppError::NotFound("course not found".into()))?;
            session.require_uid(&owner)?;
            let assigned = parse_id_set(&form.assigned_student_ids);
            tasks::insert(&state.pool, &form, &assigned).await?;
            Ok(response::success().into_response())
        }
        TasksPost::SubmitTask(form) => {
            session.require_uid(&form.student_id)?;
            tasks::submit(&state.pool, &form).await?;
            Ok(response::success().into_response())
        }
        TasksPost::EvaluateTask(form) => {
            let affected = tasks::evaluate(&state.pool, &form, &session.uid).await?;
            if affected == 0 {
                return Err(AppError::NotFound("submission not found".into()));
            }
            Ok(response::success().into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_task_decodes_string_numbers() {
        let v = json!({
            "action": "add_task",
            "course_id": "4",
            "title": "Essay",
            "description": "Write one",
            "total_marks": "100",
            "assigned_student_ids": "s1, s2, s1"
        });
        match crate::handlers::decode_action::<TasksPost>(v, None).unwrap() {
            TasksPost::AddTask(f) => {
                assert_eq!(f.course_id, 4);
                assert_eq!(f.total_marks, 100);
                assert_eq!(parse_id_set(&f.assigned_student_ids), vec!["s1", "s2"]);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn evaluate_defaults_status() {
        let v = json!({
            "action": "evaluate_task",
            "submission_id": 9,
            "obtained_marks": 85
        });
        match crate::handlers::decode_action::<TasksPost>(v, None).unwrap() {
            TasksPost::EvaluateTask(f) => {
                assert_eq!(f.submission_id, 9);
                assert_eq!(f.status, "evaluated");
                assert_eq!(f.feedback, "");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

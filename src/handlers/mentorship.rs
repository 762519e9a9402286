//! Mentorship group: discovery, the application workflow, quizzes, live
//! status, resources, reviews, and profile updates.

use crate::auth::Session;
use crate::db::applications::{self, ApplyForm, CertificateForm, UpdateStatusForm};
use crate::db::quizzes::{self, QuizForm, QuizResultForm};
use crate::db::resources::{self, NewResource, NewReview, ResourceOrder};
use crate::db::users::{self, LiveStatusForm, ProfileForm};
use crate::error::AppError;
use crate::idset::parse_id_set;
use crate::models::ApplicationStatus;
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
enum MentorshipPost {
    Apply(ApplyForm),
    UpdateStatus(UpdateStatusForm),
    IssueCertificate(CertificateForm),
    CreateQuiz(QuizForm),
    SaveQuizResult(QuizResultForm),
    UpdateLiveStatus(LiveStatusForm),
    AddResource(NewResource),
    AddReview(NewReview),
    UpdateProfile(ProfileForm),
}

pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let action = super::param(&params, "action")?;
    let pool = &state.pool;
    match action {
        "get_mentors" => Ok(response::rows(users::mentors(pool).await?).into_response()),
        "get_my_students" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(applications::mentees_for_mentor(pool, mentor_id).await?).into_response())
        }
        "get_requests" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(applications::requests_for_mentor(pool, mentor_id).await?).into_response())
        }
        "get_my_mentors" => {
            let student_id = super::param(&params, "student_id")?;
            Ok(response::rows(applications::mentors_for_student(pool, student_id).await?).into_response())
        }
        "get_resources" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(resources::list(pool, mentor_id, ResourceOrder::LatestId).await?).into_response())
        }
        "get_all_quiz_results" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(quizzes::results_for_mentor(pool, mentor_id).await?).into_response())
        }
        "get_reviews" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(resources::reviews_for_mentor(pool, mentor_id).await?).into_response())
        }
        "get_user_details" => {
            let uid = super::param(&params, "uid")?;
            Ok(response::row_or_empty(users::find_by_uid(pool, uid).await?).into_response())
        }
        "get_student_applications" => {
            let student_id = super::param(&params, "student_id")?;
            Ok(response::rows(applications::for_student(pool, student_id).await?).into_response())
        }
        "get_live_status" => {
            let uid = super::param(&params, "uid")?;
            Ok(response::row_or_empty(users::live_status(pool, uid).await?).into_response())
        }
        "get_quizzes" => {
            let mentor_id = super::param(&params, "mentor_id")?;
            Ok(response::rows(quizzes::by_mentor(pool, mentor_id).await?).into_response())
        }
        "get_questions" => {
            let quiz_id = super::param_i64(&params, "quiz_id")?;
            Ok(response::rows(quizzes::questions(pool, quiz_id).await?).into_response())
        }
        "get_quiz_history" => {
            let student_id = super::param(&params, "student_id")?;
            Ok(response::rows(quizzes::history_for_student(pool, student_id).await?).into_response())
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
    let pool = &state.pool;
    match super::decode_action::<MentorshipPost>(v, None)? {
        MentorshipPost::Apply(form) => {
            session.require_uid(&form.student_id)?;
            applications::apply(pool, &form).await?;
            Ok(response::success().into_response())
        }
        MentorshipPost::UpdateStatus(form) => {
            let status = ApplicationStatus::parse(&form.status).ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid status '{}'; expected pending, accepted or rejected",
                    form.status
                ))
            })?;
            let affected =
                applications::update_status(pool, form.request_id, status, &session.uid).await?;
            if affected == 0 {
                return Err(AppError::NotFound("application not found".into()));
            }
            Ok(response::success().into_response())
        }
        MentorshipPost::IssueCertificate(form) => {
            session.require_uid(&form.mentor_id)?;
            let affected =
                applications::issue_certificate(pool, &form.mentor_id, &form.student_id).await?;
            if affected == 0 {
                return Err(AppError::NotFound(
                    "no accepted application for this student".into(),
                ));
            }
            Ok(response::success().into_response())
        }
        MentorshipPost::CreateQuiz(form) => {
            session.require_uid(&form.mentor_id)?;
            let assigned = parse_id_set(&form.assigned_student_ids);
            quizzes::create(pool, &form, &assigned).await?;
            Ok(response::success().into_response())
        }
        MentorshipPost::SaveQuizResult(form) => {
            if form.student_id.trim().is_empty() || form.quiz_id.trim().is_empty() {
                return Err(AppError::Validation("Missing IDs".into()));
            }
            session.require_uid(&form.student_id)?;
            let quiz_id: i64 = form
                .quiz_id
                .trim()
                .parse()
                .map_err(|_| AppError::Validation("'quiz_id' must be a number".into()))?;
            quizzes::save_result(pool, &form, quiz_id).await?;
            Ok(response::success().into_response())
        }
        MentorshipPost::UpdateLiveStatus(form) => {
            session.require_uid(&form.uid)?;
            let affected = users::update_live_status(pool, &form).await?;
            if affected == 0 {
                return Err(AppError::NotFound("user not found".into()));
            }
            Ok(response::success().into_response())
        }
        MentorshipPost::AddResource(form) => {
            session.require_uid(&form.mentor_id)?;
            resources::insert(pool, &form).await?;
            Ok(response::success().into_response())
        }
        MentorshipPost::AddReview(form) => {
            session.require_uid(&form.student_id)?;
            resources::insert_review(pool, &form).await?;
            Ok(response::success().into_response())
        }
        MentorshipPost::UpdateProfile(form) => {
            session.require_uid(&form.uid)?;
            let affected = users::update_profile(pool, &form).await?;
            if affected == 0 {
                return Err(AppError::NotFound("user not found".into()));
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
    fn apply_decodes_with_defaults() {
        let v = json!({
            "action": "apply",
            "student_id": "s1",
            "mentor_id": "m1",
            "education": "BSc"
        });
        match crate::handlers::decode_action::<MentorshipPost>(v, None).unwrap() {
            MentorshipPost::Apply(f) => {
                assert_eq!(f.student_id, "s1");
                assert_eq!(f.education, "BSc");
                assert_eq!(f.reason, "");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn update_status_accepts_string_request_id() {
        let v = json!({"action": "update_status", "request_id": "7", "status": "accepted"});
        match crate::handlers::decode_action::<MentorshipPost>(v, None).unwrap() {
            MentorshipPost::UpdateStatus(f) => {
                assert_eq!(f.request_id, 7);
                assert_eq!(f.status, "accepted");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn create_quiz_decodes_questions() {
        let v = json!({
            "action": "create_quiz",
            "mentor_id": "m1",
            "course_id": "3",
            "course_name": "Rust",
            "title": "Basics",
            "assigned_student_ids": "s1,s2",
            "questions": [
                {"text": "Q1", "a": "1", "b": "2", "c": "3", "d": "4", "correct": "a"}
            ]
        });
        match crate::handlers::decode_action::<MentorshipPost>(v, None).unwrap() {
            MentorshipPost::CreateQuiz(f) => {
                assert_eq!(f.course_id, 3);
                assert_eq!(f.questions.len(), 1);
                assert_eq!(f.questions[0].correct, "a");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let v = json!({"action": "drop_everything"});
        assert!(crate::handlers::decode_action::<MentorshipPost>(v, None).is_err());
    }
}

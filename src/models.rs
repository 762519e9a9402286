//! Typed row structs and the application status enum. Reads serialize
//! straight to the wire, so field names here are the response contract.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Application workflow states. Stored lowercase; parsing is
/// case-insensitive so legacy mixed-case rows and clients still match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pending") {
            Some(Self::Pending)
        } else if s.eq_ignore_ascii_case("accepted") {
            Some(Self::Accepted)
        } else if s.eq_ignore_ascii_case("rejected") {
            Some(Self::Rejected)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// A user row. The password hash never serializes, so every read that
/// returns user rows (mentor discovery, login, user details) is safe by
/// construction.
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub uid: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub bio: Option<String>,
    pub portfolio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub is_live: bool,
    pub live_room: Option<String>,
    pub live_assigned_students: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct Application {
    pub id: i64,
    pub student_id: String,
    pub mentor_id: String,
    pub education: Option<String>,
    pub interest: Option<String>,
    pub reason: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub status: String,
    pub is_certified: bool,
    pub created_at: DateTime<Utc>,
}

/// Accepted mentee with the student's profile joined in
/// (`get_my_students`): enrollment fields plus the user columns the
/// clients expect alongside them.
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct MenteeRow {
    pub id: i64,
    pub student_id: String,
    pub mentor_id: String,
    pub education: Option<String>,
    pub interest: Option<String>,
    pub reason: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub status: String,
    pub is_certified: bool,
    pub created_at: DateTime<Utc>,
    pub uid: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub bio: Option<String>,
}

/// Pending request with applicant name/email (`get_requests`).
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct RequestRow {
    pub id: i64,
    pub student_id: String,
    pub mentor_id: String,
    pub education: Option<String>,
    pub interest: Option<String>,
    pub reason: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub status: String,
    pub is_certified: bool,
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub duration_hours: i64,
    pub course_code: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct CourseModule {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub file_url: String,
    pub order_index: i32,
}

/// Task row for the student view: only tasks assigned to the student, with
/// that student's submission columns (if any) joined in.
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct StudentTaskRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub total_marks: i64,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub assigned_student_ids: String,
    pub submission_status: Option<String>,
    pub obtained_marks: Option<i64>,
    pub feedback: Option<String>,
    pub student_file_url: Option<String>,
}

/// Task row for the mentor view: same membership filter, but submission
/// columns are bound to the one requested student and the file column keeps
/// its mentor-side alias.
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct MentorTaskRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub total_marks: i64,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub assigned_student_ids: String,
    pub submission_id: Option<i64>,
    pub submission_status: Option<String>,
    pub obtained_marks: Option<i64>,
    pub feedback: Option<String>,
    pub submission_file_url: Option<String>,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub mentor_id: String,
    pub course_id: i64,
    pub course_name: String,
    pub title: String,
    pub description: String,
    pub assigned_student_ids: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
}

/// Mentor report row (`get_all_quiz_results`).
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct QuizResultReport {
    pub id: i64,
    pub student_id: String,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub attempted_at: DateTime<Utc>,
    pub quiz_title: String,
    pub student_name: String,
}

/// Student history row (`get_quiz_history`).
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct QuizHistoryRow {
    pub id: i64,
    pub student_id: String,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub attempted_at: DateTime<Utc>,
    pub title: String,
    pub course_name: String,
    pub mentor_id: String,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct Resource {
    pub id: i64,
    pub mentor_id: String,
    pub title: String,
    pub category: String,
    pub file_url: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub mentor_id: String,
    pub student_id: String,
    pub student_name: String,
    pub rating: f64,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

/// The three ephemeral live-session fields (`get_live_status`).
#[derive(Clone, Debug, FromRow, Serialize)]
pub struct LiveStatus {
    pub is_live: bool,
    pub live_room: Option<String>,
    pub live_assigned_students: Option<String>,
}

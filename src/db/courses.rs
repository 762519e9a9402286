//! Courses and their ordered modules.

use crate::de;
use crate::error::AppError;
use crate::models::{Course, CourseModule};
use serde::Deserialize;
use sqlx::PgPool;

fn default_course_code() -> String {
    "N/A".into()
}

fn default_category() -> String {
    "General".into()
}

#[derive(Debug, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub mentor_id: String,
    pub mentor_name: String,
    #[serde(deserialize_with = "de::flexible_i64")]
    pub duration_hours: i64,
    #[serde(default = "default_course_code")]
    pub course_code: String,
    #[serde(default = "default_category")]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct NewModule {
    #[serde(deserialize_with = "de::flexible_i64")]
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default, deserialize_with = "de::flexible_i32")]
    pub order_index: i32,
}

/// All courses, or one mentor's, newest first.
pub async fn list(pool: &PgPool, mentor_id: Option<&str>) -> Result<Vec<Course>, AppError> {
    let rows = match mentor_id.filter(|m| !m.is_empty()) {
        Some(m) => {
            sqlx::query_as::<_, Course>(
                "SELECT * FROM courses WHERE mentor_id = $1 ORDER BY id DESC",
            )
            .bind(m)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id DESC")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

/// Modules of a course in display order.
pub async fn modules(pool: &PgPool, course_id: i64) -> Result<Vec<CourseModule>, AppError> {
    let rows = sqlx::query_as::<_, CourseModule>(
        "SELECT * FROM course_modules WHERE course_id = $1 ORDER BY order_index ASC",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert(pool: &PgPool, course: &NewCourse) -> Result<(), AppError> {
    tracing::debug!(title = %course.title, mentor = %course.mentor_id, "insert course");
    sqlx::query(
        r#"
        INSERT INTO courses (title, description, mentor_id, mentor_name,
                             duration_hours, course_code, category)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&course.title)
    .bind(&course.description)
    .bind(&course.mentor_id)
    .bind(&course.mentor_name)
    .bind(course.duration_hours)
    .bind(&course.course_code)
    .bind(&course.category)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_module(pool: &PgPool, module: &NewModule) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO course_modules (course_id, title, description, video_url, file_url, order_index)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(module.course_id)
    .bind(&module.title)
    .bind(&module.description)
    .bind(&module.video_url)
    .bind(&module.file_url)
    .bind(module.order_index)
    .execute(pool)
    .await?;
    Ok(())
}

/// The mentor uid owning a course, for write-ownership checks.
pub async fn owner(pool: &PgPool, course_id: i64) -> Result<Option<String>, AppError> {
    let owner: Option<(String,)> =
        sqlx::query_as("SELECT mentor_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
    Ok(owner.map(|(m,)| m))
}

//! Resource library and mentor reviews.

use crate::de;
use crate::error::AppError;
use crate::models::{Resource, Review};
use serde::Deserialize;
use sqlx::PgPool;

fn default_category() -> String {
    "General".into()
}

fn default_file_type() -> String {
    "file".into()
}

#[derive(Debug, Deserialize)]
pub struct NewResource {
    pub mentor_id: String,
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub file_url: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub mentor_id: String,
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(deserialize_with = "de::flexible_f64")]
    pub rating: f64,
    #[serde(default)]
    pub review_text: String,
}

/// List orderings differ per endpoint group and clients key on them, so
/// both survive.
#[derive(Clone, Copy, Debug)]
pub enum ResourceOrder {
    /// `ORDER BY id DESC` (mentorship group).
    LatestId,
    /// `ORDER BY created_at DESC` (resources group).
    NewestFirst,
}

pub async fn list(
    pool: &PgPool,
    mentor_id: &str,
    order: ResourceOrder,
) -> Result<Vec<Resource>, AppError> {
    let sql = match order {
        ResourceOrder::LatestId => "SELECT * FROM resources WHERE mentor_id = $1 ORDER BY id DESC",
        ResourceOrder::NewestFirst => {
            "SELECT * FROM resources WHERE mentor_id = $1 ORDER BY created_at DESC"
        }
    };
    let rows = sqlx::query_as::<_, Resource>(sql)
        .bind(mentor_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn insert(pool: &PgPool, resource: &NewResource) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO resources (mentor_id, title, category, file_url, file_type)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&resource.mentor_id)
    .bind(&resource.title)
    .bind(&resource.category)
    .bind(&resource.file_url)
    .bind(&resource.file_type)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn reviews_for_mentor(pool: &PgPool, mentor_id: &str) -> Result<Vec<Review>, AppError> {
    let rows = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE mentor_id = $1 ORDER BY created_at DESC",
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert_review(pool: &PgPool, review: &NewReview) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO reviews (mentor_id, student_id, student_name, rating, review_text)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&review.mentor_id)
    .bind(&review.student_id)
    .bind(&review.student_name)
    .bind(review.rating)
    .bind(&review.review_text)
    .execute(pool)
    .await?;
    Ok(())
}

//! User rows: registration, lookup, profile and live-session updates.

use crate::de;
use crate::error::AppError;
use crate::models::{LiveStatus, User};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub portfolio: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub uid: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub portfolio_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LiveStatusForm {
    pub uid: String,
    #[serde(deserialize_with = "de::flexible_bool")]
    pub is_live: bool,
    #[serde(default)]
    pub live_room: String,
    #[serde(default)]
    pub assigned_student_ids: String,
}

/// Insert a registered user; `password_hash` is the already-hashed value.
pub async fn insert(pool: &PgPool, user: &NewUser, password_hash: &str) -> Result<(), AppError> {
    tracing::debug!(email = %user.email, "insert user");
    sqlx::query(
        r#"
        INSERT INTO users (uid, name, email, password, role, phone,
                           skills, experience, bio, portfolio, linkedin, github)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(&user.uid)
    .bind(&user.name)
    .bind(&user.email)
    .bind(password_hash)
    .bind(&user.role)
    .bind(&user.phone)
    .bind(&user.skills)
    .bind(&user.experience)
    .bind(&user.bio)
    .bind(&user.portfolio)
    .bind(&user.linkedin)
    .bind(&user.github)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_uid(pool: &PgPool, uid: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE uid = $1")
        .bind(uid)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn mentors(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = 'mentor'")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// One-time uid sync: accounts created before the device id existed get it
/// persisted on first login. A no-op when the row already has a uid.
pub async fn backfill_uid(pool: &PgPool, email: &str, uid: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE users SET uid = $1 WHERE email = $2 AND (uid IS NULL OR uid = '')",
    )
    .bind(uid)
    .bind(email)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_profile(pool: &PgPool, form: &ProfileForm) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET bio = $1, skills = $2, linkedin_url = $3, github_url = $4, portfolio_url = $5
        WHERE uid = $6
        "#,
    )
    .bind(&form.bio)
    .bind(&form.skills)
    .bind(&form.linkedin_url)
    .bind(&form.github_url)
    .bind(&form.portfolio_url)
    .bind(&form.uid)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_live_status(pool: &PgPool, form: &LiveStatusForm) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_live = $1, live_room = $2, live_assigned_students = $3
        WHERE uid = $4
        "#,
    )
    .bind(form.is_live)
    .bind(&form.live_room)
    .bind(&form.assigned_student_ids)
    .bind(&form.uid)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn live_status(pool: &PgPool, uid: &str) -> Result<Option<LiveStatus>, AppError> {
    let row = sqlx::query_as::<_, LiveStatus>(
        "SELECT is_live, live_room, live_assigned_students FROM users WHERE uid = $1",
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::unique_constraint;
    use crate::schema::ensure_tables;

    fn new_user(uid: &str, email: &str) -> NewUser {
        NewUser {
            uid: uid.into(),
            name: "Name".into(),
            email: email.into(),
            password: "pw".into(),
            role: "student".into(),
            phone: String::new(),
            skills: String::new(),
            experience: String::new(),
            bio: String::new(),
            portfolio: String::new(),
            linkedin: String::new(),
            github: String::new(),
        }
    }

    fn constraint_of(err: AppError) -> String {
        match err {
            AppError::Db(ref db) => unique_constraint(db).unwrap_or("").to_string(),
            other => panic!("expected a database error, got {:?}", other),
        }
    }

    #[sqlx::test]
    async fn duplicate_email_and_uid_report_their_constraints(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        insert(&pool, &new_user("u1", "a@b.co"), "hash").await.unwrap();

        let err = insert(&pool, &new_user("u2", "a@b.co"), "hash").await.unwrap_err();
        assert_eq!(constraint_of(err), "users_email_key");

        let err = insert(&pool, &new_user("u1", "c@d.co"), "hash").await.unwrap_err();
        assert_eq!(constraint_of(err), "users_uid_key");
        Ok(())
    }
}

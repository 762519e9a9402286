//! Enrollment applications: the pending → accepted/rejected workflow plus
//! the orthogonal certification flag.

use crate::error::AppError;
use crate::models::{Application, ApplicationStatus, MenteeRow, RequestRow, User};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct ApplyForm {
    pub student_id: String,
    pub mentor_id: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub portfolio: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusForm {
    #[serde(deserialize_with = "crate::de::flexible_i64")]
    pub request_id: i64,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CertificateForm {
    pub mentor_id: String,
    pub student_id: String,
}

/// Re-apply resets the pair: any prior application (and its status and
/// certification) is removed before the fresh pending row goes in. Both
/// statements run in one transaction.
pub async fn apply(pool: &PgPool, form: &ApplyForm) -> Result<(), AppError> {
    tracing::debug!(student = %form.student_id, mentor = %form.mentor_id, "apply");
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM applications WHERE student_id = $1 AND mentor_id = $2")
        .bind(&form.student_id)
        .bind(&form.mentor_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO applications (student_id, mentor_id, education, interest, reason,
                                  linkedin, github, portfolio, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
        "#,
    )
    .bind(&form.student_id)
    .bind(&form.mentor_id)
    .bind(&form.education)
    .bind(&form.interest)
    .bind(&form.reason)
    .bind(&form.linkedin)
    .bind(&form.github)
    .bind(&form.portfolio)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Overwrite a request's status. Scoped to the mentor who owns the row;
/// returns affected row count so callers can surface a missing row.
pub async fn update_status(
    pool: &PgPool,
    request_id: i64,
    status: ApplicationStatus,
    mentor_uid: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE applications SET status = $1 WHERE id = $2 AND TRIM(mentor_id) = TRIM($3)",
    )
    .bind(status.as_str())
    .bind(request_id)
    .bind(mentor_uid)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Set the certification flag, only where the pair matches and the status is
/// accepted (case-insensitive for legacy rows). Zero affected rows means no
/// accepted application exists.
pub async fn issue_certificate(
    pool: &PgPool,
    mentor_id: &str,
    student_id: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applications SET is_certified = TRUE
        WHERE TRIM(mentor_id) = TRIM($1) AND TRIM(student_id) = TRIM($2)
          AND LOWER(status) = 'accepted'
        "#,
    )
    .bind(mentor_id)
    .bind(student_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Pending requests for a mentor, newest first, with applicant name/email.
pub async fn requests_for_mentor(pool: &PgPool, mentor_id: &str) -> Result<Vec<RequestRow>, AppError> {
    let rows = sqlx::query_as::<_, RequestRow>(
        r#"
        SELECT a.id, a.student_id, a.mentor_id, a.education, a.interest, a.reason,
               a.linkedin, a.github, a.portfolio, a.status, a.is_certified, a.created_at,
               u.name AS student_name, u.email AS student_email
        FROM applications a
        JOIN users u ON a.student_id = u.uid
        WHERE TRIM(a.mentor_id) = TRIM($1) AND LOWER(a.status) = 'pending'
        ORDER BY a.id DESC
        "#,
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Accepted mentees with the student profile joined in.
pub async fn mentees_for_mentor(pool: &PgPool, mentor_id: &str) -> Result<Vec<MenteeRow>, AppError> {
    let rows = sqlx::query_as::<_, MenteeRow>(
        r#"
        SELECT a.id, a.student_id, a.mentor_id, a.education, a.interest, a.reason,
               a.linkedin, a.github, a.portfolio, a.status, a.is_certified, a.created_at,
               u.uid, u.name, u.email, u.phone, u.skills, u.experience, u.bio
        FROM applications a
        JOIN users u ON a.student_id = u.uid
        WHERE TRIM(a.mentor_id) = TRIM($1) AND LOWER(a.status) = 'accepted'
        "#,
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Mentors who accepted the given student.
pub async fn mentors_for_student(pool: &PgPool, student_id: &str) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM applications a
        JOIN users u ON a.mentor_id = u.uid
        WHERE TRIM(a.student_id) = TRIM($1) AND LOWER(a.status) = 'accepted'
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every application a student has filed, regardless of status.
pub async fn for_student(pool: &PgPool, student_id: &str) -> Result<Vec<Application>, AppError> {
    let rows = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE student_id = $1")
        .bind(student_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_tables;

    fn apply_form(student: &str, mentor: &str) -> ApplyForm {
        ApplyForm {
            student_id: student.into(),
            mentor_id: mentor.into(),
            education: "BSc".into(),
            interest: "Rust".into(),
            reason: String::new(),
            linkedin: String::new(),
            github: String::new(),
            portfolio: String::new(),
        }
    }

    async fn request_id(pool: &PgPool, student: &str, mentor: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM applications WHERE student_id = $1 AND mentor_id = $2")
            .bind(student)
            .bind(mentor)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn reapply_resets_status_and_certification(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        apply(&pool, &apply_form("s1", "m1")).await.unwrap();
        let id = request_id(&pool, "s1", "m1").await;
        assert_eq!(
            update_status(&pool, id, ApplicationStatus::Accepted, "m1").await.unwrap(),
            1
        );
        assert_eq!(issue_certificate(&pool, "m1", "s1").await.unwrap(), 1);

        apply(&pool, &apply_form("s1", "m1")).await.unwrap();
        let rows = for_student(&pool, "s1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "pending");
        assert!(!rows[0].is_certified);
        Ok(())
    }

    #[sqlx::test]
    async fn certificate_touches_only_accepted_rows(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        apply(&pool, &apply_form("s1", "m1")).await.unwrap();
        assert_eq!(issue_certificate(&pool, "m1", "s1").await.unwrap(), 0);

        let id = request_id(&pool, "s1", "m1").await;
        update_status(&pool, id, ApplicationStatus::Rejected, "m1").await.unwrap();
        assert_eq!(issue_certificate(&pool, "m1", "s1").await.unwrap(), 0);
        let rows = for_student(&pool, "s1").await.unwrap();
        assert!(!rows[0].is_certified);

        update_status(&pool, id, ApplicationStatus::Accepted, "m1").await.unwrap();
        assert_eq!(issue_certificate(&pool, "m1", "s1").await.unwrap(), 1);
        Ok(())
    }

    #[sqlx::test]
    async fn update_status_is_scoped_to_the_owning_mentor(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        apply(&pool, &apply_form("s1", "m1")).await.unwrap();
        let id = request_id(&pool, "s1", "m1").await;
        assert_eq!(
            update_status(&pool, id, ApplicationStatus::Accepted, "m2").await.unwrap(),
            0
        );
        let rows = for_student(&pool, "s1").await.unwrap();
        assert_eq!(rows[0].status, "pending");
        Ok(())
    }
}

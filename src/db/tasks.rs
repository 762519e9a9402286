//! Tasks, assignment fan-out, and submissions. Membership lives in the
//! `task_assignments` join table; the legacy comma string is reproduced on
//! reads via a scalar subquery so response shapes do not change.

use crate::de;
use crate::error::AppError;
use crate::models::{MentorTaskRow, StudentTaskRow};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct NewTask {
    #[serde(deserialize_with = "de::flexible_i64")]
    pub course_id: i64,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "de::flexible_i64")]
    pub total_marks: i64,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub assigned_student_ids: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTaskForm {
    #[serde(deserialize_with = "de::flexible_i64")]
    pub task_id: i64,
    pub student_id: String,
    pub file_url: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateTaskForm {
    #[serde(deserialize_with = "de::flexible_i64")]
    pub submission_id: i64,
    #[serde(deserialize_with = "de::flexible_i64")]
    pub obtained_marks: i64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default = "default_evaluated")]
    pub status: String,
}

fn default_evaluated() -> String {
    "evaluated".into()
}

const ASSIGNED_AGG: &str = "(SELECT COALESCE(string_agg(ta2.student_id, ','), '') \
     FROM task_assignments ta2 WHERE ta2.task_id = t.id) AS assigned_student_ids";

/// Student view: only tasks assigned to this student, with the student's
/// own submission columns (if any). `course_id = 0` means all courses.
pub async fn student_view(
    pool: &PgPool,
    course_id: i64,
    student_id: &str,
) -> Result<Vec<StudentTaskRow>, AppError> {
    let sql = format!(
        r#"
        SELECT t.id, t.course_id, t.title, t.description, t.total_marks, t.file_url,
               t.created_at, {ASSIGNED_AGG},
               s.status AS submission_status, s.obtained_marks, s.feedback,
               s.file_url AS student_file_url
        FROM tasks t
        JOIN task_assignments ta ON ta.task_id = t.id AND ta.student_id = $2
        LEFT JOIN task_submissions s ON s.task_id = t.id AND s.student_id = $2
        WHERE (t.course_id = $1 OR $1 = 0)
        ORDER BY t.id
        "#
    );
    let rows = sqlx::query_as::<_, StudentTaskRow>(&sql)
        .bind(course_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Mentor view: same membership filter; submission columns are bound to the
/// one requested student, independent of other students' submissions.
pub async fn mentor_view(
    pool: &PgPool,
    course_id: i64,
    student_id: &str,
) -> Result<Vec<MentorTaskRow>, AppError> {
    let sql = format!(
        r#"
        SELECT t.id, t.course_id, t.title, t.description, t.total_marks, t.file_url,
               t.created_at, {ASSIGNED_AGG},
               s.id AS submission_id, s.status AS submission_status, s.obtained_marks,
               s.feedback, s.file_url AS submission_file_url
        FROM tasks t
        JOIN task_assignments ta ON ta.task_id = t.id AND ta.student_id = $2
        LEFT JOIN task_submissions s ON s.task_id = t.id AND s.student_id = $2
        WHERE (t.course_id = $1 OR $1 = 0)
        ORDER BY t.id
        "#
    );
    let rows = sqlx::query_as::<_, MentorTaskRow>(&sql)
        .bind(course_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert a task and fan its assigned-student set out into the join table,
/// atomically.
pub async fn insert(pool: &PgPool, task: &NewTask, assigned: &[String]) -> Result<(), AppError> {
    tracing::debug!(course = task.course_id, assigned = assigned.len(), "insert task");
    let mut tx = pool.begin().await?;
    let (task_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tasks (course_id, title, description, total_marks, file_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(task.course_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.total_marks)
    .bind(&task.file_url)
    .fetch_one(&mut *tx)
    .await?;
    for student_id in assigned {
        sqlx::query(
            "INSERT INTO task_assignments (task_id, student_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Upsert a student's submission. Re-submitting replaces the file and
/// clears any previous evaluation.
pub async fn submit(pool: &PgPool, form: &SubmitTaskForm) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO task_submissions (task_id, student_id, file_url, status)
        VALUES ($1, $2, $3, 'submitted')
        ON CONFLICT (task_id, student_id) DO UPDATE
        SET file_url = EXCLUDED.file_url, status = 'submitted',
            obtained_marks = NULL, feedback = NULL, submitted_at = NOW()
        "#,
    )
    .bind(form.task_id)
    .bind(&form.student_id)
    .bind(&form.file_url)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record a mentor's evaluation. The update is scoped through the task's
/// course so only the owning mentor can grade; returns affected rows.
pub async fn evaluate(
    pool: &PgPool,
    form: &EvaluateTaskForm,
    mentor_uid: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE task_submissions s
        SET obtained_marks = $2, feedback = $3, status = $4
        FROM tasks t
        JOIN courses c ON c.id = t.course_id
        WHERE s.id = $1 AND t.id = s.task_id AND TRIM(c.mentor_id) = TRIM($5)
        "#,
    )
    .bind(form.submission_id)
    .bind(form.obtained_marks)
    .bind(&form.feedback)
    .bind(&form.status)
    .bind(mentor_uid)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_tables;

    async fn seed_course(pool: &PgPool, mentor: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO courses (title, mentor_id) VALUES ('Rust', $1) RETURNING id",
        )
        .bind(mentor)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn task_form(course_id: i64, title: &str) -> NewTask {
        NewTask {
            course_id,
            title: title.into(),
            description: String::new(),
            total_marks: 100,
            file_url: String::new(),
            assigned_student_ids: String::new(),
        }
    }

    fn submission(task_id: i64, student: &str, file: &str) -> SubmitTaskForm {
        SubmitTaskForm {
            task_id,
            student_id: student.into(),
            file_url: file.into(),
        }
    }

    #[sqlx::test]
    async fn views_only_show_assigned_tasks(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        let course_id = seed_course(&pool, "m1").await;
        insert(&pool, &task_form(course_id, "T1"), &["s1".to_string()]).await.unwrap();
        insert(&pool, &task_form(course_id, "T2"), &["s2".to_string()]).await.unwrap();

        let rows = student_view(&pool, course_id, "s1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "T1");
        assert_eq!(rows[0].assigned_student_ids, "s1");

        // course_id 0 spans all courses but keeps the membership filter
        let rows = student_view(&pool, 0, "s2").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "T2");

        assert!(student_view(&pool, course_id, "s3").await.unwrap().is_empty());
        Ok(())
    }

    #[sqlx::test]
    async fn submission_columns_bind_to_the_requested_student(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        let course_id = seed_course(&pool, "m1").await;
        insert(
            &pool,
            &task_form(course_id, "T1"),
            &["s1".to_string(), "s2".to_string()],
        )
        .await
        .unwrap();
        let task_id: i64 = sqlx::query_scalar("SELECT id FROM tasks")
            .fetch_one(&pool)
            .await?;
        submit(&pool, &submission(task_id, "s1", "a.pdf")).await.unwrap();
        submit(&pool, &submission(task_id, "s2", "b.pdf")).await.unwrap();

        let rows = mentor_view(&pool, course_id, "s1").await.unwrap();
        assert_eq!(rows[0].submission_file_url.as_deref(), Some("a.pdf"));
        let rows = student_view(&pool, course_id, "s2").await.unwrap();
        assert_eq!(rows[0].student_file_url.as_deref(), Some("b.pdf"));
        Ok(())
    }

    #[sqlx::test]
    async fn evaluation_is_scoped_and_cleared_on_resubmit(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        let course_id = seed_course(&pool, "m1").await;
        insert(&pool, &task_form(course_id, "T1"), &["s1".to_string()]).await.unwrap();
        let task_id: i64 = sqlx::query_scalar("SELECT id FROM tasks")
            .fetch_one(&pool)
            .await?;
        submit(&pool, &submission(task_id, "s1", "a.pdf")).await.unwrap();

        let rows = mentor_view(&pool, course_id, "s1").await.unwrap();
        let form = EvaluateTaskForm {
            submission_id: rows[0].submission_id.unwrap(),
            obtained_marks: 85,
            feedback: "good".into(),
            status: "evaluated".into(),
        };
        // a mentor who does not own the course cannot grade
        assert_eq!(evaluate(&pool, &form, "m2").await.unwrap(), 0);
        assert_eq!(evaluate(&pool, &form, "m1").await.unwrap(), 1);
        let rows = mentor_view(&pool, course_id, "s1").await.unwrap();
        assert_eq!(rows[0].obtained_marks, Some(85));
        assert_eq!(rows[0].submission_status.as_deref(), Some("evaluated"));

        submit(&pool, &submission(task_id, "s1", "a2.pdf")).await.unwrap();
        let rows = mentor_view(&pool, course_id, "s1").await.unwrap();
        assert_eq!(rows[0].submission_file_url.as_deref(), Some("a2.pdf"));
        assert_eq!(rows[0].submission_status.as_deref(), Some("submitted"));
        assert_eq!(rows[0].obtained_marks, None);
        Ok(())
    }
}

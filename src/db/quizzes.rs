//! Quizzes, questions, assignment fan-out, and results. Creating a quiz is
//! the one multi-row write in the system and runs in a single transaction:
//! a failed question insert rolls the quiz back too.

use crate::de;
use crate::error::AppError;
use crate::models::{Quiz, QuizHistoryRow, QuizQuestion, QuizResultReport};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct QuizForm {
    pub mentor_id: String,
    #[serde(deserialize_with = "de::flexible_i64")]
    pub course_id: i64,
    #[serde(default)]
    pub course_name: String,
    pub title: String,
    #[serde(default)]
    pub assigned_student_ids: String,
    #[serde(default)]
    pub questions: Vec<QuestionForm>,
}

/// Question payload keys match the legacy wire format.
#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    pub text: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub d: String,
    pub correct: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizResultForm {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default, deserialize_with = "de::flexible_i64")]
    pub score: i64,
    #[serde(default, deserialize_with = "de::flexible_i64")]
    pub total: i64,
}

const ASSIGNED_AGG: &str = "(SELECT COALESCE(string_agg(qa.student_id, ','), '') \
     FROM quiz_assignments qa WHERE qa.quiz_id = q.id) AS assigned_student_ids";

/// Insert the quiz, its questions, and the assignment fan-out atomically.
/// Returns the new quiz id.
pub async fn create(pool: &PgPool, form: &QuizForm, assigned: &[String]) -> Result<i64, AppError> {
    tracing::debug!(mentor = %form.mentor_id, questions = form.questions.len(), "create quiz");
    let mut tx = pool.begin().await?;
    let (quiz_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO quizzes (mentor_id, course_id, course_name, title, description)
        VALUES ($1, $2, $3, $4, 'Assessment')
        RETURNING id
        "#,
    )
    .bind(&form.mentor_id)
    .bind(form.course_id)
    .bind(&form.course_name)
    .bind(&form.title)
    .fetch_one(&mut *tx)
    .await?;
    for q in &form.questions {
        sqlx::query(
            r#"
            INSERT INTO quiz_questions (quiz_id, question_text, option_a, option_b,
                                        option_c, option_d, correct_option)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(quiz_id)
        .bind(&q.text)
        .bind(&q.a)
        .bind(&q.b)
        .bind(&q.c)
        .bind(&q.d)
        .bind(&q.correct)
        .execute(&mut *tx)
        .await?;
    }
    for student_id in assigned {
        sqlx::query(
            "INSERT INTO quiz_assignments (quiz_id, student_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(quiz_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(quiz_id)
}

/// A mentor's quizzes, newest first, with the assigned set re-joined into
/// the legacy comma string.
pub async fn by_mentor(pool: &PgPool, mentor_id: &str) -> Result<Vec<Quiz>, AppError> {
    let sql = format!(
        r#"
        SELECT q.id, q.mentor_id, q.course_id, q.course_name, q.title, q.description,
               {ASSIGNED_AGG}, q.created_at
        FROM quizzes q
        WHERE q.mentor_id = $1
        ORDER BY q.id DESC
        "#
    );
    let rows = sqlx::query_as::<_, Quiz>(&sql)
        .bind(mentor_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn questions(pool: &PgPool, quiz_id: i64) -> Result<Vec<QuizQuestion>, AppError> {
    let rows = sqlx::query_as::<_, QuizQuestion>(
        "SELECT * FROM quiz_questions WHERE quiz_id = $1",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Record an attempt with a server-assigned timestamp.
pub async fn save_result(pool: &PgPool, form: &QuizResultForm, quiz_id: i64) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_results (student_id, quiz_id, score, total_questions, attempted_at)
        VALUES ($1, $2, $3, $4, NOW())
        "#,
    )
    .bind(&form.student_id)
    .bind(quiz_id)
    .bind(form.score)
    .bind(form.total)
    .execute(pool)
    .await?;
    Ok(())
}

/// All attempts on a mentor's quizzes, most recent first.
pub async fn results_for_mentor(pool: &PgPool, mentor_id: &str) -> Result<Vec<QuizResultReport>, AppError> {
    let rows = sqlx::query_as::<_, QuizResultReport>(
        r#"
        SELECT r.id, r.student_id, r.quiz_id, r.score, r.total_questions, r.attempted_at,
               q.title AS quiz_title, u.name AS student_name
        FROM quiz_results r
        JOIN quizzes q ON r.quiz_id = q.id
        JOIN users u ON r.student_id = u.uid
        WHERE q.mentor_id = $1
        ORDER BY r.attempted_at DESC
        "#,
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// A student's attempt history, most recent first.
pub async fn history_for_student(pool: &PgPool, student_id: &str) -> Result<Vec<QuizHistoryRow>, AppError> {
    let rows = sqlx::query_as::<_, QuizHistoryRow>(
        r#"
        SELECT r.id, r.student_id, r.quiz_id, r.score, r.total_questions, r.attempted_at,
               q.title, q.course_name, q.mentor_id
        FROM quiz_results r
        JOIN quizzes q ON r.quiz_id = q.id
        WHERE r.student_id = $1
        ORDER BY r.attempted_at DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
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

    fn quiz_form(mentor: &str, course_id: i64, question_count: usize) -> QuizForm {
        QuizForm {
            mentor_id: mentor.into(),
            course_id,
            course_name: "Rust".into(),
            title: "Basics".into(),
            assigned_student_ids: String::new(),
            questions: (0..question_count)
                .map(|i| QuestionForm {
                    text: format!("Q{}", i),
                    a: "1".into(),
                    b: "2".into(),
                    c: "3".into(),
                    d: "4".into(),
                    correct: "a".into(),
                })
                .collect(),
        }
    }

    #[sqlx::test]
    async fn create_persists_questions_and_assignments(pool: PgPool) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        let course_id = seed_course(&pool, "m1").await;
        let quiz_id = create(
            &pool,
            &quiz_form("m1", course_id, 2),
            &["s1".to_string(), "s2".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(questions(&pool, quiz_id).await.unwrap().len(), 2);
        let listed = by_mentor(&pool, "m1").await.unwrap();
        assert_eq!(listed.len(), 1);
        let mut assigned: Vec<&str> = listed[0].assigned_student_ids.split(',').collect();
        assigned.sort_unstable();
        assert_eq!(assigned, vec!["s1", "s2"]);
        Ok(())
    }

    #[sqlx::test]
    async fn create_rolls_back_quiz_and_questions_on_partial_failure(
        pool: PgPool,
    ) -> sqlx::Result<()> {
        ensure_tables(&pool).await.unwrap();
        let course_id = seed_course(&pool, "m1").await;
        // Make the assignment fan-out fail after the quiz and its questions
        // were already written inside the transaction.
        sqlx::query("DROP TABLE quiz_assignments").execute(&pool).await?;

        let result = create(&pool, &quiz_form("m1", course_id, 1), &["s1".to_string()]).await;
        assert!(result.is_err());

        let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(&pool)
            .await?;
        assert_eq!(quizzes, 0);
        let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions")
            .fetch_one(&pool)
            .await?;
        assert_eq!(orphaned, 0);
        Ok(())
    }
}

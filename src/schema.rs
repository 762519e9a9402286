//! Database bootstrap: create the database if missing, then idempotent DDL
//! for every table. Ownership references to `users.uid` stay unenforced
//! (uid is backfilled on first login and cannot carry a FK); numeric parent
//! ids carry real constraints.

use crate::error::AppError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        uid TEXT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        role TEXT NOT NULL,
        phone TEXT,
        skills TEXT,
        experience TEXT,
        bio TEXT,
        portfolio TEXT,
        linkedin TEXT,
        github TEXT,
        linkedin_url TEXT,
        github_url TEXT,
        portfolio_url TEXT,
        is_live BOOLEAN NOT NULL DEFAULT FALSE,
        live_room TEXT,
        live_assigned_students TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id BIGSERIAL PRIMARY KEY,
        student_id TEXT NOT NULL,
        mentor_id TEXT NOT NULL,
        education TEXT,
        interest TEXT,
        reason TEXT,
        linkedin TEXT,
        github TEXT,
        portfolio TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        is_certified BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        mentor_id TEXT NOT NULL,
        mentor_name TEXT NOT NULL DEFAULT '',
        duration_hours BIGINT NOT NULL DEFAULT 0,
        course_code TEXT NOT NULL DEFAULT 'N/A',
        category TEXT NOT NULL DEFAULT 'General',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_modules (
        id BIGSERIAL PRIMARY KEY,
        course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        video_url TEXT NOT NULL DEFAULT '',
        file_url TEXT NOT NULL DEFAULT '',
        order_index INT NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id BIGSERIAL PRIMARY KEY,
        course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        total_marks BIGINT NOT NULL DEFAULT 0,
        file_url TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS task_assignments (
        task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        student_id TEXT NOT NULL,
        PRIMARY KEY (task_id, student_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS task_submissions (
        id BIGSERIAL PRIMARY KEY,
        task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        student_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'submitted',
        obtained_marks BIGINT,
        feedback TEXT,
        file_url TEXT NOT NULL DEFAULT '',
        submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (task_id, student_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quizzes (
        id BIGSERIAL PRIMARY KEY,
        mentor_id TEXT NOT NULL,
        course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        course_name TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT 'Assessment',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quiz_assignments (
        quiz_id BIGINT NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
        student_id TEXT NOT NULL,
        PRIMARY KEY (quiz_id, student_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quiz_questions (
        id BIGSERIAL PRIMARY KEY,
        quiz_id BIGINT NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
        question_text TEXT NOT NULL,
        option_a TEXT NOT NULL DEFAULT '',
        option_b TEXT NOT NULL DEFAULT '',
        option_c TEXT NOT NULL DEFAULT '',
        option_d TEXT NOT NULL DEFAULT '',
        correct_option TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quiz_results (
        id BIGSERIAL PRIMARY KEY,
        student_id TEXT NOT NULL,
        quiz_id BIGINT NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
        score BIGINT NOT NULL DEFAULT 0,
        total_questions BIGINT NOT NULL DEFAULT 0,
        attempted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resources (
        id BIGSERIAL PRIMARY KEY,
        mentor_id TEXT NOT NULL,
        title TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'General',
        file_url TEXT NOT NULL,
        file_type TEXT NOT NULL DEFAULT 'file',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id BIGSERIAL PRIMARY KEY,
        mentor_id TEXT NOT NULL,
        student_id TEXT NOT NULL,
        student_name TEXT NOT NULL DEFAULT '',
        rating DOUBLE PRECISION NOT NULL DEFAULT 0,
        review_text TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS users_uid_key ON users (uid) WHERE uid IS NOT NULL AND uid <> ''",
    "CREATE INDEX IF NOT EXISTS applications_pair_idx ON applications (student_id, mentor_id)",
    "CREATE INDEX IF NOT EXISTS applications_mentor_status_idx ON applications (mentor_id, status)",
    "CREATE INDEX IF NOT EXISTS courses_mentor_idx ON courses (mentor_id)",
    "CREATE INDEX IF NOT EXISTS course_modules_course_idx ON course_modules (course_id, order_index)",
    "CREATE INDEX IF NOT EXISTS task_assignments_student_idx ON task_assignments (student_id)",
    "CREATE INDEX IF NOT EXISTS quiz_assignments_student_idx ON quiz_assignments (student_id)",
    "CREATE INDEX IF NOT EXISTS quizzes_mentor_idx ON quizzes (mentor_id)",
    "CREATE INDEX IF NOT EXISTS quiz_results_student_idx ON quiz_results (student_id)",
    "CREATE INDEX IF NOT EXISTS resources_mentor_idx ON resources (mentor_id)",
    "CREATE INDEX IF NOT EXISTS reviews_mentor_idx ON reviews (mentor_id)",
];

/// Create all tables and indexes if they do not exist.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        let quoted = quote_ident(&db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quoted))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Internal("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

// Quoted identifiers escape a double quote by doubling it.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

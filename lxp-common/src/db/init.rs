//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the feedback tables.
//! Every statement is idempotent so startup can run it against an existing
//! database.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Busy timeout set on each pooled connection when it is opened
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // WAL lets status queries read while a submission writes
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Limited to one connection: each `sqlite::memory:` connection is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all feedback tables
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_learners_table(pool).await?;
    create_quiz_feedback_questions_table(pool).await?;
    create_topic_feedback_questions_table(pool).await?;
    create_feedback_question_options_table(pool).await?;
    create_feedback_responses_table(pool).await?;
    Ok(())
}

async fn create_learners_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS learners (
            learner_id TEXT PRIMARY KEY,
            email TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_quiz_feedback_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quiz_feedback_questions (
            question_id TEXT PRIMARY KEY,
            quiz_id TEXT NOT NULL,
            question_no INTEGER NOT NULL,
            question TEXT NOT NULL,
            question_type TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_quiz_feedback_questions_quiz ON quiz_feedback_questions(quiz_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_topic_feedback_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_feedback_questions (
            question_id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL,
            question_no INTEGER NOT NULL,
            question TEXT NOT NULL,
            question_type TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_topic_feedback_questions_topic ON topic_feedback_questions(topic_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Options for both question kinds; `question_kind` is 'quiz' or 'topic'
async fn create_feedback_question_options_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback_question_options (
            option_id TEXT PRIMARY KEY,
            question_kind TEXT NOT NULL CHECK (question_kind IN ('quiz', 'topic')),
            question_id TEXT NOT NULL,
            option_text TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (question_kind, question_id, option_text)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// One row per (kind, question, learner); exactly one of response/option_id set
async fn create_feedback_responses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback_responses (
            response_id TEXT PRIMARY KEY,
            question_kind TEXT NOT NULL CHECK (question_kind IN ('quiz', 'topic')),
            question_id TEXT NOT NULL,
            learner_id TEXT NOT NULL REFERENCES learners(learner_id),
            response TEXT,
            option_id TEXT REFERENCES feedback_question_options(option_id),
            generated_at TEXT NOT NULL,
            generated_by TEXT NOT NULL,
            CHECK ((response IS NULL) <> (option_id IS NULL)),
            UNIQUE (question_kind, question_id, learner_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_feedback_responses_learner ON feedback_responses(learner_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

//! Shared fixtures for lxp-feedback integration tests
//!
//! Seeds the SQLite schema with raw SQL; question authoring is not part of
//! the feedback service.

#![allow(dead_code)]

use lxp_feedback::{FeedbackKind, QuestionType};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fresh in-memory database with the feedback schema
pub async fn memory_pool() -> SqlitePool {
    lxp_common::db::init_memory_database()
        .await
        .expect("in-memory database should initialize")
}

pub async fn seed_learner(pool: &SqlitePool) -> Uuid {
    let learner_id = Uuid::new_v4();
    sqlx::query("INSERT INTO learners (learner_id, email) VALUES (?, ?)")
        .bind(learner_id.to_string())
        .bind(format!("{}@example.test", learner_id.simple()))
        .execute(pool)
        .await
        .expect("learner insert");
    learner_id
}

pub async fn seed_question(
    pool: &SqlitePool,
    kind: FeedbackKind,
    container_id: Uuid,
    question_no: i64,
    question_type: QuestionType,
) -> Uuid {
    let question_id = Uuid::new_v4();
    let sql = match kind {
        FeedbackKind::Quiz => {
            "INSERT INTO quiz_feedback_questions (question_id, quiz_id, question_no, question, question_type) VALUES (?, ?, ?, ?, ?)"
        }
        FeedbackKind::Topic => {
            "INSERT INTO topic_feedback_questions (question_id, topic_id, question_no, question, question_type) VALUES (?, ?, ?, ?, ?)"
        }
    };

    sqlx::query(sql)
        .bind(question_id.to_string())
        .bind(container_id.to_string())
        .bind(question_no)
        .bind(format!("Feedback question {}", question_no))
        .bind(question_type.as_str())
        .execute(pool)
        .await
        .expect("question insert");
    question_id
}

pub async fn seed_option(
    pool: &SqlitePool,
    kind: FeedbackKind,
    question_id: Uuid,
    option_text: &str,
) -> Uuid {
    let option_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO feedback_question_options (option_id, question_kind, question_id, option_text) VALUES (?, ?, ?, ?)",
    )
    .bind(option_id.to_string())
    .bind(kind.as_str())
    .bind(question_id.to_string())
    .bind(option_text)
    .execute(pool)
    .await
    .expect("option insert");
    option_id
}

pub async fn count_responses(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM feedback_responses")
        .fetch_one(pool)
        .await
        .expect("count responses")
}

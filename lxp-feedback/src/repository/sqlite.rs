//! SQLite feedback repository
//!
//! Tables are created by `lxp_common::db::init_database`. UUIDs are stored
//! as hyphenated TEXT and timestamps as RFC 3339 TEXT.

use super::FeedbackRepository;
use crate::error::{FeedbackError, FeedbackResult};
use crate::models::{
    Answer, ContainerRef, FeedbackKind, FeedbackOption, FeedbackQuestion, FeedbackResponse,
    Learner, QuestionRef, QuestionType,
};
use lxp_common::{time, uuid_utils};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

/// Repository over the shared LXP SQLite database
#[derive(Clone)]
pub struct SqliteFeedbackRepository {
    pool: SqlitePool,
}

impl SqliteFeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_options(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackOption>> {
        let rows = sqlx::query(
            r#"
            SELECT option_id, option_text
            FROM feedback_question_options
            WHERE question_kind = ? AND question_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(kind.as_str())
        .bind(question_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> FeedbackResult<FeedbackOption> {
                let option_id: String = row.try_get("option_id")?;
                Ok(FeedbackOption {
                    option_id: uuid_utils::parse_column(&option_id, "option_id")?,
                    question_id,
                    option_text: row.try_get("option_text")?,
                })
            })
            .collect()
    }

    /// Decode a question row (without options)
    fn question_from_row(kind: FeedbackKind, row: &SqliteRow) -> FeedbackResult<FeedbackQuestion> {
        let question_id: String = row.try_get("question_id")?;
        let container_id: String = row.try_get("container_id")?;
        let question_type: String = row.try_get("question_type")?;

        let question_type = question_type
            .parse::<QuestionType>()
            .map_err(|e| FeedbackError::Persistence(lxp_common::Error::Internal(e)))?;

        Ok(FeedbackQuestion {
            question_id: uuid_utils::parse_column(&question_id, "question_id")?,
            container: ContainerRef::new(
                kind,
                uuid_utils::parse_column(&container_id, kind.container_id_field())?,
            ),
            question_no: row.try_get("question_no")?,
            question: row.try_get("question")?,
            question_type,
            options: Vec::new(),
        })
    }

    fn response_from_row(kind: FeedbackKind, row: &SqliteRow) -> FeedbackResult<FeedbackResponse> {
        let response_id: String = row.try_get("response_id")?;
        let question_id: String = row.try_get("question_id")?;
        let learner_id: String = row.try_get("learner_id")?;
        let response: Option<String> = row.try_get("response")?;
        let option_id: Option<String> = row.try_get("option_id")?;
        let generated_at: String = row.try_get("generated_at")?;

        let answer = match (response, option_id) {
            (Some(text), None) => Answer::Text(text),
            (None, Some(option_id)) => {
                Answer::Option(uuid_utils::parse_column(&option_id, "option_id")?)
            }
            _ => {
                return Err(FeedbackError::Persistence(lxp_common::Error::Internal(format!(
                    "Response {} must carry exactly one of response/option_id",
                    response_id
                ))))
            }
        };

        Ok(FeedbackResponse {
            response_id: uuid_utils::parse_column(&response_id, "response_id")?,
            question: QuestionRef::new(
                kind,
                uuid_utils::parse_column(&question_id, "question_id")?,
            ),
            learner_id: uuid_utils::parse_column(&learner_id, "learner_id")?,
            answer,
            generated_at: time::from_storage(&generated_at, "generated_at")?,
            generated_by: row.try_get("generated_by")?,
        })
    }
}

/// Question table and container column for a feedback kind
fn question_table(kind: FeedbackKind) -> (&'static str, &'static str) {
    match kind {
        FeedbackKind::Quiz => ("quiz_feedback_questions", "quiz_id"),
        FeedbackKind::Topic => ("topic_feedback_questions", "topic_id"),
    }
}

impl FeedbackRepository for SqliteFeedbackRepository {
    async fn get_question(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackQuestion>> {
        let (table, container_column) = question_table(kind);
        let sql = format!(
            "SELECT question_id, {} AS container_id, question_no, question, question_type \
             FROM {} WHERE question_id = ?",
            container_column, table
        );

        let row = sqlx::query(&sql)
            .bind(question_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut question = Self::question_from_row(kind, &row)?;
                if question.question_type == QuestionType::MultiChoice {
                    question.options = self.load_options(kind, question_id).await?;
                }
                Ok(Some(question))
            }
            None => {
                debug!(%kind, %question_id, "Feedback question not found");
                Ok(None)
            }
        }
    }

    async fn get_learner(&self, learner_id: Uuid) -> FeedbackResult<Option<Learner>> {
        let row = sqlx::query("SELECT learner_id, email FROM learners WHERE learner_id = ?")
            .bind(learner_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Learner {
                learner_id,
                email: row.try_get("email")?,
            })),
            None => Ok(None),
        }
    }

    async fn get_existing_response(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackResponse>> {
        let row = sqlx::query(
            r#"
            SELECT response_id, question_id, learner_id, response, option_id, generated_at, generated_by
            FROM feedback_responses
            WHERE question_kind = ? AND question_id = ? AND learner_id = ?
            "#,
        )
        .bind(kind.as_str())
        .bind(question_id.to_string())
        .bind(learner_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::response_from_row(kind, &row)).transpose()
    }

    async fn get_option_id_by_text(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        option_text: &str,
    ) -> FeedbackResult<Option<Uuid>> {
        // TEXT '=' uses BINARY collation: exact and case-sensitive
        let option_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT option_id
            FROM feedback_question_options
            WHERE question_kind = ? AND question_id = ? AND option_text = ?
            "#,
        )
        .bind(kind.as_str())
        .bind(question_id.to_string())
        .bind(option_text)
        .fetch_optional(&self.pool)
        .await?;

        option_id
            .map(|id| uuid_utils::parse_column(&id, "option_id"))
            .transpose()
            .map_err(FeedbackError::from)
    }

    async fn add_response(&self, response: &FeedbackResponse) -> FeedbackResult<()> {
        let kind = response.question.kind();
        let question_id = response.question.question_id();

        let result = sqlx::query(
            r#"
            INSERT INTO feedback_responses (
                response_id, question_kind, question_id, learner_id,
                response, option_id, generated_at, generated_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(response.response_id.to_string())
        .bind(kind.as_str())
        .bind(question_id.to_string())
        .bind(response.learner_id.to_string())
        .bind(response.answer.text())
        .bind(response.answer.option_id().map(|id| id.to_string()))
        .bind(time::to_storage(&response.generated_at))
        .bind(&response.generated_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = lxp_common::Error::from(e);
                if err.is_unique_violation() {
                    warn!(
                        %kind,
                        %question_id,
                        learner_id = %response.learner_id,
                        "Unique constraint rejected duplicate feedback response"
                    );
                    Err(FeedbackError::DuplicateSubmission {
                        kind,
                        question_id,
                        learner_id: response.learner_id,
                    })
                } else {
                    Err(FeedbackError::Persistence(err))
                }
            }
        }
    }

    async fn get_questions_by_container(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackQuestion>> {
        let (table, container_column) = question_table(kind);
        let sql = format!(
            "SELECT question_id, {col} AS container_id, question_no, question, question_type \
             FROM {table} WHERE {col} = ? ORDER BY question_no",
            col = container_column,
            table = table
        );

        let rows = sqlx::query(&sql)
            .bind(container_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut question = Self::question_from_row(kind, row)?;
            if question.question_type == QuestionType::MultiChoice {
                question.options = self.load_options(kind, question.question_id).await?;
            }
            questions.push(question);
        }

        Ok(questions)
    }

    async fn get_responses_by_learner(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackResponse>> {
        let (table, container_column) = question_table(kind);
        let sql = format!(
            "SELECT r.response_id, r.question_id, r.learner_id, r.response, r.option_id, \
                    r.generated_at, r.generated_by \
             FROM feedback_responses r \
             JOIN {table} q ON q.question_id = r.question_id \
             WHERE r.question_kind = ? AND q.{col} = ? AND r.learner_id = ? \
             ORDER BY r.generated_at",
            table = table,
            col = container_column
        );

        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .bind(container_id.to_string())
            .bind(learner_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Self::response_from_row(kind, row))
            .collect()
    }
}

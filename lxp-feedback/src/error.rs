//! Error types for lxp-feedback
//!
//! Each variant names one failure class the calling layer maps to its own
//! status codes:
//! - `Validation`: field errors the caller should correct
//! - `InvalidArgument`: unknown id or missing conditional field
//! - `DuplicateSubmission`: the response already exists; safe to treat as done
//! - `Persistence`: storage failure; the caller may retry

use crate::models::FeedbackKind;
use crate::validation::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

/// Feedback workflow error
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    #[error("Learner {learner_id} has already submitted a response for {kind} feedback question {question_id}")]
    DuplicateSubmission {
        kind: FeedbackKind,
        question_id: Uuid,
        learner_id: Uuid,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] lxp_common::Error),
}

impl FeedbackError {
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        FeedbackError::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// Only storage failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedbackError::Persistence(_))
    }
}

impl From<sqlx::Error> for FeedbackError {
    fn from(err: sqlx::Error) -> Self {
        FeedbackError::Persistence(lxp_common::Error::Database(err))
    }
}

/// Result type for feedback operations
pub type FeedbackResult<T> = Result<T, FeedbackError>;

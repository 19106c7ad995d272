//! Field-level validation of feedback submissions
//!
//! Runs before any repository lookup and reports every violated rule at
//! once, so a caller can fix all fields in one round trip.
//!
//! Rules:
//! - question id and learner id must be non-nil
//! - at least one of response / option text must be non-blank
//! - response and option text must respect the configured length bounds

use crate::models::Submission;
use lxp_common::config::FeedbackSettings;
use serde::Serialize;
use std::fmt;

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All violated rules of one submission (never empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validator for quiz and topic submissions
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    max_response_length: usize,
    max_option_text_length: usize,
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new(&FeedbackSettings::default())
    }
}

impl SubmissionValidator {
    pub fn new(settings: &FeedbackSettings) -> Self {
        Self {
            max_response_length: settings.max_response_length,
            max_option_text_length: settings.max_option_text_length,
        }
    }

    pub fn validate<S: Submission>(&self, submission: &S) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if submission.question_id().is_nil() {
            errors.push(FieldError {
                field: S::KIND.question_id_field(),
                message: "Feedback question ID is required".to_string(),
            });
        }

        if submission.learner_id().is_nil() {
            errors.push(FieldError {
                field: "learner_id",
                message: "Learner ID is required".to_string(),
            });
        }

        let response = submission.response().filter(|r| !r.trim().is_empty());
        let option_text = submission.option_text().filter(|o| !o.trim().is_empty());

        if response.is_none() && option_text.is_none() {
            errors.push(FieldError {
                field: "response",
                message: "Either a response or an option text must be provided".to_string(),
            });
        }

        if let Some(response) = submission.response() {
            let length = response.chars().count();
            if length > self.max_response_length {
                errors.push(FieldError {
                    field: "response",
                    message: format!(
                        "Response must be at most {} characters (got {})",
                        self.max_response_length, length
                    ),
                });
            }
        }

        if let Some(option_text) = submission.option_text() {
            let length = option_text.chars().count();
            if length > self.max_option_text_length {
                errors.push(FieldError {
                    field: "option_text",
                    message: format!(
                        "Option text must be at most {} characters (got {})",
                        self.max_option_text_length, length
                    ),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

//! Feedback data access
//!
//! The workflow only talks to [`FeedbackRepository`]. Two implementations:
//! - [`SqliteFeedbackRepository`]: sqlx over the shared LXP database
//! - [`InMemoryFeedbackRepository`]: process-local store for tests and tools
//!
//! Both enforce at most one response per (kind, question, learner) at write
//! time, reporting a second insert as `DuplicateSubmission`.

use crate::error::FeedbackResult;
use crate::models::{FeedbackKind, FeedbackQuestion, FeedbackResponse, Learner};
use uuid::Uuid;

mod memory;
mod sqlite;

pub use memory::InMemoryFeedbackRepository;
pub use sqlite::SqliteFeedbackRepository;

/// Storage operations used by the feedback workflow
#[allow(async_fn_in_trait)]
pub trait FeedbackRepository {
    /// Question of the given kind, with its options
    async fn get_question(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackQuestion>>;

    async fn get_learner(&self, learner_id: Uuid) -> FeedbackResult<Option<Learner>>;

    async fn get_existing_response(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackResponse>>;

    /// Exact, case-sensitive match scoped to one question
    async fn get_option_id_by_text(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        option_text: &str,
    ) -> FeedbackResult<Option<Uuid>>;

    /// Insert a response; a second response for the same
    /// (kind, question, learner) fails with `DuplicateSubmission`
    async fn add_response(&self, response: &FeedbackResponse) -> FeedbackResult<()>;

    async fn get_questions_by_container(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackQuestion>>;

    /// Responses by one learner to questions under one container
    async fn get_responses_by_learner(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackResponse>>;
}

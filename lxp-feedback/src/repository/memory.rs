//! In-memory feedback repository

use super::FeedbackRepository;
use crate::error::{FeedbackError, FeedbackResult};
use crate::models::{FeedbackKind, FeedbackQuestion, FeedbackResponse, Learner};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    questions: HashMap<(FeedbackKind, Uuid), FeedbackQuestion>,
    learners: HashMap<Uuid, Learner>,
    responses: Vec<FeedbackResponse>,
    fail_writes: bool,
}

/// Process-local repository
///
/// The duplicate check in `add_response` runs under the write lock, so it
/// plays the role of the database's unique constraint.
#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_question(&self, question: FeedbackQuestion) {
        let mut state = self.state.write().await;
        state
            .questions
            .insert((question.kind(), question.question_id), question);
    }

    pub async fn insert_learner(&self, learner: Learner) {
        let mut state = self.state.write().await;
        state.learners.insert(learner.learner_id, learner);
    }

    /// Snapshot of stored responses, in insertion order
    pub async fn responses(&self) -> Vec<FeedbackResponse> {
        self.state.read().await.responses.clone()
    }

    /// Make every subsequent `add_response` fail with a persistence error
    pub async fn set_fail_writes(&self, fail: bool) {
        self.state.write().await.fail_writes = fail;
    }
}

impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn get_question(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackQuestion>> {
        let state = self.state.read().await;
        Ok(state.questions.get(&(kind, question_id)).cloned())
    }

    async fn get_learner(&self, learner_id: Uuid) -> FeedbackResult<Option<Learner>> {
        let state = self.state.read().await;
        Ok(state.learners.get(&learner_id).cloned())
    }

    async fn get_existing_response(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Option<FeedbackResponse>> {
        let state = self.state.read().await;
        Ok(state
            .responses
            .iter()
            .find(|r| {
                r.question.kind() == kind
                    && r.question.question_id() == question_id
                    && r.learner_id == learner_id
            })
            .cloned())
    }

    async fn get_option_id_by_text(
        &self,
        kind: FeedbackKind,
        question_id: Uuid,
        option_text: &str,
    ) -> FeedbackResult<Option<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .questions
            .get(&(kind, question_id))
            .and_then(|q| q.option_by_text(option_text))
            .map(|o| o.option_id))
    }

    async fn add_response(&self, response: &FeedbackResponse) -> FeedbackResult<()> {
        let mut state = self.state.write().await;

        if state.fail_writes {
            return Err(FeedbackError::Persistence(lxp_common::Error::Internal(
                "in-memory store rejected write".to_string(),
            )));
        }

        let duplicate = state
            .responses
            .iter()
            .any(|r| r.question == response.question && r.learner_id == response.learner_id);
        if duplicate {
            return Err(FeedbackError::DuplicateSubmission {
                kind: response.question.kind(),
                question_id: response.question.question_id(),
                learner_id: response.learner_id,
            });
        }

        state.responses.push(response.clone());
        Ok(())
    }

    async fn get_questions_by_container(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackQuestion>> {
        let state = self.state.read().await;
        let mut questions: Vec<FeedbackQuestion> = state
            .questions
            .values()
            .filter(|q| q.kind() == kind && q.container.id() == container_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.question_no);
        Ok(questions)
    }

    async fn get_responses_by_learner(
        &self,
        kind: FeedbackKind,
        container_id: Uuid,
        learner_id: Uuid,
    ) -> FeedbackResult<Vec<FeedbackResponse>> {
        let state = self.state.read().await;
        Ok(state
            .responses
            .iter()
            .filter(|r| r.learner_id == learner_id && r.question.kind() == kind)
            .filter(|r| {
                state
                    .questions
                    .get(&(kind, r.question.question_id()))
                    .is_some_and(|q| q.container.id() == container_id)
            })
            .cloned()
            .collect())
    }
}

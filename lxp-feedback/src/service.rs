//! Feedback submission workflow
//!
//! One generic routine handles quiz and topic submissions:
//! 1. Field validation (all violations reported together)
//! 2. Question lookup by (kind, id)
//! 3. Learner lookup
//! 4. Duplicate check for (kind, question, learner)
//! 5. Answer resolution: option id for MCQ, free text otherwise
//! 6. Insert with server timestamp and submitter tag
//! 7. Resolved quiz/topic id written back into the submission
//!
//! The duplicate check is backed by the repository's write-time uniqueness,
//! so two racing submissions still store a single response.
//!
//! Batches are fail-fast: items run in order, the first error is returned,
//! earlier items stay stored and later items are not attempted.

use crate::error::{FeedbackError, FeedbackResult};
use crate::models::{
    Answer, FeedbackResponse, QuestionRef, QuestionType, QuizFeedbackSubmission, Submission,
    TopicFeedbackSubmission,
};
use crate::repository::FeedbackRepository;
use crate::validation::SubmissionValidator;
use lxp_common::config::FeedbackSettings;
use lxp_common::{time, uuid_utils};
use tracing::{debug, info, warn};

/// Records learner feedback responses and answers completion queries
pub struct FeedbackResponseService<R> {
    pub(crate) repository: R,
    validator: SubmissionValidator,
    submitter_tag: String,
}

impl<R: FeedbackRepository> FeedbackResponseService<R> {
    /// Service with default settings (submitter tag "learner")
    pub fn new(repository: R) -> Self {
        Self::with_settings(repository, &FeedbackSettings::default())
    }

    pub fn with_settings(repository: R, settings: &FeedbackSettings) -> Self {
        Self {
            repository,
            validator: SubmissionValidator::new(settings),
            submitter_tag: settings.submitter_tag.clone(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn submit_quiz_feedback(
        &self,
        submission: &mut QuizFeedbackSubmission,
    ) -> FeedbackResult<()> {
        self.submit(submission).await
    }

    pub async fn submit_topic_feedback(
        &self,
        submission: &mut TopicFeedbackSubmission,
    ) -> FeedbackResult<()> {
        self.submit(submission).await
    }

    pub async fn submit_quiz_feedback_batch(
        &self,
        submissions: &mut [QuizFeedbackSubmission],
    ) -> FeedbackResult<()> {
        self.submit_batch(submissions).await
    }

    pub async fn submit_topic_feedback_batch(
        &self,
        submissions: &mut [TopicFeedbackSubmission],
    ) -> FeedbackResult<()> {
        self.submit_batch(submissions).await
    }

    /// Submit items in order, stopping at the first failure
    pub async fn submit_batch<S: Submission>(&self, submissions: &mut [S]) -> FeedbackResult<()> {
        let kind = S::KIND;
        let total = submissions.len();
        for (index, submission) in submissions.iter_mut().enumerate() {
            if let Err(e) = self.submit(submission).await {
                warn!(
                    %kind,
                    index,
                    total,
                    "Feedback batch stopped at item {} of {}: {}",
                    index + 1,
                    total,
                    e
                );
                return Err(e);
            }
        }

        debug!(%kind, total, "Feedback batch submitted");
        Ok(())
    }

    /// Validate, resolve and store one submission
    pub async fn submit<S: Submission>(&self, submission: &mut S) -> FeedbackResult<()> {
        let kind = S::KIND;

        self.validator.validate(&*submission)?;

        let question_id = submission.question_id();
        let learner_id = submission.learner_id();

        let question = self
            .repository
            .get_question(kind, question_id)
            .await?
            .ok_or_else(|| {
                FeedbackError::invalid_argument(kind.question_id_field(), "unknown question id")
            })?;

        if self.repository.get_learner(learner_id).await?.is_none() {
            return Err(FeedbackError::invalid_argument(
                "learner_id",
                "unknown learner id",
            ));
        }

        if self
            .repository
            .get_existing_response(kind, question_id, learner_id)
            .await?
            .is_some()
        {
            debug!(%kind, %question_id, %learner_id, "Rejecting repeated feedback submission");
            return Err(FeedbackError::DuplicateSubmission {
                kind,
                question_id,
                learner_id,
            });
        }

        let answer = match question.question_type {
            QuestionType::MultiChoice => {
                let option_text = submission
                    .option_text()
                    .filter(|text| !text.trim().is_empty())
                    .ok_or_else(|| {
                        FeedbackError::invalid_argument(
                            "option_text",
                            "option text must be provided for MCQ responses",
                        )
                    })?;

                let option_id = self
                    .repository
                    .get_option_id_by_text(kind, question_id, option_text)
                    .await?
                    .ok_or_else(|| {
                        FeedbackError::invalid_argument("option_text", "unknown option")
                    })?;

                submission.clear_response();
                Answer::Option(option_id)
            }
            QuestionType::FreeText => {
                let text = submission
                    .response()
                    .filter(|text| !text.trim().is_empty())
                    .ok_or_else(|| {
                        FeedbackError::invalid_argument(
                            "response",
                            "response text must be provided for free-text responses",
                        )
                    })?;
                Answer::Text(text.to_string())
            }
        };

        let response = FeedbackResponse {
            response_id: uuid_utils::generate(),
            question: QuestionRef::new(kind, question_id),
            learner_id,
            answer,
            generated_at: time::now(),
            generated_by: self.submitter_tag.clone(),
        };

        self.repository.add_response(&response).await?;

        let container_id = question.container.id();
        submission.set_container_id(container_id);

        info!(
            %kind,
            %question_id,
            %learner_id,
            %container_id,
            response_id = %response.response_id,
            "Feedback response recorded"
        );

        Ok(())
    }
}

//! Feedback completion status
//!
//! A learner has completed a container's feedback when the container has
//! at least one question and the learner's response count equals the
//! question count. An empty container is reported incomplete so a quiz or
//! topic without questions never shows as done.

use crate::error::FeedbackResult;
use crate::models::{FeedbackKind, LearnerFeedbackStatus};
use crate::repository::FeedbackRepository;
use crate::service::FeedbackResponseService;
use tracing::debug;
use uuid::Uuid;

impl<R: FeedbackRepository> FeedbackResponseService<R> {
    pub async fn quiz_feedback_status(
        &self,
        learner_id: Uuid,
        quiz_id: Uuid,
    ) -> FeedbackResult<LearnerFeedbackStatus> {
        let complete = self.is_complete(FeedbackKind::Quiz, learner_id, quiz_id).await?;
        Ok(LearnerFeedbackStatus::new(FeedbackKind::Quiz, learner_id, complete))
    }

    pub async fn topic_feedback_status(
        &self,
        learner_id: Uuid,
        topic_id: Uuid,
    ) -> FeedbackResult<LearnerFeedbackStatus> {
        let complete = self.is_complete(FeedbackKind::Topic, learner_id, topic_id).await?;
        Ok(LearnerFeedbackStatus::new(FeedbackKind::Topic, learner_id, complete))
    }

    pub async fn is_complete(
        &self,
        kind: FeedbackKind,
        learner_id: Uuid,
        container_id: Uuid,
    ) -> FeedbackResult<bool> {
        let questions = self
            .repository
            .get_questions_by_container(kind, container_id)
            .await?;
        let responses = self
            .repository
            .get_responses_by_learner(kind, container_id, learner_id)
            .await?;

        let complete = !questions.is_empty() && questions.len() == responses.len();

        debug!(
            %kind,
            %learner_id,
            %container_id,
            questions = questions.len(),
            responses = responses.len(),
            complete,
            "Computed feedback status"
        );

        Ok(complete)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{
        ContainerRef, FeedbackQuestion, Learner, QuestionType, QuizFeedbackSubmission,
    };
    use crate::repository::InMemoryFeedbackRepository;
    use crate::service::FeedbackResponseService;
    use uuid::Uuid;

    fn free_text_question(quiz_id: Uuid, question_no: i64) -> FeedbackQuestion {
        FeedbackQuestion {
            question_id: Uuid::new_v4(),
            container: ContainerRef::Quiz(quiz_id),
            question_no,
            question: format!("Question {}", question_no),
            question_type: QuestionType::FreeText,
            options: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_quiz_is_incomplete() {
        let service = FeedbackResponseService::new(InMemoryFeedbackRepository::new());
        let learner_id = Uuid::new_v4();

        let status = service
            .quiz_feedback_status(learner_id, Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(status.learner_id, learner_id);
        assert!(!status.is_quiz_feedback_submitted);
        assert!(!status.is_topic_feedback_submitted);
    }

    #[tokio::test]
    async fn test_status_tracks_partial_and_full_completion() {
        let repo = InMemoryFeedbackRepository::new();
        let learner_id = Uuid::new_v4();
        let quiz_id = Uuid::new_v4();
        let q1 = free_text_question(quiz_id, 1);
        let q2 = free_text_question(quiz_id, 2);
        let (q1_id, q2_id) = (q1.question_id, q2.question_id);

        repo.insert_learner(Learner { learner_id, email: None }).await;
        repo.insert_question(q1).await;
        repo.insert_question(q2).await;
        let service = FeedbackResponseService::new(repo);

        let answer = |question_id| QuizFeedbackSubmission {
            quiz_feedback_question_id: question_id,
            learner_id,
            response: Some("fine".to_string()),
            ..Default::default()
        };

        let status = service.quiz_feedback_status(learner_id, quiz_id).await.unwrap();
        assert!(!status.is_quiz_feedback_submitted);

        service.submit_quiz_feedback(&mut answer(q1_id)).await.unwrap();
        let status = service.quiz_feedback_status(learner_id, quiz_id).await.unwrap();
        assert!(!status.is_quiz_feedback_submitted);

        service.submit_quiz_feedback(&mut answer(q2_id)).await.unwrap();
        let status = service.quiz_feedback_status(learner_id, quiz_id).await.unwrap();
        assert!(status.is_quiz_feedback_submitted);
        assert!(!status.is_topic_feedback_submitted);

        // Another learner's status is unaffected
        let other = service.quiz_feedback_status(Uuid::new_v4(), quiz_id).await.unwrap();
        assert!(!other.is_quiz_feedback_submitted);
    }
}

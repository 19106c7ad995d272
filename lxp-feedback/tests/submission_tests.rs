//! Integration tests for the feedback submission workflow
//!
//! Tests cover:
//! - Free-text and multiple-choice submissions stored through SQLite
//! - Rejection order: validation, unknown question, unknown learner,
//!   duplicate, option resolution
//! - Fail-fast batch submission
//! - Racing duplicate submissions
//! - Storage failures surfacing as retryable persistence errors

mod helpers;

use helpers::{count_responses, memory_pool, seed_learner, seed_option, seed_question};
use lxp_feedback::{
    Answer, ContainerRef, FeedbackError, FeedbackKind, FeedbackQuestion, FeedbackRepository,
    FeedbackResponseService, InMemoryFeedbackRepository, Learner, QuestionRef, QuestionType,
    QuizFeedbackSubmission, SqliteFeedbackRepository, TopicFeedbackSubmission,
};
use sqlx::SqlitePool;
use uuid::Uuid;

fn quiz_text(question_id: Uuid, learner_id: Uuid, text: &str) -> QuizFeedbackSubmission {
    QuizFeedbackSubmission {
        quiz_feedback_question_id: question_id,
        learner_id,
        response: Some(text.to_string()),
        ..Default::default()
    }
}

fn quiz_option(question_id: Uuid, learner_id: Uuid, option_text: &str) -> QuizFeedbackSubmission {
    QuizFeedbackSubmission {
        quiz_feedback_question_id: question_id,
        learner_id,
        option_text: Some(option_text.to_string()),
        ..Default::default()
    }
}

fn service(pool: &SqlitePool) -> FeedbackResponseService<SqliteFeedbackRepository> {
    FeedbackResponseService::new(SqliteFeedbackRepository::new(pool.clone()))
}

// =============================================================================
// Single submissions
// =============================================================================

#[tokio::test]
async fn test_free_text_response_stored_and_duplicate_rejected() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let quiz_id = Uuid::new_v4();
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        quiz_id,
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    let mut first = quiz_text(question, learner, "Great course");
    service.submit_quiz_feedback(&mut first).await.unwrap();
    assert_eq!(first.quiz_id, Some(quiz_id));

    let stored = service
        .repository()
        .get_existing_response(FeedbackKind::Quiz, question, learner)
        .await
        .unwrap()
        .expect("response should be stored");
    assert_eq!(stored.question, QuestionRef::Quiz(question));
    assert_eq!(stored.learner_id, learner);
    assert_eq!(stored.answer, Answer::Text("Great course".to_string()));
    assert_eq!(stored.answer.option_id(), None);
    assert_eq!(stored.generated_by, "learner");

    let mut second = quiz_text(question, learner, "Changed my mind");
    let err = service.submit_quiz_feedback(&mut second).await.unwrap_err();
    assert!(
        matches!(err, FeedbackError::DuplicateSubmission { question_id, learner_id, .. }
            if question_id == question && learner_id == learner),
        "unexpected error: {}",
        err
    );
    assert_eq!(second.quiz_id, None);
    assert_eq!(count_responses(&pool).await, 1);
}

#[tokio::test]
async fn test_mcq_response_stores_option_and_clears_text() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let topic_id = Uuid::new_v4();
    let question = seed_question(
        &pool,
        FeedbackKind::Topic,
        topic_id,
        1,
        QuestionType::MultiChoice,
    )
    .await;
    let agree = seed_option(&pool, FeedbackKind::Topic, question, "Agree").await;
    seed_option(&pool, FeedbackKind::Topic, question, "Disagree").await;
    let service = service(&pool);

    let mut submission = TopicFeedbackSubmission {
        topic_feedback_question_id: question,
        learner_id: learner,
        response: Some("free text that must not be stored".to_string()),
        option_text: Some("Agree".to_string()),
        topic_id: None,
    };
    service.submit_topic_feedback(&mut submission).await.unwrap();

    assert_eq!(submission.response, None);
    assert_eq!(submission.topic_id, Some(topic_id));

    let stored = service
        .repository()
        .get_existing_response(FeedbackKind::Topic, question, learner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.answer, Answer::Option(agree));
    assert_eq!(stored.answer.text(), None);
}

#[tokio::test]
async fn test_mcq_unknown_option_is_invalid_argument() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::MultiChoice,
    )
    .await;
    seed_option(&pool, FeedbackKind::Quiz, question, "Agree").await;
    let service = service(&pool);

    // Matching is exact and case-sensitive
    for text in ["agree", "Agree ", "Strongly agree"] {
        let err = service
            .submit_quiz_feedback(&mut quiz_option(question, learner, text))
            .await
            .unwrap_err();
        assert!(
            matches!(err, FeedbackError::InvalidArgument { field: "option_text", .. }),
            "option {:?} gave {}",
            text,
            err
        );
    }

    assert_eq!(count_responses(&pool).await, 0);
}

#[tokio::test]
async fn test_mcq_option_from_other_question_is_rejected() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let quiz_id = Uuid::new_v4();
    let q1 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 1, QuestionType::MultiChoice).await;
    let q2 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 2, QuestionType::MultiChoice).await;
    seed_option(&pool, FeedbackKind::Quiz, q2, "Only on Q2").await;
    let service = service(&pool);

    let err = service
        .submit_quiz_feedback(&mut quiz_option(q1, learner, "Only on Q2"))
        .await
        .unwrap_err();

    assert!(matches!(err, FeedbackError::InvalidArgument { field: "option_text", .. }));
}

#[tokio::test]
async fn test_mcq_without_option_text_is_invalid_argument() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::MultiChoice,
    )
    .await;
    let service = service(&pool);

    // Passes field validation (response present) but MCQ needs an option
    let err = service
        .submit_quiz_feedback(&mut quiz_text(question, learner, "I liked it"))
        .await
        .unwrap_err();

    assert!(matches!(err, FeedbackError::InvalidArgument { field: "option_text", .. }));
}

#[tokio::test]
async fn test_free_text_without_response_is_invalid_argument() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    let err = service
        .submit_quiz_feedback(&mut quiz_option(question, learner, "Agree"))
        .await
        .unwrap_err();

    assert!(matches!(err, FeedbackError::InvalidArgument { field: "response", .. }));
    assert_eq!(count_responses(&pool).await, 0);
}

#[tokio::test]
async fn test_free_text_with_blank_response_is_invalid_argument() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    // The option text satisfies field validation; the whitespace answer must not be stored
    let mut submission = quiz_option(question, learner, "Agree");
    submission.response = Some("   ".to_string());
    let err = service.submit_quiz_feedback(&mut submission).await.unwrap_err();

    assert!(matches!(err, FeedbackError::InvalidArgument { field: "response", .. }));
    assert_eq!(submission.quiz_id, None);
    assert_eq!(count_responses(&pool).await, 0);
}

#[tokio::test]
async fn test_mcq_with_blank_option_text_is_invalid_argument() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::MultiChoice,
    )
    .await;
    seed_option(&pool, FeedbackKind::Quiz, question, "Agree").await;
    let service = service(&pool);

    let mut submission = quiz_text(question, learner, "I liked it");
    submission.option_text = Some("  ".to_string());
    let err = service.submit_quiz_feedback(&mut submission).await.unwrap_err();

    assert!(matches!(err, FeedbackError::InvalidArgument { field: "option_text", .. }));
    assert_eq!(count_responses(&pool).await, 0);
}

#[tokio::test]
async fn test_unknown_question_and_learner() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Topic,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    let mut unknown_question = TopicFeedbackSubmission {
        topic_feedback_question_id: Uuid::new_v4(),
        learner_id: learner,
        response: Some("hello".to_string()),
        ..Default::default()
    };
    let err = service.submit_topic_feedback(&mut unknown_question).await.unwrap_err();
    assert!(matches!(
        err,
        FeedbackError::InvalidArgument { field: "topic_feedback_question_id", .. }
    ));

    let mut unknown_learner = TopicFeedbackSubmission {
        topic_feedback_question_id: question,
        learner_id: Uuid::new_v4(),
        response: Some("hello".to_string()),
        ..Default::default()
    };
    let err = service.submit_topic_feedback(&mut unknown_learner).await.unwrap_err();
    assert!(matches!(err, FeedbackError::InvalidArgument { field: "learner_id", .. }));
}

#[tokio::test]
async fn test_validation_runs_before_lookups() {
    let pool = memory_pool().await;
    let service = service(&pool);

    // Nothing is seeded: only field validation can produce this error
    let mut submission = QuizFeedbackSubmission::default();
    let err = service.submit_quiz_feedback(&mut submission).await.unwrap_err();

    match err {
        FeedbackError::Validation(errors) => {
            assert_eq!(errors.len(), 3);
            assert!(errors.has_field("quiz_feedback_question_id"));
            assert!(errors.has_field("learner_id"));
            assert!(errors.has_field("response"));
        }
        other => panic!("expected validation error, got {}", other),
    }
}

#[tokio::test]
async fn test_quiz_and_topic_responses_are_independent() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let quiz_question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let topic_question = seed_question(
        &pool,
        FeedbackKind::Topic,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    service
        .submit_quiz_feedback(&mut quiz_text(quiz_question, learner, "quiz"))
        .await
        .unwrap();
    service
        .submit_topic_feedback(&mut TopicFeedbackSubmission {
            topic_feedback_question_id: topic_question,
            learner_id: learner,
            response: Some("topic".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(count_responses(&pool).await, 2);
}

// =============================================================================
// Batch submission (fail-fast)
// =============================================================================

#[tokio::test]
async fn test_batch_stops_at_first_invalid_item() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let quiz_id = Uuid::new_v4();
    let q1 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 1, QuestionType::FreeText).await;
    let q2 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 2, QuestionType::FreeText).await;
    let q3 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 3, QuestionType::FreeText).await;
    let service = service(&pool);

    let mut batch = vec![
        quiz_text(q1, learner, "first"),
        quiz_text(Uuid::new_v4(), learner, "unknown question"),
        quiz_text(q3, learner, "never attempted"),
    ];

    let err = service.submit_quiz_feedback_batch(&mut batch).await.unwrap_err();
    assert!(matches!(err, FeedbackError::InvalidArgument { .. }));

    assert_eq!(batch[0].quiz_id, Some(quiz_id));
    assert_eq!(batch[1].quiz_id, None);
    assert_eq!(batch[2].quiz_id, None);
    assert_eq!(count_responses(&pool).await, 1);

    let repo = service.repository();
    assert!(repo.get_existing_response(FeedbackKind::Quiz, q1, learner).await.unwrap().is_some());
    assert!(repo.get_existing_response(FeedbackKind::Quiz, q2, learner).await.unwrap().is_none());
    assert!(repo.get_existing_response(FeedbackKind::Quiz, q3, learner).await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_completes_quiz_feedback() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let quiz_id = Uuid::new_v4();
    let q1 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 1, QuestionType::FreeText).await;
    let q2 = seed_question(&pool, FeedbackKind::Quiz, quiz_id, 2, QuestionType::MultiChoice).await;
    seed_option(&pool, FeedbackKind::Quiz, q2, "Yes").await;
    let service = service(&pool);

    let mut batch = vec![quiz_text(q1, learner, "fine"), quiz_option(q2, learner, "Yes")];
    service.submit_quiz_feedback_batch(&mut batch).await.unwrap();

    assert!(batch.iter().all(|s| s.quiz_id == Some(quiz_id)));
    let status = service.quiz_feedback_status(learner, quiz_id).await.unwrap();
    assert!(status.is_quiz_feedback_submitted);
}

#[tokio::test]
async fn test_empty_batch_is_ok() {
    let pool = memory_pool().await;
    let service = service(&pool);

    let mut batch: Vec<TopicFeedbackSubmission> = Vec::new();
    service.submit_topic_feedback_batch(&mut batch).await.unwrap();
}

// =============================================================================
// Races and storage failures
// =============================================================================

#[tokio::test]
async fn test_racing_duplicate_submissions_store_one_response() {
    let pool = memory_pool().await;
    let learner = seed_learner(&pool).await;
    let question = seed_question(
        &pool,
        FeedbackKind::Quiz,
        Uuid::new_v4(),
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    let mut a = quiz_text(question, learner, "from tab A");
    let mut b = quiz_text(question, learner, "from tab B");

    let (ra, rb) = tokio::join!(
        service.submit_quiz_feedback(&mut a),
        service.submit_quiz_feedback(&mut b)
    );

    let outcomes = [ra, rb];
    let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|r| matches!(r, Err(FeedbackError::DuplicateSubmission { .. })))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(count_responses(&pool).await, 1);
}

#[tokio::test]
async fn test_storage_failure_is_retryable_persistence_error() {
    let repo = InMemoryFeedbackRepository::new();
    let learner_id = Uuid::new_v4();
    let question_id = Uuid::new_v4();
    repo.insert_learner(Learner { learner_id, email: None }).await;
    repo.insert_question(FeedbackQuestion {
        question_id,
        container: ContainerRef::Quiz(Uuid::new_v4()),
        question_no: 1,
        question: "Anything else?".to_string(),
        question_type: QuestionType::FreeText,
        options: Vec::new(),
    })
    .await;
    repo.set_fail_writes(true).await;
    let service = FeedbackResponseService::new(repo);

    let mut submission = quiz_text(question_id, learner_id, "no");
    let err = service.submit_quiz_feedback(&mut submission).await.unwrap_err();

    assert!(matches!(err, FeedbackError::Persistence(_)));
    assert!(err.is_retryable());
    assert_eq!(submission.quiz_id, None);

    // Retry succeeds once storage recovers
    service.repository().set_fail_writes(false).await;
    service.submit_quiz_feedback(&mut submission).await.unwrap();
    assert_eq!(service.repository().responses().await.len(), 1);
}

#[tokio::test]
async fn test_on_disk_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pool = lxp_common::db::init_database(&dir.path().join("lxp.db")).await.unwrap();
    let learner = seed_learner(&pool).await;
    let topic_id = Uuid::new_v4();
    let question = seed_question(
        &pool,
        FeedbackKind::Topic,
        topic_id,
        1,
        QuestionType::FreeText,
    )
    .await;
    let service = service(&pool);

    let mut submission = TopicFeedbackSubmission {
        topic_feedback_question_id: question,
        learner_id: learner,
        response: Some("Great course".to_string()),
        ..Default::default()
    };
    service.submit_topic_feedback(&mut submission).await.unwrap();

    let status = service.topic_feedback_status(learner, topic_id).await.unwrap();
    assert!(status.is_topic_feedback_submitted);
    assert!(!status.is_quiz_feedback_submitted);
}

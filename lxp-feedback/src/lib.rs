//! lxp-feedback library - learner feedback for quizzes and topics
//!
//! Records learner responses to quiz and topic feedback questions and
//! reports whether a learner has answered every question of a container.
//! Storage is reached through [`FeedbackRepository`]; the workspace ships a
//! SQLite implementation and an in-memory one.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod status;
pub mod validation;

pub use error::{FeedbackError, FeedbackResult};
pub use models::{
    Answer, ContainerRef, FeedbackKind, FeedbackOption, FeedbackQuestion, FeedbackResponse,
    Learner, LearnerFeedbackStatus, QuestionRef, QuestionType, QuizFeedbackSubmission,
    Submission, TopicFeedbackSubmission,
};
pub use repository::{FeedbackRepository, InMemoryFeedbackRepository, SqliteFeedbackRepository};
pub use service::FeedbackResponseService;
pub use validation::{FieldError, SubmissionValidator, ValidationErrors};

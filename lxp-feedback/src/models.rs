//! Feedback domain types
//!
//! Quiz and topic feedback share one shape; the [`FeedbackKind`] tag says
//! which family a question or response belongs to. References that could
//! point at either family are tagged variants ([`QuestionRef`],
//! [`ContainerRef`]) rather than pairs of optional ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which feedback family a question or response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Quiz,
    Topic,
}

impl FeedbackKind {
    /// Storage tag (`question_kind` column)
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Quiz => "quiz",
            FeedbackKind::Topic => "topic",
        }
    }

    /// Submission field carrying the question id
    pub fn question_id_field(&self) -> &'static str {
        match self {
            FeedbackKind::Quiz => "quiz_feedback_question_id",
            FeedbackKind::Topic => "topic_feedback_question_id",
        }
    }

    /// Submission field receiving the resolved container id
    pub fn container_id_field(&self) -> &'static str {
        match self {
            FeedbackKind::Quiz => "quiz_id",
            FeedbackKind::Topic => "topic_id",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a question is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Answered with free text
    FreeText,
    /// Answered by selecting one of the question's options
    MultiChoice,
}

impl QuestionType {
    pub const MULTI_CHOICE_TAG: &'static str = "MCQ";
    pub const FREE_TEXT_TAG: &'static str = "DESCRIPTIVE";

    /// Storage tag (`question_type` column)
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::FreeText => Self::FREE_TEXT_TAG,
            QuestionType::MultiChoice => Self::MULTI_CHOICE_TAG,
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    /// Case-insensitive match on the stored tag
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == Self::MULTI_CHOICE_TAG {
            Ok(QuestionType::MultiChoice)
        } else if upper == Self::FREE_TEXT_TAG {
            Ok(QuestionType::FreeText)
        } else {
            Err(format!("unknown question type: {}", s))
        }
    }
}

/// The quiz or topic a question is defined under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContainerRef {
    Quiz(Uuid),
    Topic(Uuid),
}

impl ContainerRef {
    pub fn new(kind: FeedbackKind, id: Uuid) -> Self {
        match kind {
            FeedbackKind::Quiz => ContainerRef::Quiz(id),
            FeedbackKind::Topic => ContainerRef::Topic(id),
        }
    }

    pub fn kind(&self) -> FeedbackKind {
        match self {
            ContainerRef::Quiz(_) => FeedbackKind::Quiz,
            ContainerRef::Topic(_) => FeedbackKind::Topic,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ContainerRef::Quiz(id) | ContainerRef::Topic(id) => *id,
        }
    }
}

/// The question a response answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum QuestionRef {
    Quiz(Uuid),
    Topic(Uuid),
}

impl QuestionRef {
    pub fn new(kind: FeedbackKind, question_id: Uuid) -> Self {
        match kind {
            FeedbackKind::Quiz => QuestionRef::Quiz(question_id),
            FeedbackKind::Topic => QuestionRef::Topic(question_id),
        }
    }

    pub fn kind(&self) -> FeedbackKind {
        match self {
            QuestionRef::Quiz(_) => FeedbackKind::Quiz,
            QuestionRef::Topic(_) => FeedbackKind::Topic,
        }
    }

    pub fn question_id(&self) -> Uuid {
        match self {
            QuestionRef::Quiz(id) | QuestionRef::Topic(id) => *id,
        }
    }
}

/// Selectable option of a multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackOption {
    pub option_id: Uuid,
    pub question_id: Uuid,
    pub option_text: String,
}

/// A quiz or topic feedback question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackQuestion {
    pub question_id: Uuid,
    pub container: ContainerRef,
    pub question_no: i64,
    pub question: String,
    pub question_type: QuestionType,
    /// Empty for free-text questions
    pub options: Vec<FeedbackOption>,
}

impl FeedbackQuestion {
    pub fn kind(&self) -> FeedbackKind {
        self.container.kind()
    }

    /// Exact, case-sensitive option lookup within this question
    pub fn option_by_text(&self, text: &str) -> Option<&FeedbackOption> {
        self.options.iter().find(|o| o.option_text == text)
    }
}

/// Learner reference; the learner record itself is owned elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    pub learner_id: Uuid,
    pub email: Option<String>,
}

/// Stored payload of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Free-text answer
    Text(String),
    /// Selected option of a multiple-choice question
    Option(Uuid),
}

impl Answer {
    pub fn text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            Answer::Option(_) => None,
        }
    }

    pub fn option_id(&self) -> Option<Uuid> {
        match self {
            Answer::Text(_) => None,
            Answer::Option(id) => Some(*id),
        }
    }
}

/// A persisted learner response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub response_id: Uuid,
    pub question: QuestionRef,
    pub learner_id: Uuid,
    pub answer: Answer,
    pub generated_at: DateTime<Utc>,
    /// Submitter tag, e.g. "learner"
    pub generated_by: String,
}

/// Common view of quiz and topic submissions
///
/// Lets one submission routine serve both feedback kinds.
pub trait Submission {
    const KIND: FeedbackKind;

    fn question_id(&self) -> Uuid;
    fn learner_id(&self) -> Uuid;
    fn response(&self) -> Option<&str>;
    fn option_text(&self) -> Option<&str>;

    /// Drop the free-text payload (multiple-choice answers carry none)
    fn clear_response(&mut self);

    /// Quiz or topic id filled in after a successful submission
    fn container_id(&self) -> Option<Uuid>;
    fn set_container_id(&mut self, container_id: Uuid);
}

/// Learner response to a quiz feedback question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizFeedbackSubmission {
    pub quiz_feedback_question_id: Uuid,
    pub learner_id: Uuid,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub option_text: Option<String>,
    /// Set by the service once the response is stored; never read from input
    #[serde(default, skip_deserializing)]
    pub quiz_id: Option<Uuid>,
}

impl Submission for QuizFeedbackSubmission {
    const KIND: FeedbackKind = FeedbackKind::Quiz;

    fn question_id(&self) -> Uuid {
        self.quiz_feedback_question_id
    }

    fn learner_id(&self) -> Uuid {
        self.learner_id
    }

    fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    fn option_text(&self) -> Option<&str> {
        self.option_text.as_deref()
    }

    fn clear_response(&mut self) {
        self.response = None;
    }

    fn container_id(&self) -> Option<Uuid> {
        self.quiz_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.quiz_id = Some(container_id);
    }
}

/// Learner response to a topic feedback question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFeedbackSubmission {
    pub topic_feedback_question_id: Uuid,
    pub learner_id: Uuid,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub option_text: Option<String>,
    /// Set by the service once the response is stored; never read from input
    #[serde(default, skip_deserializing)]
    pub topic_id: Option<Uuid>,
}

impl Submission for TopicFeedbackSubmission {
    const KIND: FeedbackKind = FeedbackKind::Topic;

    fn question_id(&self) -> Uuid {
        self.topic_feedback_question_id
    }

    fn learner_id(&self) -> Uuid {
        self.learner_id
    }

    fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    fn option_text(&self) -> Option<&str> {
        self.option_text.as_deref()
    }

    fn clear_response(&mut self) {
        self.response = None;
    }

    fn container_id(&self) -> Option<Uuid> {
        self.topic_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.topic_id = Some(container_id);
    }
}

/// Whether a learner has answered every feedback question of a container
///
/// Only the flag matching the queried kind can be true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerFeedbackStatus {
    pub learner_id: Uuid,
    pub is_quiz_feedback_submitted: bool,
    pub is_topic_feedback_submitted: bool,
}

impl LearnerFeedbackStatus {
    pub fn new(kind: FeedbackKind, learner_id: Uuid, complete: bool) -> Self {
        Self {
            learner_id,
            is_quiz_feedback_submitted: kind == FeedbackKind::Quiz && complete,
            is_topic_feedback_submitted: kind == FeedbackKind::Topic && complete,
        }
    }
}

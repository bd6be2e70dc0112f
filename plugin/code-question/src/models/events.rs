//! Hook payloads and the events the plugin pushes back through the
//! notification channel.
//!
//! Inbound shapes are defined by the host dispatcher; outbound shapes
//! mirror the `asq:question_type` socket payloads the front end consumes
//! (`progress`, `restorePresenter`, `restoreViewer`).

use serde::{Deserialize, Serialize};

use super::submission::LatestSubmission;
use super::{ParsedQuestion, Question};

/// Socket event name every outbound event is emitted under.
pub const QUESTION_TYPE_EVENT: &str = "asq:question_type";

/// Privileged role that receives live aggregate progress.
pub const CTRL_ROLE: &str = "ctrl";

// ---------------------------------------------------------------------------
// Inbound hook payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentParsedEvent {
    pub presentation_id: String,
    /// Question definitions the ingestion collaborator extracted from the
    /// presentation document.
    pub questions: Vec<ParsedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmittedEvent {
    pub question_uid: String,
    pub session: String,
    pub answeree: String,
    pub submission: serde_json::Value,
    pub confidence: Option<i32>,
}

/// Payload of the presenter- and viewer-connected hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedEvent {
    /// Absent while no session is live; the hook is then a pass-through.
    pub session_id: Option<String>,
    pub presentation_id: String,
    /// Connection to push the restoration event to.
    pub connection_id: String,
    /// Identity of the connecting learner; set for viewer connections.
    pub whitelist_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "questionType")]
    pub question_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: QuestionProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionProgress {
    pub uid: String,
    /// Latest submission per learner, newest first.
    pub answers: Vec<LatestSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterRestoreEvent {
    #[serde(rename = "questionType")]
    pub question_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub questions: Vec<QuestionWithSubmissions>,
}

/// One question of the presentation with its full current state. Present
/// even when nobody has answered yet, with an empty `answers` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionWithSubmissions {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<LatestSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerRestoreEvent {
    #[serde(rename = "questionType")]
    pub question_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub questions: Vec<ViewerAnswer>,
}

/// A learner's own latest answer to one question. Questions the learner
/// never answered are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerAnswer {
    pub uid: String,
    pub submission: serde_json::Value,
}

impl ProgressEvent {
    pub fn new(question_type: &str, question: QuestionProgress) -> Self {
        Self {
            question_type: question_type.to_string(),
            kind: "progress".to_string(),
            question,
        }
    }
}

impl PresenterRestoreEvent {
    pub fn new(question_type: &str, questions: Vec<QuestionWithSubmissions>) -> Self {
        Self {
            question_type: question_type.to_string(),
            kind: "restorePresenter".to_string(),
            questions,
        }
    }
}

impl ViewerRestoreEvent {
    pub fn new(question_type: &str, questions: Vec<ViewerAnswer>) -> Self {
        Self {
            question_type: question_type.to_string(),
            kind: "restoreViewer".to_string(),
            questions,
        }
    }
}

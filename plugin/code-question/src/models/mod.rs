use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod events;
pub mod submission;

pub use submission::{LatestSubmission, SubmissionRecord};

/// A code question as persisted at document-ingestion time. Immutable
/// afterwards within this plugin's scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    /// The plugin tag that owns this question (e.g. `asq-code-q`).
    #[serde(rename = "type")]
    pub question_type: String,
    /// Presentation the question belongs to.
    pub presentation: String,
    pub data: QuestionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionData {
    /// Served markup of the element. The ingestion collaborator has already
    /// removed the solution element from it.
    pub html: String,
    /// Prompt markup.
    pub stem: String,
    /// Pre-filled starter code.
    pub code: String,
    /// Reference answer; never included in viewer-facing events.
    pub solution: String,
}

/// A question definition handed over by the document-ingestion collaborator
/// after it has extracted `<asq-code-q>` elements from a presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedQuestion {
    /// Uid carried by the element, if any. A fresh one is minted otherwise.
    pub uid: Option<String>,
    pub html: String,
    pub stem: String,
    pub code: String,
    pub solution: String,
}

impl Question {
    pub fn from_parsed(question_type: &str, presentation: &str, parsed: &ParsedQuestion) -> Self {
        let id = match parsed.uid.as_deref() {
            Some(uid) if !uid.trim().is_empty() => uid.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        Question {
            id,
            question_type: question_type.to_string(),
            presentation: presentation.to_string(),
            data: QuestionData {
                html: parsed.html.clone(),
                stem: parsed.stem.clone(),
                code: parsed.code.clone(),
                solution: parsed.solution.clone(),
            },
        }
    }
}

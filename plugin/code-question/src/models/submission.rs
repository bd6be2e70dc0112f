use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only row in the submission log. Rows are never updated or
/// deleted here; a learner's "current" answer is the row with the greatest
/// `(submit_date, seq)` for the (question, session, answeree) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub question: String,
    pub session: String,
    pub answeree: String,
    #[serde(rename = "type")]
    pub question_type: String,
    /// Assigned by the recorder at write time, not by the client.
    #[serde(rename = "submitDate")]
    pub submit_date: DateTime<Utc>,
    /// Logical write counter; breaks ties between rows sharing a timestamp
    /// at clock granularity.
    pub seq: i64,
    /// Opaque payload — free-form code text for this plugin.
    pub submission: serde_json::Value,
    /// Self-reported confidence, passed through unexamined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i32>,
}

/// A learner's most recent submission for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSubmission {
    pub answeree: String,
    #[serde(rename = "submitDate")]
    pub submit_date: DateTime<Utc>,
    pub submission: serde_json::Value,
}

impl SubmissionRecord {
    /// Ordering key for latest-wins reductions.
    pub fn recency(&self) -> (DateTime<Utc>, i64) {
        (self.submit_date, self.seq)
    }
}

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::error::PluginError;
use crate::models::events::AnswerSubmittedEvent;
use crate::models::SubmissionRecord;
use crate::stores::{QuestionStore, SubmissionLog};

/// What the recorder did with a submission event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// The referenced question belongs to another plugin type; the event
    /// must be forwarded unchanged, and nothing was written.
    NotOurs,
}

/// Appends submission rows to the log (spec of record: one write per
/// accepted event, timestamp and tie-break counter assigned server-side).
pub struct SubmissionRecorder {
    questions: Arc<dyn QuestionStore>,
    log: Arc<dyn SubmissionLog>,
    question_type: String,
    /// Monotonic write counter; disambiguates rows that land within the
    /// same clock tick.
    write_seq: AtomicI64,
}

impl SubmissionRecorder {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        log: Arc<dyn SubmissionLog>,
        question_type: impl Into<String>,
    ) -> Self {
        Self {
            questions,
            log,
            question_type: question_type.into(),
            write_seq: AtomicI64::new(0),
        }
    }

    pub async fn record(&self, answer: &AnswerSubmittedEvent) -> Result<RecordOutcome, PluginError> {
        let question = self
            .questions
            .find_by_id(&answer.question_uid)
            .await?
            .ok_or_else(|| PluginError::QuestionNotFound(answer.question_uid.clone()))?;

        if question.question_type != self.question_type {
            tracing::debug!(
                question = %answer.question_uid,
                actual_type = %question.question_type,
                "Submission for another plugin type, passing through"
            );
            return Ok(RecordOutcome::NotOurs);
        }

        if !answer.submission.is_string() {
            return Err(PluginError::MalformedSubmission {
                question: answer.question_uid.clone(),
                reason: "submission payload must be a string".to_string(),
            });
        }

        let record = SubmissionRecord {
            question: answer.question_uid.clone(),
            session: answer.session.clone(),
            answeree: answer.answeree.clone(),
            question_type: question.question_type,
            submit_date: Utc::now(),
            seq: self.write_seq.fetch_add(1, Ordering::Relaxed),
            submission: answer.submission.clone(),
            confidence: answer.confidence,
        };
        self.log.append(record).await?;

        tracing::info!(
            session = %answer.session,
            question = %answer.question_uid,
            answeree = %answer.answeree,
            "Submission recorded"
        );
        Ok(RecordOutcome::Recorded)
    }
}

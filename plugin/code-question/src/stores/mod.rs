//! Collaborator interfaces the plugin is constructed with.
//!
//! The host's persistence layer owns the actual data; this crate only
//! issues single-request writes and aggregation reads against these seams,
//! so the core stays testable without any host runtime present.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::events::ViewerAnswer;
use crate::models::{LatestSubmission, Question, SubmissionRecord};

pub mod memory;
pub mod mongo;

pub use memory::{
    EmitTarget, EmittedEvent, MemoryQuestionStore, MemorySubmissionLog, RecordingNotifier,
};
pub use mongo::{MongoQuestionStore, MongoSubmissionLog};

/// Append-only log of submissions, with the three latest-wins reductions
/// the plugin needs. Any store offering filter/sort/group-keep-first
/// semantics can implement this.
///
/// Every reduction orders rows by `(submitDate desc, seq desc)` before
/// keeping the first per group, and sorts its output by group key, so
/// re-running a read over an unchanged log is bit-identical.
#[async_trait]
pub trait SubmissionLog: Send + Sync {
    async fn append(&self, record: SubmissionRecord) -> Result<()>;

    /// Latest submission per learner for one (session, question) pair.
    async fn latest_per_learner(
        &self,
        session: &str,
        question: &str,
    ) -> Result<Vec<LatestSubmission>>;

    /// Latest submission per (learner, question), regrouped by question.
    /// Questions nobody answered are absent from the map.
    async fn latest_by_question(
        &self,
        session: &str,
        questions: &[String],
    ) -> Result<HashMap<String, Vec<LatestSubmission>>>;

    /// One learner's latest submission per question they answered, limited
    /// to the given question set.
    async fn latest_for_learner(
        &self,
        session: &str,
        answeree: &str,
        questions: &[String],
    ) -> Result<Vec<ViewerAnswer>>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Question>>;

    async fn find_by_presentation_and_type(
        &self,
        presentation: &str,
        question_type: &str,
    ) -> Result<Vec<Question>>;

    async fn insert_many(&self, questions: &[Question]) -> Result<()>;
}

/// Fire-and-forget notification channel; delivery and broadcast mechanics
/// live in the host's socket layer.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Push to every connection holding `role` in `session`.
    async fn emit_to_role(
        &self,
        event: &str,
        payload: serde_json::Value,
        session: &str,
        role: &str,
    ) -> Result<()>;

    /// Push to one specific connection.
    async fn emit_to_connection(
        &self,
        event: &str,
        payload: serde_json::Value,
        connection: &str,
    ) -> Result<()>;
}

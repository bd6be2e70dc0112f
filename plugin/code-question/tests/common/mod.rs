#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use asq_code_question::models::events::{AnswerSubmittedEvent, ConnectedEvent, ViewerAnswer};
use asq_code_question::models::{LatestSubmission, ParsedQuestion, Question, SubmissionRecord};
use asq_code_question::stores::{
    MemoryQuestionStore, MemorySubmissionLog, QuestionStore, RecordingNotifier, SubmissionLog,
};
use asq_code_question::CodeQuestionPlugin;

pub const TAG: &str = "asq-code-q";

pub struct TestHarness {
    pub plugin: CodeQuestionPlugin,
    pub questions: Arc<MemoryQuestionStore>,
    pub log: Arc<MemorySubmissionLog>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> TestHarness {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let questions = Arc::new(MemoryQuestionStore::new());
    let log = Arc::new(MemorySubmissionLog::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let plugin = CodeQuestionPlugin::new(questions.clone(), log.clone(), notifier.clone());
    TestHarness {
        plugin,
        questions,
        log,
        notifier,
    }
}

pub fn question(id: &str, question_type: &str, presentation: &str) -> Question {
    Question::from_parsed(
        question_type,
        presentation,
        &ParsedQuestion {
            uid: Some(id.to_string()),
            html: format!("<{0} uid=\"{1}\"></{0}>", question_type, id),
            stem: "<h3>Write a loop</h3>".to_string(),
            code: "int main() {}".to_string(),
            solution: "for(int i=0;i<5;i++)".to_string(),
        },
    )
}

pub async fn seed_questions(harness: &TestHarness, questions: &[Question]) {
    harness.questions.insert_many(questions).await.unwrap();
}

pub fn record(
    question: &str,
    session: &str,
    answeree: &str,
    secs: i64,
    seq: i64,
    text: &str,
) -> SubmissionRecord {
    SubmissionRecord {
        question: question.to_string(),
        session: session.to_string(),
        answeree: answeree.to_string(),
        question_type: TAG.to_string(),
        submit_date: timestamp(secs),
        seq,
        submission: json!(text),
        confidence: None,
    }
}

pub fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

pub fn answer_event(question_uid: &str, session: &str, answeree: &str, text: &str) -> AnswerSubmittedEvent {
    AnswerSubmittedEvent {
        question_uid: question_uid.to_string(),
        session: session.to_string(),
        answeree: answeree.to_string(),
        submission: json!(text),
        confidence: None,
    }
}

pub fn connected(
    session: Option<&str>,
    presentation: &str,
    connection: &str,
    whitelist: Option<&str>,
) -> ConnectedEvent {
    ConnectedEvent {
        session_id: session.map(str::to_string),
        presentation_id: presentation.to_string(),
        connection_id: connection.to_string(),
        whitelist_id: whitelist.map(str::to_string),
    }
}

/// Log whose every call fails, for exercising store-failure propagation.
pub struct FailingLog;

#[async_trait]
impl SubmissionLog for FailingLog {
    async fn append(&self, _record: SubmissionRecord) -> Result<()> {
        Err(anyhow!("submission log unavailable"))
    }

    async fn latest_per_learner(
        &self,
        _session: &str,
        _question: &str,
    ) -> Result<Vec<LatestSubmission>> {
        Err(anyhow!("submission log unavailable"))
    }

    async fn latest_by_question(
        &self,
        _session: &str,
        _questions: &[String],
    ) -> Result<HashMap<String, Vec<LatestSubmission>>> {
        Err(anyhow!("submission log unavailable"))
    }

    async fn latest_for_learner(
        &self,
        _session: &str,
        _answeree: &str,
        _questions: &[String],
    ) -> Result<Vec<ViewerAnswer>> {
        Err(anyhow!("submission log unavailable"))
    }
}

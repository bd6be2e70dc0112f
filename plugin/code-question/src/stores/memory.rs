//! In-process collaborators.
//!
//! These back the test suite and let a host embed the plugin without a
//! MongoDB deployment. The reductions mirror the Mongo pipelines exactly:
//! latest wins by `(submit_date, seq)`, output sorted by group key.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::{Notifier, QuestionStore, SubmissionLog};
use crate::models::events::ViewerAnswer;
use crate::models::{LatestSubmission, Question, SubmissionRecord};

#[derive(Default)]
pub struct MemorySubmissionLog {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemorySubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row, in insertion order.
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-pass latest-wins reduction keyed by `key`.
fn latest_by_key<'a, K, F>(rows: impl Iterator<Item = &'a SubmissionRecord>, key: F) -> HashMap<K, &'a SubmissionRecord>
where
    K: std::hash::Hash + Eq,
    F: Fn(&SubmissionRecord) -> K,
{
    let mut best: HashMap<K, &SubmissionRecord> = HashMap::new();
    for row in rows {
        best.entry(key(row))
            .and_modify(|current| {
                if row.recency() > current.recency() {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    best
}

fn to_latest(row: &SubmissionRecord) -> LatestSubmission {
    LatestSubmission {
        answeree: row.answeree.clone(),
        submit_date: row.submit_date,
        submission: row.submission.clone(),
    }
}

#[async_trait]
impl SubmissionLog for MemorySubmissionLog {
    async fn append(&self, record: SubmissionRecord) -> Result<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn latest_per_learner(
        &self,
        session: &str,
        question: &str,
    ) -> Result<Vec<LatestSubmission>> {
        let records = self.records.lock().unwrap();
        let best = latest_by_key(
            records
                .iter()
                .filter(|r| r.session == session && r.question == question),
            |r| r.answeree.clone(),
        );
        let mut answers: Vec<LatestSubmission> = best.values().map(|r| to_latest(r)).collect();
        answers.sort_by(|a, b| a.answeree.cmp(&b.answeree));
        Ok(answers)
    }

    async fn latest_by_question(
        &self,
        session: &str,
        questions: &[String],
    ) -> Result<HashMap<String, Vec<LatestSubmission>>> {
        let records = self.records.lock().unwrap();
        let best = latest_by_key(
            records
                .iter()
                .filter(|r| r.session == session && questions.contains(&r.question)),
            |r| (r.question.clone(), r.answeree.clone()),
        );

        let mut grouped: HashMap<String, Vec<LatestSubmission>> = HashMap::new();
        for ((question, _), row) in best {
            grouped.entry(question).or_default().push(to_latest(row));
        }
        for answers in grouped.values_mut() {
            // Newest first, learner id as tie-break, same as the pipeline.
            answers.sort_by(|a, b| {
                b.submit_date
                    .cmp(&a.submit_date)
                    .then_with(|| a.answeree.cmp(&b.answeree))
            });
        }
        Ok(grouped)
    }

    async fn latest_for_learner(
        &self,
        session: &str,
        answeree: &str,
        questions: &[String],
    ) -> Result<Vec<ViewerAnswer>> {
        let records = self.records.lock().unwrap();
        let best = latest_by_key(
            records.iter().filter(|r| {
                r.session == session && r.answeree == answeree && questions.contains(&r.question)
            }),
            |r| r.question.clone(),
        );
        let mut answers: Vec<ViewerAnswer> = best
            .into_iter()
            .map(|(uid, row)| ViewerAnswer {
                uid,
                submission: row.submission.clone(),
            })
            .collect();
        answers.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(answers)
    }
}

#[derive(Default)]
pub struct MemoryQuestionStore {
    questions: Mutex<Vec<Question>>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Question>> {
        Ok(self
            .questions
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn find_by_presentation_and_type(
        &self,
        presentation: &str,
        question_type: &str,
    ) -> Result<Vec<Question>> {
        let mut found: Vec<Question> = self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.presentation == presentation && q.question_type == question_type)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn insert_many(&self, questions: &[Question]) -> Result<()> {
        self.questions
            .lock()
            .unwrap()
            .extend(questions.iter().cloned());
        Ok(())
    }
}

/// What a [`RecordingNotifier`] captured for one emit call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: serde_json::Value,
    pub target: EmitTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmitTarget {
    Role { session: String, role: String },
    Connection(String),
}

/// Notifier that records every emit instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<EmittedEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn emit_to_role(
        &self,
        event: &str,
        payload: serde_json::Value,
        session: &str,
        role: &str,
    ) -> Result<()> {
        self.events.lock().unwrap().push(EmittedEvent {
            name: event.to_string(),
            payload,
            target: EmitTarget::Role {
                session: session.to_string(),
                role: role.to_string(),
            },
        });
        Ok(())
    }

    async fn emit_to_connection(
        &self,
        event: &str,
        payload: serde_json::Value,
        connection: &str,
    ) -> Result<()> {
        self.events.lock().unwrap().push(EmittedEvent {
            name: event.to_string(),
            payload,
            target: EmitTarget::Connection(connection.to_string()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn row(question: &str, answeree: &str, secs: i64, seq: i64, text: &str) -> SubmissionRecord {
        SubmissionRecord {
            question: question.to_string(),
            session: "s1".to_string(),
            answeree: answeree.to_string(),
            question_type: "asq-code-q".to_string(),
            submit_date: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            seq,
            submission: json!(text),
            confidence: None,
        }
    }

    #[tokio::test]
    async fn latest_per_learner_keeps_most_recent_row() {
        let log = MemorySubmissionLog::new();
        log.append(row("q1", "l1", 200, 1, "new")).await.unwrap();
        log.append(row("q1", "l1", 100, 0, "old")).await.unwrap();

        let answers = log.latest_per_learner("s1", "q1").await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].submission, json!("new"));
    }

    #[tokio::test]
    async fn equal_timestamps_resolve_by_seq() {
        let log = MemorySubmissionLog::new();
        log.append(row("q1", "l1", 100, 7, "second")).await.unwrap();
        log.append(row("q1", "l1", 100, 6, "first")).await.unwrap();

        let answers = log.latest_per_learner("s1", "q1").await.unwrap();
        assert_eq!(answers[0].submission, json!("second"));
    }

    #[tokio::test]
    async fn latest_per_learner_sorts_output_by_learner() {
        let log = MemorySubmissionLog::new();
        log.append(row("q1", "l2", 100, 0, "b")).await.unwrap();
        log.append(row("q1", "l1", 200, 1, "a")).await.unwrap();

        let answers = log.latest_per_learner("s1", "q1").await.unwrap();
        let learners: Vec<&str> = answers.iter().map(|a| a.answeree.as_str()).collect();
        assert_eq!(learners, vec!["l1", "l2"]);
    }
}

mod common;

use std::sync::Arc;

use common::{answer_event, harness, question, seed_questions, TAG};

use asq_code_question::models::events::DocumentParsedEvent;
use asq_code_question::models::ParsedQuestion;
use asq_code_question::stores::{
    MemoryQuestionStore, MemorySubmissionLog, QuestionStore, RecordingNotifier,
};
use asq_code_question::CodeQuestionPlugin;

fn parsed(uid: Option<&str>, stem: &str) -> ParsedQuestion {
    ParsedQuestion {
        uid: uid.map(str::to_string),
        html: "<asq-code-q></asq-code-q>".to_string(),
        stem: stem.to_string(),
        code: "int main() {}".to_string(),
        solution: "42".to_string(),
    }
}

#[tokio::test]
async fn document_parsed_persists_every_extracted_question() {
    let h = harness();

    let event = DocumentParsedEvent {
        presentation_id: "p1".to_string(),
        questions: vec![parsed(Some("q1"), "First"), parsed(None, "Second")],
    };
    let returned = h.plugin.document_parsed(event).await.unwrap();

    // Pass-through: the next plugin sees the same parsed document.
    assert_eq!(returned.questions.len(), 2);

    let stored = h
        .questions
        .find_by_presentation_and_type("p1", TAG)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().any(|q| q.id == "q1"));
    // The uid-less element got a minted id.
    assert!(stored.iter().all(|q| !q.id.trim().is_empty()));
    assert!(stored.iter().all(|q| q.question_type == TAG));
    assert!(stored.iter().all(|q| q.presentation == "p1"));
}

#[tokio::test]
async fn document_parsed_with_no_questions_is_a_no_op() {
    let h = harness();

    let event = DocumentParsedEvent {
        presentation_id: "p1".to_string(),
        questions: vec![],
    };
    h.plugin.document_parsed(event).await.unwrap();

    let stored = h
        .questions
        .find_by_presentation_and_type("p1", TAG)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn plugin_with_custom_tag_claims_only_its_own_questions() {
    let questions = Arc::new(MemoryQuestionStore::new());
    let log = Arc::new(MemorySubmissionLog::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let plugin = CodeQuestionPlugin::with_tag(
        "asq-rust-q",
        questions.clone(),
        log.clone(),
        notifier.clone(),
    );
    assert_eq!(plugin.question_type(), "asq-rust-q");

    questions
        .insert_many(&[question("q1", "asq-rust-q", "p1"), question("q2", TAG, "p1")])
        .await
        .unwrap();

    // Owned question: recorded.
    plugin
        .answer_submitted(answer_event("q1", "s1", "l1", "ours"))
        .await
        .unwrap();
    // Default-tag question is someone else's under this instance.
    plugin
        .answer_submitted(answer_event("q2", "s1", "l1", "theirs"))
        .await
        .unwrap();

    let rows = log.records();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].question, "q1");
}

#[tokio::test]
async fn seeded_question_roundtrips_through_the_store() {
    let h = harness();
    seed_questions(&h, &[question("q1", TAG, "p1")]).await;

    let found = h.questions.find_by_id("q1").await.unwrap().unwrap();
    assert_eq!(found.question_type, TAG);
    assert_eq!(found.data.solution, "for(int i=0;i<5;i++)");

    assert!(h.questions.find_by_id("nope").await.unwrap().is_none());
}

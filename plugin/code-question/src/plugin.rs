use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::error::PluginError;
use crate::models::events::{AnswerSubmittedEvent, ConnectedEvent, DocumentParsedEvent};
use crate::models::Question;
use crate::services::{ProgressService, RecordOutcome, RestoreService, SubmissionRecorder};
use crate::stores::{
    MongoQuestionStore, MongoSubmissionLog, Notifier, QuestionStore, SubmissionLog,
};

/// Element tag this plugin claims by default.
pub const DEFAULT_QUESTION_TAG: &str = "asq-code-q";

/// The code-question plugin. The host's hook dispatcher calls the four
/// entry points below; each one returns its (possibly unmodified) payload
/// so the whole plugin chain observes the same event.
///
/// Hook bodies are strictly sequential awaited calls: recording must
/// complete before progress is aggregated, and a rejected submission never
/// produces a progress event.
pub struct CodeQuestionPlugin {
    question_type: String,
    questions: Arc<dyn QuestionStore>,
    recorder: SubmissionRecorder,
    progress: ProgressService,
    restore: RestoreService,
}

impl CodeQuestionPlugin {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        log: Arc<dyn SubmissionLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_tag(DEFAULT_QUESTION_TAG, questions, log, notifier)
    }

    /// Build a plugin claiming an explicit question tag. The tag is plain
    /// configuration here; nothing else shares it.
    pub fn with_tag(
        question_type: &str,
        questions: Arc<dyn QuestionStore>,
        log: Arc<dyn SubmissionLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            question_type: question_type.to_string(),
            questions: questions.clone(),
            recorder: SubmissionRecorder::new(questions.clone(), log.clone(), question_type),
            progress: ProgressService::new(log.clone(), notifier.clone(), question_type),
            restore: RestoreService::new(questions, log, notifier, question_type),
        }
    }

    /// Wire the plugin against MongoDB-backed collaborators. The notifier
    /// stays host-supplied: delivery belongs to the host's socket layer.
    pub async fn connect(config: &Config, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let client = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            mongodb::Client::with_uri_str(&config.mongo_uri),
        )
        .await
        .map_err(|_| anyhow::anyhow!("MongoDB connection timeout after 30s"))?
        .context("Failed to connect to MongoDB")?;
        let db = client.database(&config.mongo_database);

        tracing::info!(
            database = %config.mongo_database,
            tag = %config.question_tag,
            "Code-question plugin connected"
        );

        let questions = Arc::new(MongoQuestionStore::new(
            db.clone(),
            config.questions_collection.clone(),
        ));
        let log = Arc::new(MongoSubmissionLog::new(
            db,
            config.submissions_collection.clone(),
        ));
        Ok(Self::with_tag(
            &config.question_tag,
            questions,
            log,
            notifier,
        ))
    }

    pub fn question_type(&self) -> &str {
        &self.question_type
    }

    /// Document-parsed hook: persist the question definitions the ingestion
    /// collaborator extracted for this presentation.
    pub async fn document_parsed(
        &self,
        event: DocumentParsedEvent,
    ) -> Result<DocumentParsedEvent, PluginError> {
        let questions: Vec<Question> = event
            .questions
            .iter()
            .map(|parsed| Question::from_parsed(&self.question_type, &event.presentation_id, parsed))
            .collect();

        tracing::info!(
            presentation = %event.presentation_id,
            count = questions.len(),
            "Persisting parsed code questions"
        );
        self.questions.insert_many(&questions).await?;
        Ok(event)
    }

    /// Answer-submission hook: append one row, then broadcast the updated
    /// latest-per-learner progress to the controller role.
    pub async fn answer_submitted(
        &self,
        event: AnswerSubmittedEvent,
    ) -> Result<AnswerSubmittedEvent, PluginError> {
        match self.recorder.record(&event).await? {
            RecordOutcome::Recorded => {
                self.progress
                    .broadcast_progress(&event.session, &event.question_uid)
                    .await?;
            }
            // Another plugin's question; forward untouched.
            RecordOutcome::NotOurs => {}
        }
        Ok(event)
    }

    /// Presenter-connected hook: push full per-question progress for the
    /// whole presentation to the reconnecting control surface.
    pub async fn presenter_connected(
        &self,
        event: ConnectedEvent,
    ) -> Result<ConnectedEvent, PluginError> {
        let Some(session) = event.session_id.clone() else {
            return Ok(event);
        };
        self.restore
            .restore_presenter(&session, &event.presentation_id, &event.connection_id)
            .await?;
        Ok(event)
    }

    /// Viewer-connected hook: push the learner's own latest answers back to
    /// their connection.
    pub async fn viewer_connected(
        &self,
        event: ConnectedEvent,
    ) -> Result<ConnectedEvent, PluginError> {
        let Some(session) = event.session_id.clone() else {
            return Ok(event);
        };
        let Some(answeree) = event.whitelist_id.clone() else {
            tracing::warn!(
                session = %session,
                connection = %event.connection_id,
                "Viewer connected without a learner id, skipping restoration"
            );
            return Ok(event);
        };
        self.restore
            .restore_viewer(&session, &event.presentation_id, &answeree, &event.connection_id)
            .await?;
        Ok(event)
    }
}

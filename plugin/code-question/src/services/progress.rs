use std::sync::Arc;

use crate::error::PluginError;
use crate::models::events::{ProgressEvent, QuestionProgress, CTRL_ROLE, QUESTION_TYPE_EVENT};
use crate::stores::{Notifier, SubmissionLog};

/// Live progress: latest submission per learner for one (session, question)
/// pair, pushed to every connection holding the controller role.
pub struct ProgressService {
    log: Arc<dyn SubmissionLog>,
    notifier: Arc<dyn Notifier>,
    question_type: String,
}

impl ProgressService {
    pub fn new(
        log: Arc<dyn SubmissionLog>,
        notifier: Arc<dyn Notifier>,
        question_type: impl Into<String>,
    ) -> Self {
        Self {
            log,
            notifier,
            question_type: question_type.into(),
        }
    }

    pub async fn broadcast_progress(
        &self,
        session: &str,
        question: &str,
    ) -> Result<(), PluginError> {
        let answers = self.log.latest_per_learner(session, question).await?;

        tracing::debug!(
            session = %session,
            question = %question,
            learners = answers.len(),
            "Broadcasting live progress"
        );

        let event = ProgressEvent::new(
            &self.question_type,
            QuestionProgress {
                uid: question.to_string(),
                answers,
            },
        );
        let payload = serde_json::to_value(&event).map_err(anyhow::Error::from)?;
        self.notifier
            .emit_to_role(QUESTION_TYPE_EVENT, payload, session, CTRL_ROLE)
            .await?;
        Ok(())
    }
}

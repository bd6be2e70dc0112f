use std::sync::Arc;

use crate::error::PluginError;
use crate::models::events::{
    PresenterRestoreEvent, QuestionWithSubmissions, ViewerAnswer, ViewerRestoreEvent,
    QUESTION_TYPE_EVENT,
};
use crate::stores::{Notifier, QuestionStore, SubmissionLog};

/// Rebuilds UI state for connections that (re)join an in-progress session.
pub struct RestoreService {
    questions: Arc<dyn QuestionStore>,
    log: Arc<dyn SubmissionLog>,
    notifier: Arc<dyn Notifier>,
    question_type: String,
}

impl RestoreService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        log: Arc<dyn SubmissionLog>,
        notifier: Arc<dyn Notifier>,
        question_type: impl Into<String>,
    ) -> Self {
        Self {
            questions,
            log,
            notifier,
            question_type: question_type.into(),
        }
    }

    /// Full current state of every question of this type in the
    /// presentation, one entry per question.
    ///
    /// The question list comes from the question store, not from the
    /// aggregation: a question nobody answered yet must still appear, with
    /// an empty submissions list, or it would silently vanish from the
    /// presenter's restored view.
    pub async fn presenter_snapshot(
        &self,
        session: &str,
        presentation: &str,
    ) -> Result<Vec<QuestionWithSubmissions>, PluginError> {
        let questions = self
            .questions
            .find_by_presentation_and_type(presentation, &self.question_type)
            .await?;
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let mut grouped = self.log.latest_by_question(session, &ids).await?;

        Ok(questions
            .into_iter()
            .map(|question| {
                let answers = grouped.remove(&question.id).unwrap_or_default();
                QuestionWithSubmissions { question, answers }
            })
            .collect())
    }

    pub async fn restore_presenter(
        &self,
        session: &str,
        presentation: &str,
        connection: &str,
    ) -> Result<(), PluginError> {
        let questions = self.presenter_snapshot(session, presentation).await?;

        tracing::info!(
            session = %session,
            presentation = %presentation,
            questions = questions.len(),
            "Restoring presenter state"
        );

        let event = PresenterRestoreEvent::new(&self.question_type, questions);
        let payload = serde_json::to_value(&event).map_err(anyhow::Error::from)?;
        self.notifier
            .emit_to_connection(QUESTION_TYPE_EVENT, payload, connection)
            .await?;
        Ok(())
    }

    /// One learner's own latest answer per question of this type they
    /// answered in the presentation. Unanswered questions are absent.
    pub async fn viewer_snapshot(
        &self,
        session: &str,
        presentation: &str,
        answeree: &str,
    ) -> Result<Vec<ViewerAnswer>, PluginError> {
        let questions = self
            .questions
            .find_by_presentation_and_type(presentation, &self.question_type)
            .await?;
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let answers = self.log.latest_for_learner(session, answeree, &ids).await?;
        Ok(answers)
    }

    pub async fn restore_viewer(
        &self,
        session: &str,
        presentation: &str,
        answeree: &str,
        connection: &str,
    ) -> Result<(), PluginError> {
        let answers = self.viewer_snapshot(session, presentation, answeree).await?;

        tracing::info!(
            session = %session,
            presentation = %presentation,
            answeree = %answeree,
            answered = answers.len(),
            "Restoring viewer state"
        );

        let event = ViewerRestoreEvent::new(&self.question_type, answers);
        let payload = serde_json::to_value(&event).map_err(anyhow::Error::from)?;
        self.notifier
            .emit_to_connection(QUESTION_TYPE_EVENT, payload, connection)
            .await?;
        Ok(())
    }
}

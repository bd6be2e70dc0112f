use thiserror::Error;

/// Failures a single hook invocation can surface to the dispatcher.
///
/// A submission referencing a question of another plugin type is *not* an
/// error: the event is forwarded unchanged so the next handler in the chain
/// can claim it.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("question {0} not found")]
    QuestionNotFound(String),

    #[error("invalid submission for question {question}: {reason}")]
    MalformedSubmission { question: String, reason: String },

    /// Store or channel failure, propagated unchanged. No retry or fallback
    /// happens here; resilience belongs to the store and the host dispatcher.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

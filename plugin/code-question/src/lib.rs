//! ASQ plugin for `<asq-code-q>` code-writing questions.
//!
//! The host runtime drives this crate through four lifecycle hooks
//! (document parsed, answer submitted, presenter connected, viewer
//! connected); everything else — the submission log, the question
//! collection and the notification channel — is an injected collaborator.
//! The plugin owns no listener, no process lifecycle and no in-memory
//! authoritative state: every read re-derives "current progress" from the
//! append-only submission log.

pub mod config;
pub mod error;
pub mod models;
pub mod plugin;
pub mod services;
pub mod stores;

pub use config::Config;
pub use error::PluginError;
pub use plugin::{CodeQuestionPlugin, DEFAULT_QUESTION_TAG};

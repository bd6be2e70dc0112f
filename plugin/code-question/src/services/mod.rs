pub mod progress;
pub mod recorder;
pub mod restore;

pub use progress::ProgressService;
pub use recorder::{RecordOutcome, SubmissionRecorder};
pub use restore::RestoreService;

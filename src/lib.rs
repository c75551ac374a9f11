// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod exercise;
pub mod logging;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod ui;
pub mod util;
pub mod verse;

pub use error::{ConfigError, ProgressError, TranscriptionError, VerseError};
pub use session::{run_exercise, run_exercise_with, CompletionEvent, Session};
pub use verse::Verse;

use thiserror::Error;

/// Rejections raised while building a verse, before any exercise exists
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerseError {
    #[error("verse text is empty")]
    EmptyText,

    #[error("invalid verse reference: {0:?}")]
    InvalidReference(String),
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    Failed(String),

    #[error("transcription cancelled")]
    Cancelled,

    #[error("transcription worker went away")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while capturing, scoring and retaining snippets.
///
/// `RecordingController::start` surfaces `InvalidConfiguration`,
/// `AlreadyCapturing` and backend start failures (`Other`). The per-chunk
/// variants are logged and counted by the capture loop; they never end a
/// session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("audio source read failed: {0}")]
    SourceRead(String),

    #[error("failed to materialize snippet {name}: {source}")]
    EncodeOrStorage {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to delete snippet file {path:?}: {source}")]
    StorageDeletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a recording session is already in progress")]
    AlreadyCapturing,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;

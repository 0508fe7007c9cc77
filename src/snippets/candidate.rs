use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A scored chunk that has been written to storage
///
/// Whoever holds the candidate owns its file: the capture loop between
/// encode and offer, the selector while it is retained, and the persistence
/// sink after finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Backing WAV file
    pub path: PathBuf,

    /// RMS loudness of the full chunk
    pub score: f64,

    /// When the chunk was materialized
    pub captured_at: DateTime<Utc>,

    /// Chunk index within the session
    pub sequence_number: u64,
}

impl Candidate {
    pub fn new(path: PathBuf, score: f64, captured_at: DateTime<Utc>, sequence_number: u64) -> Self {
        Self {
            path,
            score,
            captured_at,
            sequence_number,
        }
    }

    /// File name component of the backing path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

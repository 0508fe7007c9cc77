use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snippets::Candidate;

/// One recording session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (e.g., "session-0b6f...")
    pub id: String,

    /// When capture started
    pub started_at: DateTime<Utc>,

    /// When the stop was observed; None while recording
    pub ended_at: Option<DateTime<Utc>>,

    /// Snippets retained at finalize time
    pub accepted_count: usize,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            ended_at: None,
            accepted_count: 0,
        }
    }

    pub fn close(&mut self, ended_at: DateTime<Utc>, accepted_count: usize) {
        self.ended_at = Some(ended_at);
        self.accepted_count = accepted_count;
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Full chunks scored, written and offered
    pub chunks_processed: u64,

    /// Offers the selector accepted
    pub chunks_accepted: u64,

    /// Offers the selector rejected
    pub chunks_rejected: u64,

    /// Full chunks dropped because they could not be encoded or written
    pub chunks_skipped: u64,

    /// Empty or mismatched frames from the source
    pub read_errors: u64,

    /// Files that could not be deleted and remain on disk
    pub deletion_failures: u64,
}

/// Capture state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing,
    Draining,
}

/// Live view of the capture loop, published last-value-wins
#[derive(Debug, Clone, Default, Serialize)]
pub struct Telemetry {
    pub phase: CapturePhase,
    pub session_id: Option<String>,

    /// RMS of the most recent frame (sub-chunk preview, not used for ranking)
    pub live_score: f64,

    /// `live_score` in dBFS; serialized as null for silence
    pub live_db: f64,

    pub accepted_count: usize,
    pub capacity: usize,

    /// Samples in the chunk currently being assembled
    pub pending_samples: usize,

    pub stats: CaptureStats,

    /// Retained snippets, loudest first
    pub snippets: Vec<Candidate>,
}

impl Telemetry {
    /// Fresh state for a session that is about to capture
    pub fn capturing(session_id: &str, capacity: usize) -> Self {
        Self {
            phase: CapturePhase::Capturing,
            session_id: Some(session_id.to_string()),
            live_db: f64::NEG_INFINITY,
            capacity,
            ..Self::default()
        }
    }
}

/// Everything handed to the persistence sink when a session closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session: Session,

    /// Surviving snippets, loudest first
    pub snippets: Vec<Candidate>,

    pub stats: CaptureStats,
}

//! Recording session management
//!
//! This module provides the `RecordingController` that manages:
//! - Session configuration and validation
//! - The capture task lifecycle (start, stop, drain)
//! - Live telemetry for observers
//! - Hand-off of the finished session to persistence

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::RecordingController;
pub use stats::{CapturePhase, CaptureStats, Session, SessionReport, Telemetry};

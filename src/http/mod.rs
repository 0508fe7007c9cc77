//! HTTP API server for external control
//!
//! This module provides a REST API for controlling recording sessions:
//! - POST /recording/start - Start a new recording
//! - POST /recording/stop - Stop and drain the active recording
//! - GET /recording/status - Live telemetry
//! - GET /sessions - Stored session manifests
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

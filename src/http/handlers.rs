use super::state::AppState;
use crate::audio::{AudioBackendFactory, AudioSource};
use crate::error::CaptureError;
use crate::session::{SessionReport, Telemetry};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartRecordingRequest {
    /// Optional WAV file to replay instead of the configured input
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/start
/// Start a new recording session
pub async fn start_recording(
    State(state): State<AppState>,
    Json(req): Json<StartRecordingRequest>,
) -> impl IntoResponse {
    let input = req.input.or_else(|| state.default_input.clone());
    let source = AudioSource::from_input(input.as_deref());

    info!("Starting recording from {:?}", source);

    let backend = match AudioBackendFactory::create(source, state.backend_config.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to open audio source: {:#}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to open audio source: {:#}", e),
            );
        }
    };

    match state.controller.start(backend).await {
        Ok(session) => (
            StatusCode::OK,
            Json(StartRecordingResponse {
                session_id: session.id,
                started_at: session.started_at,
                status: "recording".to_string(),
            }),
        )
            .into_response(),
        Err(e @ CaptureError::AlreadyCapturing) => error_response(StatusCode::CONFLICT, e.to_string()),
        Err(e @ CaptureError::InvalidConfiguration(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!("Failed to start recording: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start recording: {}", e),
            )
        }
    }
}

/// POST /recording/stop
/// Stop the active session and return its snippets
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.stop().await {
        Some(report) => {
            info!("Recording stopped: {}", report.session.id);
            (StatusCode::OK, Json::<SessionReport>(report)).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "No active recording".to_string()),
    }
}

/// GET /recording/status
/// Live telemetry of the capture loop
pub async fn get_status(State(state): State<AppState>) -> Json<Telemetry> {
    Json(state.controller.status())
}

/// GET /sessions
/// Stored session manifests, newest first
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    match state.manifests.list().await {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(e) => {
            error!("Failed to list sessions: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list sessions: {:#}", e),
            )
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

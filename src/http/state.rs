use crate::audio::AudioBackendConfig;
use crate::persistence::JsonManifestSink;
use crate::session::RecordingController;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The process-wide recording controller
    pub controller: Arc<RecordingController>,

    /// How to open audio sources for new sessions
    pub backend_config: AudioBackendConfig,

    /// Input used when a start request names none (None = tone generator)
    pub default_input: Option<String>,

    /// Stored session manifests
    pub manifests: Arc<JsonManifestSink>,
}

impl AppState {
    pub fn new(
        controller: Arc<RecordingController>,
        backend_config: AudioBackendConfig,
        default_input: Option<String>,
        manifests: Arc<JsonManifestSink>,
    ) -> Self {
        Self {
            controller,
            backend_config,
            default_input,
            manifests,
        }
    }
}

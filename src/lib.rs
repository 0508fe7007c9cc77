pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod persistence;
pub mod recording;
pub mod session;
pub mod snippets;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame, AudioSource,
    ChannelBackend, ChunkAssembler, PcmFormat,
};
pub use config::Config;
pub use error::CaptureError;
pub use http::{create_router, AppState};
pub use persistence::{JsonManifestSink, SessionSink};
pub use recording::{CaptureEnd, ChunkedRecorder};
pub use session::{
    CapturePhase, CaptureStats, RecordingController, Session, SessionConfig, SessionReport,
    Telemetry,
};
pub use snippets::{Candidate, SnippetStore, TopSnippets};

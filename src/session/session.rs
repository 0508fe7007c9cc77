use super::config::SessionConfig;
use super::stats::{CapturePhase, Session, SessionReport, Telemetry};
use crate::audio::{AudioBackend, AudioFrame};
use crate::error::{CaptureError, Result};
use crate::persistence::SessionSink;
use crate::recording::ChunkedRecorder;
use anyhow::Context;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A session whose capture task is running or has not been reaped yet
struct ActiveRecording {
    session_id: String,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<SessionReport>,
}

/// Drives `Idle → Capturing → Draining → Idle` for one process
///
/// At most one session captures at a time. The capture task exclusively owns
/// the backend, the recorder and its selector; the outside world only sees
/// the telemetry channel and the report handed back on stop.
pub struct RecordingController {
    /// Session configuration
    config: SessionConfig,

    /// Receives closed sessions
    sink: Arc<dyn SessionSink>,

    /// Last-value-wins state for observers
    telemetry: Arc<watch::Sender<Telemetry>>,

    /// The running (or finished, unreaped) capture task
    active: Mutex<Option<ActiveRecording>>,
}

impl RecordingController {
    pub fn new(config: SessionConfig, sink: Arc<dyn SessionSink>) -> Self {
        let idle = Telemetry {
            capacity: config.snippet_count,
            live_db: f64::NEG_INFINITY,
            ..Telemetry::default()
        };
        let (telemetry, _) = watch::channel(idle);

        Self {
            config,
            sink,
            telemetry: Arc::new(telemetry),
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Subscribe to live telemetry
    pub fn telemetry(&self) -> watch::Receiver<Telemetry> {
        self.telemetry.subscribe()
    }

    /// Copy of the latest telemetry
    pub fn status(&self) -> Telemetry {
        self.telemetry.borrow().clone()
    }

    pub fn phase(&self) -> CapturePhase {
        self.telemetry.borrow().phase
    }

    /// Start a session capturing from `backend`.
    ///
    /// Fails with `InvalidConfiguration` before touching the backend if the
    /// configuration is unusable, and with `AlreadyCapturing` unless idle.
    pub async fn start(&self, mut backend: Box<dyn AudioBackend>) -> Result<Session> {
        self.config.validate()?;

        let mut active = self.active.lock().await;

        if self.phase() != CapturePhase::Idle {
            warn!("Recording already started");
            return Err(CaptureError::AlreadyCapturing);
        }

        // A previous session that ended on its own
        if let Some(previous) = active.take() {
            if let Err(e) = previous.handle.await {
                error!("Capture task for {} panicked: {}", previous.session_id, e);
            }
        }

        let session = Session::new(format!("session-{}", uuid::Uuid::new_v4()));
        info!("Starting recording session: {}", session.id);

        let recorder = ChunkedRecorder::new(&session.id, &self.config, Arc::clone(&self.telemetry))?;

        let audio_rx = backend
            .start()
            .await
            .with_context(|| format!("Failed to start {} audio capture", backend.name()))?;

        let (stop_tx, stop_rx) = watch::channel(false);
        self.telemetry
            .send_replace(Telemetry::capturing(&session.id, self.config.snippet_count));

        let handle = tokio::spawn(run_session(
            session.clone(),
            recorder,
            backend,
            audio_rx,
            stop_rx,
            Arc::clone(&self.telemetry),
            Arc::clone(&self.sink),
        ));

        *active = Some(ActiveRecording {
            session_id: session.id.clone(),
            stop_tx,
            handle,
        });

        info!("Recording session started successfully");
        Ok(session)
    }

    /// Stop the active session and return its report once drained.
    ///
    /// Returns None when there is nothing to stop, including when another
    /// stop is already draining. A session that ended on its own is reaped
    /// and its report returned.
    pub async fn stop(&self) -> Option<SessionReport> {
        let mut active = self.active.lock().await;

        let Some(recording) = active.take() else {
            debug!("Stop requested while idle");
            return None;
        };

        info!("Stopping recording session: {}", recording.session_id);

        // Fails only if the task already finished
        let _ = recording.stop_tx.send(true);

        match recording.handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Capture task for {} panicked: {}", recording.session_id, e);
                None
            }
        }
    }

    /// Wait for the active session to end by itself (source exhausted)
    pub async fn wait(&self) -> Option<SessionReport> {
        self.wait_or_stop(std::future::pending()).await
    }

    /// Wait until the session ends by itself or `signal` resolves, then
    /// drain it and return its report.
    ///
    /// Only the idle wait races the signal; the drain itself always runs to
    /// completion, so the report is never lost to a late signal.
    pub async fn wait_or_stop(&self, signal: impl Future<Output = ()>) -> Option<SessionReport> {
        let mut rx = self.telemetry.subscribe();

        tokio::select! {
            _ = rx.wait_for(|t| t.phase == CapturePhase::Idle) => {}
            _ = signal => info!("Stop requested"),
        }

        self.stop().await
    }
}

/// The capture task: record, then drain and hand off
async fn run_session(
    mut session: Session,
    mut recorder: ChunkedRecorder,
    mut backend: Box<dyn AudioBackend>,
    mut audio_rx: mpsc::Receiver<AudioFrame>,
    mut stop_rx: watch::Receiver<bool>,
    telemetry: Arc<watch::Sender<Telemetry>>,
    sink: Arc<dyn SessionSink>,
) -> SessionReport {
    let end = recorder.record(&mut audio_rx, &mut stop_rx).await;
    let ended_at = Utc::now();

    telemetry.send_modify(|t| t.phase = CapturePhase::Draining);
    info!("Draining session {} ({:?})", session.id, end);

    if let Err(e) = backend.stop().await {
        error!("Failed to stop audio backend: {}", e);
    }
    drop(audio_rx);

    let (snippets, stats) = recorder.finish();
    session.close(ended_at, snippets.len());

    let report = SessionReport {
        session,
        snippets,
        stats,
    };

    if let Err(e) = sink.persist(&report).await {
        error!("Failed to persist session {}: {:#}", report.session.id, e);
    }

    telemetry.send_modify(|t| {
        t.phase = CapturePhase::Idle;
        t.accepted_count = report.snippets.len();
        t.pending_samples = 0;
        t.snippets = report.snippets.clone();
    });

    info!(
        "Recording session complete: {} ({} snippets kept of {} chunks)",
        report.session.id,
        report.session.accepted_count,
        report.stats.chunks_processed
    );

    report
}

use anyhow::Context;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::audio::{encode, rms, rms_to_decibels, AudioFrame, ChunkAssembler, PcmFormat};
use crate::error::{CaptureError, Result};
use crate::session::{CaptureStats, SessionConfig, Telemetry};
use crate::snippets::{Candidate, SnippetStore, TopSnippets};

/// Why the capture loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEnd {
    /// The stop signal was observed
    Stopped,
    /// The backend closed its frame channel
    SourceClosed,
}

/// Chunked capture loop
///
/// Receives frames from a backend, assembles fixed-length chunks, and for
/// each full chunk: scores it, writes it to disk as a WAV file and offers it
/// to the selector. Chunks are handled strictly one at a time in sample
/// order, so at most one candidate file beyond the retained set exists at
/// any moment.
pub struct ChunkedRecorder {
    session_id: String,
    format: PcmFormat,
    store: SnippetStore,
    selector: TopSnippets,
    assembler: ChunkAssembler,
    next_index: u64,
    live_score: f64,
    stats: CaptureStats,
    telemetry: Arc<watch::Sender<Telemetry>>,
}

impl ChunkedRecorder {
    pub fn new(
        session_id: &str,
        config: &SessionConfig,
        telemetry: Arc<watch::Sender<Telemetry>>,
    ) -> Result<Self> {
        config.validate()?;

        let store = SnippetStore::new(&config.output_dir).context("Failed to prepare snippet storage")?;

        info!(
            "Chunked recorder initialized: {} ({}s chunks, keeping top {})",
            session_id, config.chunk_duration_secs, config.snippet_count
        );

        Ok(Self {
            session_id: session_id.to_string(),
            format: config.pcm_format(),
            store,
            selector: TopSnippets::new(config.snippet_count),
            assembler: ChunkAssembler::new(config.samples_per_chunk()),
            next_index: 0,
            live_score: 0.0,
            stats: CaptureStats::default(),
            telemetry,
        })
    }

    /// Process frames until the stop signal is raised or the source closes.
    ///
    /// A chunk completed by a frame is always offered before the stop signal
    /// is checked again. Whatever partial chunk remains when the loop exits is
    /// discarded without being scored.
    pub async fn record(
        &mut self,
        audio_rx: &mut mpsc::Receiver<AudioFrame>,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> CaptureEnd {
        info!("Starting chunked capture for {}", self.session_id);

        let end = loop {
            let frame = tokio::select! {
                biased;
                _ = stop_requested(stop_rx) => break CaptureEnd::Stopped,
                frame = audio_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break CaptureEnd::SourceClosed,
                },
            };

            self.handle_frame(frame).await;
        };

        let dropped = self.assembler.discard_pending();
        if dropped > 0 {
            info!(
                "Discarding partial chunk of {} samples ({:.1}s)",
                dropped,
                dropped as f64 / (self.format.sample_rate as f64 * self.format.channels as f64)
            );
        }
        self.publish(false);

        info!(
            "Chunked capture ended ({:?}): {} chunks processed, {} skipped, {} retained",
            end,
            self.stats.chunks_processed,
            self.stats.chunks_skipped,
            self.selector.count()
        );

        end
    }

    /// Finalize the selector, handing over the retained snippets loudest first
    pub fn finish(mut self) -> (Vec<Candidate>, CaptureStats) {
        let snippets = self.selector.finalize();
        (snippets, self.stats)
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Current retained snippets without closing the ranking
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.selector.snapshot()
    }

    async fn handle_frame(&mut self, frame: AudioFrame) {
        if let Err(e) = self.check_frame(&frame) {
            self.stats.read_errors += 1;
            warn!("Dropping frame at {}ms: {}", frame.timestamp_ms, e);
            self.publish(false);
            return;
        }

        self.live_score = rms(&frame.samples);

        let completed = self.assembler.push(&frame.samples);
        let any_completed = !completed.is_empty();
        for chunk in completed {
            self.process_chunk(chunk).await;
        }

        self.publish(any_completed);
    }

    fn check_frame(&self, frame: &AudioFrame) -> Result<()> {
        if frame.samples.is_empty() {
            return Err(CaptureError::SourceRead("empty frame".to_string()));
        }

        if frame.sample_rate != self.format.sample_rate || frame.channels != self.format.channels {
            return Err(CaptureError::SourceRead(format!(
                "expected {}Hz/{}ch, got {}Hz/{}ch",
                self.format.sample_rate, self.format.channels, frame.sample_rate, frame.channels
            )));
        }

        Ok(())
    }

    async fn process_chunk(&mut self, samples: Vec<i16>) {
        let index = self.next_index;
        self.next_index += 1;

        let score = rms(&samples);
        let captured_at = Utc::now();
        let name = SnippetStore::file_name(&self.session_id, index, captured_at);

        match self.materialize(&name, &samples).await {
            Ok(path) => {
                let accepted = self
                    .selector
                    .offer(Candidate::new(path, score, captured_at, index));

                self.stats.chunks_processed += 1;
                if accepted {
                    self.stats.chunks_accepted += 1;
                } else {
                    self.stats.chunks_rejected += 1;
                }
                self.stats.deletion_failures = self.selector.deletion_failures() as u64;

                debug!("Chunk {}: RMS={:.5}, accepted={}", index, score, accepted);
            }
            Err(e) => {
                self.stats.chunks_skipped += 1;
                warn!("Skipping chunk {}: {}", index, e);
            }
        }
    }

    async fn materialize(&self, name: &str, samples: &[i16]) -> Result<PathBuf> {
        let bytes = encode(samples, self.format).map_err(|e| CaptureError::EncodeOrStorage {
            name: name.to_string(),
            source: Box::new(e),
        })?;

        self.store
            .write(name, &bytes)
            .await
            .map_err(|e| CaptureError::EncodeOrStorage {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    fn publish(&self, ranking_changed: bool) {
        let snippets = ranking_changed.then(|| self.selector.snapshot());

        self.telemetry.send_modify(|t| {
            t.live_score = self.live_score;
            t.live_db = rms_to_decibels(self.live_score);
            t.accepted_count = self.selector.count();
            t.capacity = self.selector.capacity();
            t.pending_samples = self.assembler.pending().len();
            t.stats = self.stats;
            if let Some(snippets) = snippets {
                t.snippets = snippets;
            }
        });
    }
}

/// Resolves once the stop flag is set; a dropped sender also counts as stop
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    while !*stop_rx.borrow_and_update() {
        if stop_rx.changed().await.is_err() {
            return;
        }
    }
}

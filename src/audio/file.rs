use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// A 16-bit PCM WAV file loaded into memory
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            bail!(
                "Unsupported WAV format in {}: {:?} {}-bit (expected 16-bit integer PCM)",
                path.display(),
                spec.sample_format,
                spec.bits_per_sample
            );
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }
}

/// Replays a WAV file as a live frame stream
pub struct FileBackend {
    path: PathBuf,
    config: AudioBackendConfig,
    samples: Arc<Vec<i16>>,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn open(path: impl Into<PathBuf>, config: AudioBackendConfig) -> Result<Self> {
        let path = path.into();
        let audio = AudioFile::open(&path)?;

        if audio.sample_rate != config.sample_rate || audio.channels != config.channels {
            bail!(
                "{} is {}Hz/{}ch but the session records {}Hz/{}ch",
                path.display(),
                audio.sample_rate,
                audio.channels,
                config.sample_rate,
                config.channels
            );
        }

        Ok(Self {
            path,
            config,
            samples: Arc::new(audio.samples),
            task: None,
        })
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.task.is_some() {
            bail!("Already capturing");
        }

        let (tx, rx) = mpsc::channel(100);
        let samples = Arc::clone(&self.samples);
        let config = self.config.clone();
        let frame_len = config.samples_per_frame();
        let interleave = config.channels.max(1) as u64;

        info!(
            "Replaying {} ({} samples, {} per frame, realtime={})",
            self.path.display(),
            samples.len(),
            frame_len,
            config.realtime
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(config.buffer_duration_ms.max(1)));

            for (i, block) in samples.chunks(frame_len).enumerate() {
                if config.realtime {
                    ticker.tick().await;
                }

                let offset_frames = (i * frame_len) as u64 / interleave;
                let timestamp_ms = offset_frames * 1000 / config.sample_rate.max(1) as u64;
                let frame = AudioFrame::new(block.to_vec(), config.sample_rate, config.channels, timestamp_ms);

                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver dropped, ending file replay");
                    return;
                }
            }

            info!("File replay complete");
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("File replay stopped");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        "file"
    }
}

use anyhow::{bail, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

use super::file::FileBackend;
use super::generator::GeneratorBackend;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16, timestamp_ms: u64) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            timestamp_ms,
        }
    }

    /// Duration covered by this frame in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// Configuration for audio backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Sample rate the session records at
    pub sample_rate: u32,
    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Frame size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
    /// Pace frames in real time (file sources replay as fast as possible otherwise)
    pub realtime: bool,
}

impl AudioBackendConfig {
    /// Number of interleaved samples in one frame
    pub fn samples_per_frame(&self) -> usize {
        let frames = (self.sample_rate as u64 * self.buffer_duration_ms / 1000).max(1);
        frames as usize * self.channels.max(1) as usize
    }
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
            realtime: true,
        }
    }
}

/// Audio capture backend trait
///
/// The capture loop owns the backend for the lifetime of a session. Frames
/// are delivered in production order; an empty frame is a failed read, and a
/// closed channel means the source is exhausted.
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Backend fed by an external producer
///
/// Hosts that own a platform capture callback push frames into the sender
/// half; the receiver is handed to the capture loop on `start`.
pub struct ChannelBackend {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    capturing: bool,
}

impl ChannelBackend {
    pub fn new(rx: mpsc::Receiver<AudioFrame>) -> Self {
        Self {
            rx: Some(rx),
            capturing: false,
        }
    }

    /// Create a backend together with the sender that feeds it
    pub fn channel(capacity: usize) -> (mpsc::Sender<AudioFrame>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait::async_trait]
impl AudioBackend for ChannelBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        match self.rx.take() {
            Some(rx) => {
                self.capturing = true;
                Ok(rx)
            }
            None => bail!("Channel backend can only be started once"),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Audio source type
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Replay a 16-bit PCM WAV file
    File(PathBuf),
    /// Synthetic tone with a varying loudness envelope
    Generator,
}

impl AudioSource {
    /// Map an optional configured input path to a source
    pub fn from_input(input: Option<&str>) -> Self {
        match input {
            Some(path) if !path.is_empty() => {
                AudioSource::File(PathBuf::from(shellexpand::tilde(path).as_ref()))
            }
            _ => AudioSource::Generator,
        }
    }
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create audio backend for the given source
    pub fn create(source: AudioSource, config: AudioBackendConfig) -> Result<Box<dyn AudioBackend>> {
        info!("Creating audio backend for {:?}", source);

        match source {
            AudioSource::File(path) => Ok(Box::new(FileBackend::open(path, config)?)),
            AudioSource::Generator => Ok(Box::new(GeneratorBackend::new(config))),
        }
    }
}

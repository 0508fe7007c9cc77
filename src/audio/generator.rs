// Synthetic audio source
//
// Emits a 440 Hz tone whose amplitude follows a slow envelope, paced in real
// time. The output is deterministic, so consecutive chunks have distinct but
// reproducible loudness.

use anyhow::{bail, Result};
use std::f64::consts::TAU;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

const TONE_HZ: f64 = 440.0;
const ENVELOPE_PERIOD_SECS: f64 = 37.0;

pub struct GeneratorBackend {
    config: AudioBackendConfig,
    task: Option<JoinHandle<()>>,
}

impl GeneratorBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self { config, task: None }
    }
}

/// Render `frames` sample frames starting at absolute frame `start`
pub(crate) fn render(start: u64, frames: usize, sample_rate: u32, channels: u16) -> Vec<i16> {
    let rate = sample_rate.max(1) as f64;
    let mut out = Vec::with_capacity(frames * channels as usize);

    for n in 0..frames as u64 {
        let t = (start + n) as f64 / rate;
        let envelope = 0.5 * (1.0 + (TAU * t / ENVELOPE_PERIOD_SECS).sin());
        let value = (envelope * (TAU * TONE_HZ * t).sin() * i16::MAX as f64) as i16;
        for _ in 0..channels {
            out.push(value);
        }
    }

    out
}

#[async_trait::async_trait]
impl AudioBackend for GeneratorBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.task.is_some() {
            bail!("Already capturing");
        }

        let (tx, rx) = mpsc::channel(100);
        let config = self.config.clone();
        let channels = config.channels.max(1);
        let frames_per_block = config.samples_per_frame() / channels as usize;

        info!(
            "Starting tone generator ({}Hz, {} channels, {}ms frames)",
            config.sample_rate, channels, config.buffer_duration_ms
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(config.buffer_duration_ms.max(1)));
            let mut position: u64 = 0;

            loop {
                ticker.tick().await;

                let samples = render(position, frames_per_block, config.sample_rate, channels);
                let timestamp_ms = position * 1000 / config.sample_rate.max(1) as u64;
                position += frames_per_block as u64;

                if tx
                    .send(AudioFrame::new(samples, config.sample_rate, channels, timestamp_ms))
                    .await
                    .is_err()
                {
                    debug!("Frame receiver dropped, stopping generator");
                    return;
                }
            }
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Tone generator stopped");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        "generator"
    }
}

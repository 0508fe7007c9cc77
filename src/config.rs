use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::audio::AudioBackendConfig;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub snippets: SnippetsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub buffer_duration_ms: u64,
    /// WAV file to replay; the tone generator is used when unset
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnippetsConfig {
    pub count: usize,
    pub chunk_duration_secs: u32,
}

impl Config {
    /// Load `path` (any format the `config` crate understands, extension
    /// optional) over built-in defaults, then apply `SNIPPET_KEEPER_*`
    /// environment overrides (e.g. `SNIPPET_KEEPER_SNIPPETS__COUNT=5`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "snippet-keeper")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8420_i64)?
            .set_default("audio.recordings_path", "~/.snippet-keeper/recordings")?
            .set_default("audio.sample_rate", 16000_i64)?
            .set_default("audio.channels", 1_i64)?
            .set_default("audio.bits_per_sample", 16_i64)?
            .set_default("audio.buffer_duration_ms", 100_i64)?
            .set_default("snippets.count", 3_i64)?
            .set_default("snippets.chunk_duration_secs", 10_i64)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SNIPPET_KEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Recordings directory with `~` expanded
    pub fn recordings_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.audio.recordings_path).as_ref())
    }

    /// Directory holding session manifests
    pub fn manifests_dir(&self) -> PathBuf {
        self.recordings_dir().join("sessions")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
            bits_per_sample: self.audio.bits_per_sample,
            chunk_duration_secs: self.snippets.chunk_duration_secs,
            snippet_count: self.snippets.count,
            output_dir: self.recordings_dir(),
        }
    }

    pub fn backend_config(&self) -> AudioBackendConfig {
        AudioBackendConfig {
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
            buffer_duration_ms: self.audio.buffer_duration_ms,
            realtime: true,
        }
    }
}

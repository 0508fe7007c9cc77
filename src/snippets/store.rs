use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory that snippet files are materialized into
#[derive(Debug, Clone)]
pub struct SnippetStore {
    dir: PathBuf,
}

impl SnippetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snippet directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a chunk: `<session>-chunk-<index>-<unix ms>.wav`
    pub fn file_name(session_id: &str, chunk_index: u64, captured_at: DateTime<Utc>) -> String {
        format!(
            "{}-chunk-{:05}-{}.wav",
            session_id,
            chunk_index,
            captured_at.timestamp_millis()
        )
    }

    /// Write `bytes` under `name`, all or nothing.
    ///
    /// The data goes to `<name>.part` first and is renamed into place once
    /// fully written, so a visible `.wav` is always complete.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(name);
        let partial = self.dir.join(format!("{name}.part"));

        let result = async {
            tokio::fs::write(&partial, bytes).await?;
            tokio::fs::rename(&partial, &path).await
        }
        .await;

        match result {
            Ok(()) => {
                debug!("Wrote WAV file: {}, size: {} bytes", name, bytes.len());
                Ok(path)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        warn!("Failed to remove partial file {}: {}", partial.display(), cleanup);
                    }
                }
                Err(e)
            }
        }
    }
}

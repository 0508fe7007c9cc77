use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::SessionSink;
use crate::session::SessionReport;

/// Stores each closed session as `<dir>/<session id>.json`
#[derive(Debug, Clone)]
pub struct JsonManifestSink {
    dir: PathBuf,
}

impl JsonManifestSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// All stored sessions, newest first. Unreadable manifests are skipped.
    pub async fn list(&self) -> Result<Vec<SessionReport>> {
        let mut reports = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(reports),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", self.dir.display()))
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let parsed = tokio::fs::read(&path)
                .await
                .map_err(anyhow::Error::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<SessionReport>(&bytes)?));

            match parsed {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping unreadable manifest {}: {}", path.display(), e),
            }
        }

        reports.sort_by(|a, b| b.session.started_at.cmp(&a.session.started_at));
        Ok(reports)
    }
}

#[async_trait::async_trait]
impl SessionSink for JsonManifestSink {
    async fn persist(&self, report: &SessionReport) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create manifest directory {}", self.dir.display()))?;

        let path = self.manifest_path(&report.session.id);
        let json = serde_json::to_vec_pretty(report).context("Failed to serialize session")?;

        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;

        info!(
            "Saved session {} with {} snippets to {}",
            report.session.id,
            report.snippets.len(),
            path.display()
        );

        Ok(())
    }
}

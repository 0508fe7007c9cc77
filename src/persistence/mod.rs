//! Hand-off of finished sessions
//!
//! When a session drains, the ordered snippets and the closed session record
//! are passed to a `SessionSink`. From that point the sink owns the snippet
//! files.

mod manifest;

use anyhow::Result;

use crate::session::SessionReport;

pub use manifest::JsonManifestSink;

/// Receives closed sessions
#[async_trait::async_trait]
pub trait SessionSink: Send + Sync {
    async fn persist(&self, report: &SessionReport) -> Result<()>;
}

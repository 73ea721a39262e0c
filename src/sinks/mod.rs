//! Delivery sinks for finished assets.
//!
//! The primary sink receives the file with per-chunk progress through a
//! [`TransferObserver`]. The optional [`RcloneMirror`] copies it to a remote
//! afterwards on a best-effort basis.

pub mod directory;
pub mod mirror;

pub use directory::DirectorySink;
pub use mirror::{MirrorOutcome, RcloneMirror};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::progress::TransferObserver;

/// Errors reported by a delivery sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("transport error: {0}")]
    Transport(String),

    /// The receiving side refused the file.
    #[error("rejected ({code}): {description}")]
    Rejected { code: u16, description: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to deliver.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub path: &'a Path,
    pub thumbnail: Option<&'a Path>,
    pub caption: &'a str,
}

/// Where a delivered file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sink: String,
    pub location: Option<String>,
}

/// Primary destination for a finished asset.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Human-readable destination name, e.g. `"Telegram"`.
    fn name(&self) -> &str;

    /// Transfer the file, reporting progress to `observer` as chunks go out.
    async fn deliver(
        &self,
        upload: &Upload<'_>,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Delivery, SinkError>;
}

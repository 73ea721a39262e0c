//! The acquisition pipeline: download, enrich, mux, upload, cleanup.

pub mod download;
pub mod executor;
pub mod mux;
pub mod request;
pub mod scan;
pub mod upload;

use std::path::PathBuf;

pub use download::Downloader;
pub use executor::{Pipeline, PipelineReport};
pub use mux::{MuxReport, MuxStage};
pub use request::{AcquisitionRequest, Service};
pub use upload::{check_size, UploadReport, UploadStage};

use crate::metadata::{EpisodeInfo, Enrichment};

/// Outcome of a best-effort stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Applied,
    /// Disabled, or nothing to do.
    Skipped,
    /// Failed with this diagnostic; the asset is unchanged.
    Failed(String),
}

impl StageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StageOutcome::Applied)
    }
}

/// The file a task is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub service: Service,
    pub info: Option<EpisodeInfo>,
    pub thumbnail: Option<PathBuf>,
    /// Canonical name without extension, once enriched.
    pub display_title: Option<String>,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>, service: Service) -> Self {
        Self {
            path: path.into(),
            service,
            info: None,
            thumbnail: None,
            display_title: None,
        }
    }

    /// Current file name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Take over whatever enrichment produced.
    pub fn apply(&mut self, enrichment: Enrichment) {
        self.path = enrichment.path;
        if enrichment.info.is_some() {
            self.info = enrichment.info;
        }
        if enrichment.thumbnail.is_some() {
            self.thumbnail = enrichment.thumbnail;
        }
        if enrichment.display_title.is_some() {
            self.display_title = enrichment.display_title;
        }
    }
}

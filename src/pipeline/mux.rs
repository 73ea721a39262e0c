//! Mux stage: sign subtitle track and chapters.
//!
//! Both operations are best effort. A failure is logged (and, for chapters,
//! shown to the operator) and the asset continues in its previous state.

use std::path::{Path, PathBuf};

use anidrop_av::actions::{merge_chapters, mux_sign_track};
use anidrop_av::{ChapterMerge, SignFilter, SignMux};
use tracing::{debug, info, warn};

use super::StageOutcome;
use crate::notifications::StatusMessage;

/// Result of the mux stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxReport {
    /// Where the asset lives now.
    pub path: PathBuf,
    pub signs: StageOutcome,
    pub chapters: StageOutcome,
}

/// Configured mux operations.
#[derive(Debug, Clone)]
pub struct MuxStage {
    ffmpeg: PathBuf,
    mkvmerge: PathBuf,
    sign_filter: Option<SignFilter>,
    chapters_file: Option<PathBuf>,
}

impl MuxStage {
    pub fn new(ffmpeg: impl Into<PathBuf>, mkvmerge: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            mkvmerge: mkvmerge.into(),
            sign_filter: None,
            chapters_file: None,
        }
    }

    /// Extract sign cues into their own track using `filter`.
    pub fn with_signs(mut self, filter: Option<SignFilter>) -> Self {
        self.sign_filter = filter;
        self
    }

    /// Merge this chapter file when it exists.
    pub fn with_chapters(mut self, chapters_file: Option<PathBuf>) -> Self {
        self.chapters_file = chapters_file;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.sign_filter.is_some() || self.chapters_file.is_some()
    }

    pub async fn run(&self, path: &Path, status: &mut StatusMessage) -> MuxReport {
        let signs = self.signs(path).await;
        let (path, chapters) = self.chapters(path, status).await;

        MuxReport {
            path,
            signs,
            chapters,
        }
    }

    async fn signs(&self, path: &Path) -> StageOutcome {
        let Some(filter) = &self.sign_filter else {
            return StageOutcome::Skipped;
        };

        match mux_sign_track(&self.ffmpeg, &self.mkvmerge, path, filter).await {
            Ok(SignMux::Merged { cues }) => {
                info!("Muxed {} sign cues into {:?}", cues, path);
                StageOutcome::Applied
            }
            Ok(SignMux::NoSigns) => StageOutcome::Skipped,
            Ok(SignMux::Failed { stage, diagnostic }) => {
                warn!("Sign track {:?} failed for {:?}: {}", stage, path, diagnostic);
                StageOutcome::Failed(diagnostic)
            }
            Err(e) => {
                warn!("Sign track processing failed for {:?}: {}", path, e);
                StageOutcome::Failed(e.to_string())
            }
        }
    }

    async fn chapters(&self, path: &Path, status: &mut StatusMessage) -> (PathBuf, StageOutcome) {
        let Some(chapters) = self.chapters_file.as_deref() else {
            return (path.to_path_buf(), StageOutcome::Skipped);
        };

        if !chapters.is_file() {
            debug!("No chapter file at {:?}", chapters);
            return (path.to_path_buf(), StageOutcome::Skipped);
        }

        let diagnostic = match merge_chapters(&self.mkvmerge, path, chapters).await {
            Ok(ChapterMerge::Merged(merged)) => {
                info!("Merged chapters into {:?}", merged);
                return (merged, StageOutcome::Applied);
            }
            Ok(ChapterMerge::Failed { diagnostic }) => diagnostic,
            Err(e) => e.to_string(),
        };

        warn!("Muxing failed: {}", diagnostic);
        status
            .report(&format!("⚠️ Error during muxing:\n{}", diagnostic))
            .await;

        (path.to_path_buf(), StageOutcome::Failed(diagnostic))
    }
}

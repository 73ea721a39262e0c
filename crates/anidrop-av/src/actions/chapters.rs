//! Chapter merging with mkvmerge.

use crate::{Error, Result, ToolCommand};
use std::path::{Path, PathBuf};

/// Outcome of a chapter merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterMerge {
    /// The merged file, which replaces the (now removed) input.
    Merged(PathBuf),
    /// mkvmerge rejected the input; the original file is untouched.
    Failed { diagnostic: String },
}

/// Where the chapter-merged copy of `input` is written: `<stem>_muxed.mkv`
/// in the same directory.
pub fn muxed_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}_muxed.mkv", stem))
}

/// Merge a chapter definition file into `input`.
///
/// Runs `mkvmerge -o <stem>_muxed.mkv <input> --chapters <chapters>`. On
/// success the input is deleted and the merged path returned. On failure any
/// partial output is removed and mkvmerge's diagnostic is returned instead.
pub async fn merge_chapters(
    mkvmerge: &Path,
    input: &Path,
    chapters: &Path,
) -> Result<ChapterMerge> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }
    if !chapters.exists() {
        return Err(Error::file_not_found(chapters));
    }

    let output = muxed_output_path(input);

    #[cfg(feature = "tracing")]
    tracing::info!("Merging chapters from {:?} into {:?}", chapters, input);

    let result = ToolCommand::new(mkvmerge)
        .arg("-o")
        .arg(&output)
        .arg(input)
        .arg("--chapters")
        .arg(chapters)
        .output()
        .await?;

    // Any non-zero exit, warnings included, keeps the original.
    if result.status.success() && output.exists() {
        if let Err(_e) = std::fs::remove_file(input) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Could not remove superseded file {:?}: {}", input, _e);
        }
        return Ok(ChapterMerge::Merged(output));
    }

    let _ = std::fs::remove_file(&output);

    // mkvmerge reports most errors on stdout
    let diagnostic = if result.stderr.trim().is_empty() {
        result.stdout.trim().to_string()
    } else {
        result.stderr.trim().to_string()
    };

    #[cfg(feature = "tracing")]
    tracing::warn!("Chapter merge failed for {:?}: {}", input, diagnostic);

    Ok(ChapterMerge::Failed { diagnostic })
}

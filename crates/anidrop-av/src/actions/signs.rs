//! Sign subtitle track extraction and muxing.

use crate::subtitle::SignFilter;
use crate::{Error, Result, ToolCommand, Workspace};
use std::path::Path;

/// Which step of the sign mux failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignStage {
    Extract,
    Mux,
}

/// Outcome of adding a sign track to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignMux {
    /// The container now carries the sign track as its first subtitle.
    Merged { cues: usize },
    /// The subtitle track had no sign cues; the container is untouched.
    NoSigns,
    /// A tool failed; the container is untouched.
    Failed { stage: SignStage, diagnostic: String },
}

/// Extract the first subtitle stream of `input` as ASS.
///
/// Runs `ffmpeg -y -i <input> -map 0:s:0 -c:s ass <output>`.
pub async fn extract_subtitle_track(ffmpeg: &Path, input: &Path, output: &Path) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::debug!("Extracting first subtitle track: {:?} -> {:?}", input, output);

    let result = ToolCommand::new(ffmpeg)
        .args(["-y", "-i"])
        .arg(input)
        .args(["-map", "0:s:0", "-c:s", "ass"])
        .arg(output)
        .output()
        .await?;

    if !result.status.success() {
        return Err(Error::tool_failed("ffmpeg", result.stderr.trim()));
    }

    Ok(())
}

/// Mux `subtitle` into `input` as a default English sign track, writing the
/// result to `output`.
pub async fn add_sign_track(
    mkvmerge: &Path,
    input: &Path,
    subtitle: &Path,
    output: &Path,
) -> Result<()> {
    if !subtitle.exists() {
        return Err(Error::file_not_found(subtitle));
    }

    let mut cmd = ToolCommand::new(mkvmerge);
    cmd.arg("-o")
        .arg(output)
        .arg(input)
        .args([
            "--language",
            "0:eng",
            "--track-name",
            "0:English Sign",
            "--default-track",
            "0:yes",
        ])
        .arg(subtitle);

    #[cfg(feature = "tracing")]
    tracing::info!("Running: {}", cmd.display());

    let result = cmd.output().await?;

    if !result.status.success() {
        let _ = std::fs::remove_file(output);
        let message = if result.stderr.trim().is_empty() {
            result.stdout.trim().to_string()
        } else {
            result.stderr.trim().to_string()
        };
        return Err(Error::tool_failed("mkvmerge", message));
    }

    Ok(())
}

/// Extract, filter and mux sign cues back into `input` in place.
///
/// The extracted subtitle and the mux output live in a scratch directory next
/// to `input`; the container is only replaced once mkvmerge has succeeded.
/// Tool failures are reported as [`SignMux::Failed`]; `Err` means a tool could
/// not be launched or the filesystem failed.
pub async fn mux_sign_track(
    ffmpeg: &Path,
    mkvmerge: &Path,
    input: &Path,
    filter: &SignFilter,
) -> Result<SignMux> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    let workspace = Workspace::beside(input)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let subtitle = workspace.temp_file(&format!("{}_sign.ass", stem));

    match extract_subtitle_track(ffmpeg, input, &subtitle).await {
        Ok(()) => {}
        Err(Error::ToolFailed { message, .. }) => {
            return Ok(SignMux::Failed {
                stage: SignStage::Extract,
                diagnostic: message,
            })
        }
        Err(e) => return Err(e),
    }

    let raw = tokio::fs::read(&subtitle).await?;
    let track = filter.filter(&String::from_utf8_lossy(&raw));

    if track.is_empty() {
        #[cfg(feature = "tracing")]
        tracing::info!("No sign cues found in {:?}", input);
        workspace.discard();
        return Ok(SignMux::NoSigns);
    }

    tokio::fs::write(&subtitle, track.content.as_bytes()).await?;

    match add_sign_track(mkvmerge, input, &subtitle, workspace.output()).await {
        Ok(()) => {}
        Err(Error::ToolFailed { message, .. }) => {
            workspace.discard();
            return Ok(SignMux::Failed {
                stage: SignStage::Mux,
                diagnostic: message,
            });
        }
        Err(e) => return Err(e),
    }

    workspace.finalize()?;

    #[cfg(feature = "tracing")]
    tracing::info!("Added {} sign cues to {:?}", track.cues, input);

    Ok(SignMux::Merged { cues: track.cues })
}

//! Audio stream probing via ffprobe.

use crate::{Error, Result, ToolCommand};
use std::fmt;
use std::path::Path;

/// Dub coverage of a release, derived from its audio stream count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioLabel {
    /// A single (original language) audio stream.
    Sub,
    /// Two audio streams.
    Dual,
    /// Three or more audio streams.
    Tri,
}

impl AudioLabel {
    /// Classify an audio stream count.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 | 1 => AudioLabel::Sub,
            2 => AudioLabel::Dual,
            _ => AudioLabel::Tri,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioLabel::Sub => "Sub",
            AudioLabel::Dual => "Dual",
            AudioLabel::Tri => "Tri",
        }
    }
}

impl fmt::Display for AudioLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count the audio streams of a media file.
///
/// Runs `ffprobe -v error -select_streams a -show_entries stream=codec_type
/// -of default=noprint_wrappers=1` and counts the `codec_type=audio` lines.
pub async fn audio_stream_count(ffprobe: &Path, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = ToolCommand::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "a",
            "-show_entries",
            "stream=codec_type",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::tool_failed("ffprobe", output.stderr.trim()));
    }

    Ok(count_audio_entries(&output.stdout))
}

fn count_audio_entries(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|line| line.trim() == "codec_type=audio")
        .count()
}

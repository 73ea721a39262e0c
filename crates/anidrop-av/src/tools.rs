//! Locating the external binaries the pipeline shells out to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The well-known tools the pipeline drives besides the acquisition tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTool {
    Ffmpeg,
    Ffprobe,
    Mkvmerge,
    Rclone,
}

impl ExternalTool {
    pub const ALL: [ExternalTool; 4] = [
        ExternalTool::Ffmpeg,
        ExternalTool::Ffprobe,
        ExternalTool::Mkvmerge,
        ExternalTool::Rclone,
    ];

    /// Executable name looked up on `PATH`.
    pub fn binary(self) -> &'static str {
        match self {
            ExternalTool::Ffmpeg => "ffmpeg",
            ExternalTool::Ffprobe => "ffprobe",
            ExternalTool::Mkvmerge => "mkvmerge",
            ExternalTool::Rclone => "rclone",
        }
    }

    /// Argument that makes the tool print its version and exit 0.
    pub fn version_arg(self) -> &'static str {
        match self {
            ExternalTool::Ffmpeg | ExternalTool::Ffprobe => "-version",
            ExternalTool::Mkvmerge => "--version",
            ExternalTool::Rclone => "version",
        }
    }

    /// The program to run, preferring a configured path.
    ///
    /// An unresolvable tool comes back as its bare name: the stage that
    /// needs it then fails with a launch error at spawn time.
    pub fn resolve(self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) => path.to_path_buf(),
            None => which::which(self.binary()).unwrap_or_else(|_| PathBuf::from(self.binary())),
        }
    }

    /// Resolve and run the version check in one go.
    pub fn check(self, configured: Option<&Path>) -> ToolInfo {
        check_tool(self.binary(), &self.resolve(configured), self.version_arg())
    }
}

impl fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Result of a version check.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line the tool printed for its version.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

impl fmt::Display for ToolInfo {
    /// `✓ mkvmerge (mkvmerge v80.0) - /usr/bin/mkvmerge`, or `✗ rclone`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.available { "✓" } else { "✗" };
        write!(f, "{} {}", mark, self.name)?;
        if let Some(version) = &self.version {
            write!(f, " ({})", version)?;
        }
        if let Some(path) = &self.path {
            write!(f, " - {}", path.display())?;
        }
        Ok(())
    }
}

/// Run `program version_arg` and report whether it answered successfully.
///
/// Used for arbitrary programs such as the acquisition tool; the well-known
/// tools go through [`ExternalTool::check`].
pub fn check_tool(name: &str, program: &Path, version_arg: &str) -> ToolInfo {
    let output = match Command::new(program).arg(version_arg).output() {
        Ok(output) if output.status.success() => output,
        _ => {
            return ToolInfo {
                name: name.to_string(),
                available: false,
                version: None,
                path: None,
            }
        }
    };

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);

    // Bare names were found via PATH; report where.
    let path = if program.components().count() > 1 {
        Some(program.to_path_buf())
    } else {
        which::which(program).ok()
    };

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path,
    }
}

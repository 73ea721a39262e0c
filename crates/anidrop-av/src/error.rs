//! Error types for anidrop-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while driving external tools.
///
/// A tool that runs and exits non-zero is usually *not* an error at this
/// layer: [`ToolExit`](crate::ToolExit) carries the status. `ToolFailed` is
/// reserved for helpers that need a successful run to produce their output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The executable does not exist.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The executable exists but the process could not be started.
    #[error("failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Temporary workspace could not be created or swapped into place.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn launch(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Launch {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Whether the process never started (missing or unstartable executable).
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. } | Self::Launch { .. })
    }

    /// The tool involved, for variants that name one.
    pub fn tool(&self) -> Option<&str> {
        match self {
            Self::ToolNotFound { tool }
            | Self::Launch { tool, .. }
            | Self::ToolFailed { tool, .. } => Some(tool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_classification() {
        assert!(Error::tool_not_found("./aniDL").is_launch());
        assert!(Error::launch("rclone", "permission denied").is_launch());
        assert!(!Error::tool_failed("mkvmerge", "exit 2").is_launch());
        assert!(!Error::file_not_found("/videos/a.mkv").is_launch());
    }

    #[test]
    fn test_tool_name() {
        assert_eq!(Error::launch("rclone", "x").tool(), Some("rclone"));
        assert_eq!(Error::InvalidInput("x".into()).tool(), None);
        assert_eq!(
            Error::tool_failed("ffprobe", "Invalid data").to_string(),
            "ffprobe failed: Invalid data"
        );
    }
}

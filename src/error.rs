//! Task-level error taxonomy.
//!
//! Every stage that can abort a task converts its failure into a
//! [`PipelineError`]. [`PipelineError::status_text`] renders the single line
//! the operator sees on the status message.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::notifications::ChannelError;
use crate::sinks::SinkError;

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Enrich,
    Mux,
    Upload,
    Mirror,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Download => "download",
            Stage::Enrich => "enrich",
            Stage::Mux => "mux",
            Stage::Upload => "upload",
            Stage::Mirror => "mirror",
        };
        f.write_str(name)
    }
}

/// Why a task was aborted.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The executable for a stage does not exist.
    #[error("{tool} tool not found")]
    ToolNotFound { tool: String },

    /// The executable exists but could not be started.
    #[error("failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    /// A tool ran and exited unsuccessfully.
    #[error("{tool} failed during {stage} (exit code {code:?})")]
    ToolFailure {
        stage: Stage,
        tool: String,
        code: Option<i32>,
        diagnostic: String,
    },

    #[error("network error: {0}")]
    TransientNetwork(String),

    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// A hard limit was exceeded; the message is shown to the operator as is.
    #[error("{0}")]
    ConstraintViolation(String),

    /// The acquisition produced nothing to work on.
    #[error("no .{extension} files found in {}", dir.display())]
    NoAsset { dir: PathBuf, extension: String },

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Map a tool layer error raised by `stage`.
    pub fn tool(stage: Stage, err: anidrop_av::Error) -> Self {
        match err {
            anidrop_av::Error::ToolNotFound { tool } => Self::ToolNotFound { tool },
            anidrop_av::Error::Launch { tool, message } => Self::Launch { tool, message },
            anidrop_av::Error::ToolFailed { tool, message } => Self::ToolFailure {
                stage,
                tool,
                code: None,
                diagnostic: message,
            },
            anidrop_av::Error::Io(e) => Self::Io(e),
            other => Self::ToolFailure {
                stage,
                tool: other.tool().map_or_else(|| stage.to_string(), str::to_string),
                code: None,
                diagnostic: other.to_string(),
            },
        }
    }

    /// Whether the failing process never started.
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. } | Self::Launch { .. })
    }

    /// The abort message shown on the status message.
    pub fn status_text(&self) -> String {
        match self {
            Self::ToolNotFound { tool } => format!("❌ Error: {} tool not found.", tool),
            Self::Launch { tool, message } => {
                format!("❌ Error: failed to start {}: {}", tool, message)
            }
            Self::ToolFailure {
                stage: Stage::Download,
                diagnostic,
                ..
            } => format!("❌ Error occurred during download:\n{}", diagnostic),
            Self::ToolFailure {
                stage,
                tool,
                diagnostic,
                ..
            } => format!("❌ {} failed during {}:\n{}", tool, stage, diagnostic),
            Self::TransientNetwork(message) => format!("❌ Network error: {}", message),
            Self::RateLimited { retry_after } => format!(
                "❌ Rate limited by the delivery channel (retry after {}s).",
                retry_after.as_secs()
            ),
            Self::ConstraintViolation(message) => format!("❌ {}", message),
            Self::NoAsset { extension, .. } => {
                format!("❌ No .{} files found in the videos directory.", extension)
            }
            Self::Delivery(message) => format!("❌ Error during upload: {}", message),
            Self::Io(e) => format!("❌ An unexpected error occurred: {}", e),
        }
    }
}

impl From<SinkError> for PipelineError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::RateLimited { retry_after } => Self::RateLimited { retry_after },
            SinkError::Transport(message) => Self::TransientNetwork(message),
            other => Self::Delivery(other.to_string()),
        }
    }
}

impl From<ChannelError> for PipelineError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::RateLimited { retry_after } => Self::RateLimited { retry_after },
            ChannelError::Transport(message) => Self::TransientNetwork(message),
            other => Self::Delivery(other.to_string()),
        }
    }
}

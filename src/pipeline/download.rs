//! Acquisition stage: run the download tool and forward its progress.

use std::path::PathBuf;
use std::time::Duration;

use anidrop_av::ToolCommand;
use tokio::time::Instant;
use tracing::{error, info};

use super::AcquisitionRequest;
use crate::error::{PipelineError, Stage};
use crate::notifications::StatusMessage;
use crate::progress::ProgressGate;

/// Runs the acquisition tool for a request.
#[derive(Debug, Clone)]
pub struct Downloader {
    tool: PathBuf,
    marker: String,
    min_interval: Duration,
}

impl Downloader {
    pub fn new(tool: impl Into<PathBuf>, marker: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            tool: tool.into(),
            marker: marker.into(),
            min_interval,
        }
    }

    /// Download one series, relaying progress lines to `status`.
    ///
    /// Lines containing the progress marker are forwarded as `⚙️ <line>`
    /// through a [`ProgressGate`]; the last line it held back is shown when
    /// the tool's output ends. A non-zero exit aborts with the tool's
    /// standard error as the diagnostic.
    pub async fn run(
        &self,
        request: &AcquisitionRequest,
        status: &mut StatusMessage,
    ) -> Result<(), PipelineError> {
        let mut command = ToolCommand::new(&self.tool);
        command.args(request.tool_args());

        info!(series = %request.series_id, service = %request.service, "Starting download: {}", command.display());

        let mut running = command
            .spawn()
            .map_err(|e| PipelineError::tool(Stage::Download, e))?;

        let mut gate = ProgressGate::new(self.min_interval);
        // Latest line the gate held back; shown once output ends.
        let mut held: Option<String> = None;

        while let Some(line) = running
            .next_line()
            .await
            .map_err(|e| PipelineError::tool(Stage::Download, e))?
        {
            let line = line.trim();
            if !line.contains(self.marker.as_str()) {
                continue;
            }

            let text = format!("⚙️ {}", line);
            if gate.admit(Instant::now(), &text) {
                held = None;
                status.report(&text).await;
            } else {
                held = Some(text);
            }
        }

        if let Some(text) = held {
            status.report(&text).await;
        }

        let exit = running
            .wait()
            .await
            .map_err(|e| PipelineError::tool(Stage::Download, e))?;

        if !exit.success() {
            error!(code = ?exit.code(), "Download command failed: {}", exit.stderr.trim());
            let code = exit.code();
            return Err(PipelineError::ToolFailure {
                stage: Stage::Download,
                tool: exit.tool,
                code,
                diagnostic: exit.stderr,
            });
        }

        info!(series = %request.series_id, "Download finished");
        Ok(())
    }
}

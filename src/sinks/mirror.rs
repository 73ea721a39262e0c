//! Best-effort rclone mirror.

use std::path::{Path, PathBuf};

use anidrop_av::ToolCommand;

/// Result of mirroring one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The copy succeeded. `link` is set when a share link was requested and
    /// produced.
    Copied { link: Option<String> },
    /// The copy failed; nothing was rolled back.
    Failed { diagnostic: String },
}

/// Copies delivered files to an rclone remote.
#[derive(Debug, Clone)]
pub struct RcloneMirror {
    rclone: PathBuf,
    remote: String,
    config: Option<PathBuf>,
    link_remote: Option<String>,
    direct_link: bool,
}

impl RcloneMirror {
    pub fn new(rclone: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            rclone: rclone.into(),
            remote: remote.into(),
            config: None,
            link_remote: None,
            direct_link: false,
        }
    }

    /// Use a specific rclone configuration file.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Ask `rclone link` for a share link on this remote after copying.
    pub fn with_link_remote(mut self, link_remote: Option<String>) -> Self {
        self.link_remote = link_remote;
        self
    }

    /// Append `download=1` to share links so they download directly.
    pub fn with_direct_link(mut self, direct: bool) -> Self {
        self.direct_link = direct;
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn wants_link(&self) -> bool {
        self.link_remote.is_some()
    }

    fn push_config(&self, cmd: &mut ToolCommand) {
        if let Some(config) = &self.config {
            cmd.arg("--config").arg(config);
        }
    }

    /// `rclone copy <file> <remote>: [--config <cfg>] --progress`
    pub async fn copy(&self, path: &Path) -> anidrop_av::Result<()> {
        let mut cmd = ToolCommand::new(&self.rclone);
        cmd.arg("copy").arg(path).arg(format!("{}:", self.remote));
        self.push_config(&mut cmd);
        cmd.arg("--progress");

        let output = cmd.output().await?;

        if !output.status.success() {
            return Err(anidrop_av::Error::tool_failed(
                "rclone",
                output.stderr.trim(),
            ));
        }

        Ok(())
    }

    /// `rclone link <link_remote>:<name> [--config <cfg>]`, returning the printed link.
    pub async fn link(&self, name: &str) -> Option<String> {
        let link_remote = self.link_remote.as_deref()?;

        let mut cmd = ToolCommand::new(&self.rclone);
        cmd.arg("link").arg(format!("{}:{}", link_remote, name));
        self.push_config(&mut cmd);

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("rclone link could not run: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            tracing::warn!("rclone link failed for {}: {}", name, output.stderr.trim());
            return None;
        }

        let link = output.stdout.trim();
        if link.is_empty() {
            return None;
        }

        Some(if self.direct_link {
            direct_download(link)
        } else {
            link.to_string()
        })
    }

    /// Copy `path` to the remote and fetch a share link if configured.
    ///
    /// Never fails; problems are reported in the outcome.
    pub async fn mirror(&self, path: &Path) -> MirrorOutcome {
        tracing::info!("Mirroring {:?} to {}:", path, self.remote);

        if let Err(e) = self.copy(path).await {
            tracing::warn!("Mirror copy of {:?} failed: {}", path, e);
            let diagnostic = match e {
                anidrop_av::Error::ToolFailed { message, .. } => message,
                other => other.to_string(),
            };
            return MirrorOutcome::Failed { diagnostic };
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        MirrorOutcome::Copied {
            link: self.link(&name).await,
        }
    }
}

fn direct_download(link: &str) -> String {
    let separator = if link.contains('?') { '&' } else { '?' };
    format!("{}{}download=1", link, separator)
}

//! Async runner for external tools with line-oriented stdout.
//!
//! A [`ToolCommand`] is spawned into a [`RunningTool`]. Standard output is read
//! lazily, one decoded line at a time, while standard error is drained in the
//! background and only handed out once the process has exited. The two
//! completion signals are independent: stdout reaching EOF says nothing about
//! the exit status, which must still be awaited with [`RunningTool::wait`].

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// A builder for constructing and spawning external tool invocations.
///
/// # Example
///
/// ```no_run
/// use anidrop_av::ToolCommand;
///
/// # async fn example() -> anidrop_av::Result<()> {
/// let mut tool = ToolCommand::new("mkvmerge").arg("--version").spawn()?;
/// while let Some(line) = tool.next_line().await? {
///     println!("{line}");
/// }
/// let exit = tool.wait().await?;
/// assert!(exit.success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Create a new command for the given program name or path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(iter.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// The program this command will run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Short tool name used in diagnostics (the program's file name).
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Render the full command line for logging.
    pub fn display(&self) -> String {
        let mut line = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Start the process without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the executable does not exist. Programs
    ///   given as a path are checked before anything is spawned.
    /// - [`Error::Launch`] if the OS refused to start the process.
    pub fn spawn(&self) -> Result<RunningTool> {
        let tool = self.tool_name();

        if is_explicit_path(&self.program) && !self.program.exists() {
            return Err(Error::tool_not_found(self.program.display().to_string()));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Spawning: {}", self.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(&tool)
            } else {
                Error::launch(&tool, e.to_string())
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::launch(&tool, "stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::launch(&tool, "stderr was not captured"))?;

        // Drained eagerly so the child never blocks on a full stderr pipe.
        let stderr = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        Ok(RunningTool {
            tool,
            child,
            stdout: BufReader::new(stdout),
            stdout_done: false,
            line: Vec::new(),
            stderr,
        })
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit status is reported in the returned [`ToolOutput`], not
    /// as an error.
    pub async fn output(&self) -> Result<ToolOutput> {
        let mut running = self.spawn()?;
        let mut stdout = String::new();
        while let Some(line) = running.next_line().await? {
            stdout.push_str(&line);
            stdout.push('\n');
        }
        let exit = running.wait().await?;

        Ok(ToolOutput {
            status: exit.status,
            stdout,
            stderr: exit.stderr,
        })
    }
}

fn is_explicit_path(program: &Path) -> bool {
    program.components().count() > 1
}

/// A spawned external process.
///
/// Dropping a `RunningTool` before [`wait`](Self::wait) kills the process.
#[derive(Debug)]
pub struct RunningTool {
    tool: String,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stdout_done: bool,
    line: Vec<u8>,
    stderr: JoinHandle<Vec<u8>>,
}

impl RunningTool {
    /// Name of the running tool.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Read the next line of standard output.
    ///
    /// Lines are decoded lossily and stripped of their line terminator.
    /// Returns `Ok(None)` once the stream reaches end-of-file; every later
    /// call keeps returning `Ok(None)`.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        if self.stdout_done {
            return Ok(None);
        }

        self.line.clear();
        let read = self.stdout.read_until(b'\n', &mut self.line).await?;
        if read == 0 {
            self.stdout_done = true;
            return Ok(None);
        }

        while matches!(self.line.last(), Some(b'\n' | b'\r')) {
            self.line.pop();
        }

        Ok(Some(String::from_utf8_lossy(&self.line).into_owned()))
    }

    /// Wait for the process to exit.
    ///
    /// Any stdout not yet consumed is discarded. The exit status is returned
    /// as data together with the buffered standard error.
    pub async fn wait(mut self) -> Result<ToolExit> {
        while self.next_line().await?.is_some() {}

        let status = self.child.wait().await?;
        let stderr = self.stderr.await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::debug!("{} exited with {}", self.tool, status);

        Ok(ToolExit {
            tool: self.tool,
            status,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Final state of a finished process.
#[derive(Debug, Clone)]
pub struct ToolExit {
    /// Name of the tool that ran.
    pub tool: String,
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolExit {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, if the process was not terminated by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Trimmed standard error, for operator-facing reports.
    pub fn diagnostic(&self) -> &str {
        self.stderr.trim()
    }
}

/// Output captured from a tool run to completion.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

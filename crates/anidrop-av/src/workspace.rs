//! Same-directory scratch space for in-place container rewrites.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory created next to the file being rewritten.
///
/// Tools write their result to [`output`](Self::output); [`finalize`](Self::finalize)
/// then renames it over the original. Because the scratch directory lives on
/// the same filesystem as the target, the swap is a single atomic rename.
/// Dropping the workspace (or calling [`discard`](Self::discard)) removes the
/// scratch directory and anything left in it.
///
/// # Example
///
/// ```no_run
/// use anidrop_av::Workspace;
///
/// let workspace = Workspace::beside("/videos/episode.mkv")?;
/// // mkvmerge -o {workspace.output()} /videos/episode.mkv ...
/// workspace.finalize()?;
/// # Ok::<(), anidrop_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
    target_path: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a workspace for rewriting `target` in place.
    pub fn beside<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref();

        let file_name = target
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {:?}", target)))?;

        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(".anidrop-")
            .tempdir_in(&parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            target_path: target.to_path_buf(),
            output_path,
        })
    }

    /// The file being rewritten.
    pub fn target(&self) -> &Path {
        &self.target_path
    }

    /// Where the rewritten file must be written.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Create a scratch file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Atomically replace the target with the rewritten output.
    pub fn finalize(self) -> Result<PathBuf> {
        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        std::fs::rename(&self.output_path, &self.target_path).map_err(|e| {
            Error::Workspace(format!("Failed to move output onto target: {}", e))
        })?;

        Ok(self.target_path)
    }

    /// Throw the rewritten output away, leaving the target untouched.
    pub fn discard(self) {
        drop(self.temp_dir);
    }
}

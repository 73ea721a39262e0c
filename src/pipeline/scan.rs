//! Locating the file an acquisition produced.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// The most recently modified file in `dir` with the given extension.
///
/// Only the top level of `dir` is considered; the extension match ignores
/// case. A missing directory yields `Ok(None)`.
pub fn latest_file(dir: &Path, extension: &str) -> std::io::Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let modified = entry.metadata().map_err(std::io::Error::from)?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, entry.into_path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_picks_newest_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.mkv"), Duration::from_secs(300));
        touch(&dir.path().join("new.MKV"), Duration::from_secs(10));
        touch(&dir.path().join("newest.mp4"), Duration::from_secs(0));
        std::fs::create_dir(dir.path().join("nested.mkv")).unwrap();

        let latest = latest_file(dir.path(), "mkv").unwrap();
        assert_eq!(latest, Some(dir.path().join("new.MKV")));
    }

    #[test]
    fn test_empty_and_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_file(dir.path(), "mkv").unwrap(), None);
        assert_eq!(latest_file(&dir.path().join("missing"), "mkv").unwrap(), None);
    }
}

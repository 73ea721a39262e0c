//! Local directory sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Delivery, DeliverySink, SinkError, Upload};
use crate::progress::TransferObserver;

const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

/// Copies assets (and their thumbnails) into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    chunk_size: usize,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn destination(&self, source: &Path) -> Result<PathBuf, SinkError> {
        let name = source.file_name().ok_or_else(|| {
            SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", source.display()),
            ))
        })?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl DeliverySink for DirectorySink {
    fn name(&self) -> &str {
        "directory"
    }

    async fn deliver(
        &self,
        upload: &Upload<'_>,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Delivery, SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.destination(upload.path)?;
        let mut source = tokio::fs::File::open(upload.path).await?;
        let total = source.metadata().await?.len();
        let mut sink = tokio::fs::File::create(&target).await?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut sent = 0u64;
        observer.on_progress(0, total);

        loop {
            let read = source.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            sink.write_all(&buf[..read]).await?;
            sent += read as u64;
            observer.on_progress(sent, total);
        }
        sink.flush().await?;

        if let Some(thumbnail) = upload.thumbnail {
            let thumb_target = self.destination(thumbnail)?;
            if let Err(e) = tokio::fs::copy(thumbnail, &thumb_target).await {
                tracing::warn!("Failed to copy thumbnail {:?}: {}", thumbnail, e);
            }
        }

        tracing::info!("Delivered {:?} to {:?} ({} bytes)", upload.path, target, sent);

        Ok(Delivery {
            sink: self.name().to_string(),
            location: Some(target.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u64, u64)>>);

    impl TransferObserver for Recorder {
        fn on_progress(&self, sent: u64, total: u64) {
            self.0.lock().push((sent, total));
        }
    }

    #[tokio::test]
    async fn test_copies_in_chunks_with_progress() {
        let src_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let file = src_dir.path().join("episode.mkv");
        std::fs::write(&file, vec![7u8; 10]).unwrap();

        let sink = DirectorySink::new(out_dir.path().join("library")).with_chunk_size(4);
        let recorder = Arc::new(Recorder::default());
        let upload = Upload {
            path: &file,
            thumbnail: None,
            caption: "`episode.mkv`",
        };

        let delivery = sink.deliver(&upload, recorder.clone()).await.unwrap();

        let target = out_dir.path().join("library/episode.mkv");
        assert_eq!(std::fs::read(&target).unwrap(), vec![7u8; 10]);
        assert_eq!(delivery.location, Some(target.display().to_string()));
        assert_eq!(
            *recorder.0.lock(),
            vec![(0, 10), (4, 10), (8, 10), (10, 10)]
        );
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let out_dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(out_dir.path());
        let missing = out_dir.path().join("missing.mkv");
        let upload = Upload {
            path: &missing,
            thumbnail: None,
            caption: "",
        };

        let err = sink.deliver(&upload, Arc::new(())).await.unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}

//! Upload stage: size gate, primary delivery, mirror, cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::Instant;
use tracing::{info, warn};

use super::MediaAsset;
use crate::error::PipelineError;
use crate::notifications::StatusMessage;
use crate::progress::{ProgressFeed, ProgressGate, ProgressSample, TransferObserver};
use crate::sinks::{Delivery, DeliverySink, MirrorOutcome, RcloneMirror, Upload};

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

/// What the upload stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub delivery: Delivery,
    pub mirror: Option<MirrorOutcome>,
}

fn human_limit(max_bytes: u64) -> String {
    if max_bytes >= GIB && max_bytes % GIB == 0 {
        format!("{}GB", max_bytes / GIB)
    } else {
        format!("{}MB", max_bytes / MIB)
    }
}

/// Refuse files larger than `max_bytes`. Returns the file size.
pub fn check_size(path: &Path, max_bytes: u64) -> Result<u64, PipelineError> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(PipelineError::ConstraintViolation(format!(
            "File size exceeds the {} delivery limit.",
            human_limit(max_bytes)
        )));
    }
    Ok(size)
}

/// Delivers a finished asset to the primary sink and the optional mirror.
pub struct UploadStage {
    sink: Arc<dyn DeliverySink>,
    mirror: Option<RcloneMirror>,
    max_bytes: u64,
    min_interval: Duration,
}

impl UploadStage {
    pub fn new(sink: Arc<dyn DeliverySink>, max_bytes: u64, min_interval: Duration) -> Self {
        Self {
            sink,
            mirror: None,
            max_bytes,
            min_interval,
        }
    }

    pub fn with_mirror(mut self, mirror: Option<RcloneMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    /// Deliver `asset`, then delete it and its thumbnail.
    ///
    /// The size gate and the primary delivery abort the task; the local file
    /// is kept in that case. Mirror problems are reported but never undo the
    /// primary delivery.
    pub async fn run(
        &self,
        asset: &MediaAsset,
        status: &mut StatusMessage,
    ) -> Result<UploadReport, PipelineError> {
        let size = check_size(&asset.path, self.max_bytes)?;

        status
            .report(&format!("📤 Uploading to {}...", self.sink.name()))
            .await;

        let name = asset.file_name();
        let caption = format!("`{}`", name);
        let upload = Upload {
            path: &asset.path,
            thumbnail: asset.thumbnail.as_deref().filter(|p| p.exists()),
            caption: &caption,
        };

        info!(size, sink = self.sink.name(), "Uploading {:?}", asset.path);
        let delivery = self.transfer(&upload, &name, status).await?;

        status
            .report(&format!("✅ **Upload complete on {}!**", self.sink.name()))
            .await;

        let mirror = match &self.mirror {
            Some(mirror) => {
                let outcome = mirror.mirror(&asset.path).await;
                status
                    .report(&mirror_status(&outcome, mirror.wants_link(), &asset.path))
                    .await;
                Some(outcome)
            }
            None => None,
        };

        cleanup(&asset.path, asset.thumbnail.as_deref());

        Ok(UploadReport { delivery, mirror })
    }

    /// Run the sink transfer and the progress reporter side by side.
    async fn transfer(
        &self,
        upload: &Upload<'_>,
        label: &str,
        status: &mut StatusMessage,
    ) -> Result<Delivery, PipelineError> {
        let (feed, progress) = ProgressFeed::channel();
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let mut gate = ProgressGate::new(self.min_interval);
        let started = Instant::now();

        let sink = &self.sink;
        let observer: Arc<dyn TransferObserver> = Arc::new(feed);
        let transfer = async move {
            let result = sink.deliver(upload, observer).await;
            let _ = done_tx.send(());
            result
        };
        let reporter = report_progress(progress, done_rx, &mut gate, label, started, status);

        let (result, ()) = tokio::join!(transfer, reporter);
        Ok(result?)
    }
}

async fn report_progress(
    mut progress: watch::Receiver<(u64, u64)>,
    mut done: oneshot::Receiver<()>,
    gate: &mut ProgressGate,
    label: &str,
    started: Instant,
    status: &mut StatusMessage,
) {
    gate.reset();

    loop {
        tokio::select! {
            biased;
            _ = &mut done => break,
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                let (sent, total) = *progress.borrow_and_update();
                let sample = ProgressSample::new(sent, total, started, Instant::now());
                if let Some(text) = gate.observe(label, &sample) {
                    status.report(&text).await;
                }
            }
        }
    }
}

fn mirror_status(outcome: &MirrorOutcome, wants_link: bool, path: &Path) -> String {
    match outcome {
        MirrorOutcome::Copied { link: Some(link) } => {
            format!("✅ **Uploaded to rclone!**\n{}", link)
        }
        MirrorOutcome::Copied { link: None } if wants_link => format!(
            "❌ Failed to generate rclone share link for {}",
            path.display()
        ),
        MirrorOutcome::Copied { link: None } => "✅ **Uploaded to rclone!**".to_string(),
        MirrorOutcome::Failed { diagnostic } => {
            format!("⚠️ rclone upload failed:\n{}", diagnostic)
        }
    }
}

/// Delete the delivered file and its thumbnail.
fn cleanup(path: &Path, thumbnail: Option<&Path>) {
    let paths: Vec<PathBuf> = std::iter::once(path.to_path_buf())
        .chain(thumbnail.map(Path::to_path_buf))
        .collect();

    for path in paths {
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => info!("File deleted: {:?}", path),
            Err(e) => warn!("Failed to delete {:?}: {}", path, e),
        }
    }
}

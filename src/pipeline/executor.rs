use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anidrop_av::{ExternalTool, SignFilter};
use tracing::{error, info};

use super::scan::latest_file;
use super::{
    AcquisitionRequest, Downloader, MediaAsset, MuxReport, MuxStage, UploadReport, UploadStage,
};
use crate::config::{Config, StageOrder};
use crate::error::PipelineError;
use crate::metadata::{CoverCatalog, Enricher};
use crate::notifications::{StatusChannel, StatusMessage};
use crate::queue::{TaskId, TaskQueue};
use crate::sinks::{DeliverySink, RcloneMirror};

/// First text of every task's status message.
pub const STARTING_TEXT: &str = "⚙️ Starting download...";

/// What a successful task did.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The asset as delivered (its local file is gone by now).
    pub asset: MediaAsset,
    pub mux: Option<MuxReport>,
    pub upload: UploadReport,
}

/// One acquisition task, from download to cleanup.
///
/// Shared behind an `Arc` so every queued task uses the same stages.
pub struct Pipeline {
    channel: Arc<dyn StatusChannel>,
    downloader: Downloader,
    video_dir: PathBuf,
    extension: String,
    enricher: Option<Enricher>,
    mux: MuxStage,
    upload: UploadStage,
    order: StageOrder,
    settle_delay: Duration,
}

impl Pipeline {
    /// Build the stages from configuration.
    pub fn new(
        config: &Config,
        channel: Arc<dyn StatusChannel>,
        sink: Arc<dyn DeliverySink>,
        catalog: Option<Arc<dyn CoverCatalog>>,
    ) -> Self {
        let tools = &config.tools;
        let min_interval = Duration::from_millis(config.progress.min_interval_ms);

        let downloader = Downloader::new(
            &config.acquisition.tool,
            config.acquisition.progress_marker.clone(),
            min_interval,
        );

        let enricher = config
            .pipeline
            .enrich
            .then(|| Enricher::new(catalog, &config.metadata));

        let mux = MuxStage::new(
            ExternalTool::Ffmpeg.resolve(tools.ffmpeg_path.as_deref()),
            ExternalTool::Mkvmerge.resolve(tools.mkvmerge_path.as_deref()),
        )
        .with_signs(config.pipeline.sign_subtitles.then(SignFilter::default))
        .with_chapters(
            config
                .pipeline
                .chapters
                .then(|| config.paths.chapters_file.clone()),
        );

        let mirror = config.mirror.enabled.then(|| {
            RcloneMirror::new(
                ExternalTool::Rclone.resolve(tools.rclone_path.as_deref()),
                config.mirror.remote.clone(),
            )
            .with_config(config.mirror.config_path.clone())
            .with_link_remote(config.mirror.link_remote.clone())
            .with_direct_link(config.mirror.direct_link)
        });

        let upload = UploadStage::new(sink, config.delivery.max_upload_bytes, min_interval)
            .with_mirror(mirror);

        Self {
            channel,
            downloader,
            video_dir: config.paths.video_dir.clone(),
            extension: config.paths.extension.clone(),
            enricher,
            mux,
            upload,
            order: config.pipeline.order,
            settle_delay: Duration::from_secs(config.pipeline.settle_delay_secs),
        }
    }

    /// Run one request, reporting progress and the final outcome on a fresh
    /// status message.
    pub async fn run(&self, request: &AcquisitionRequest) -> Result<PipelineReport, PipelineError> {
        let mut status = StatusMessage::open(self.channel.clone(), STARTING_TEXT).await?;

        match self.execute(request, &mut status).await {
            Ok(report) => {
                info!(series = %request.series_id, "Task finished: {}", report.asset.file_name());
                Ok(report)
            }
            Err(e) => {
                error!(series = %request.series_id, "Task aborted: {}", e);
                status.report(&e.status_text()).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &AcquisitionRequest,
        status: &mut StatusMessage,
    ) -> Result<PipelineReport, PipelineError> {
        self.downloader.run(request, status).await?;

        let path = latest_file(&self.video_dir, &self.extension)?.ok_or_else(|| {
            PipelineError::NoAsset {
                dir: self.video_dir.clone(),
                extension: self.extension.clone(),
            }
        })?;
        info!("Latest file: {:?}", path);

        let mut asset = MediaAsset::new(path, request.service);

        let mux = match self.order {
            StageOrder::EnrichFirst => {
                self.enrich(&mut asset).await;
                self.remux(&mut asset, status).await
            }
            StageOrder::MuxFirst => {
                let mux = self.remux(&mut asset, status).await;
                self.enrich(&mut asset).await;
                mux
            }
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let upload = self.upload.run(&asset, status).await?;

        Ok(PipelineReport {
            asset,
            mux,
            upload,
        })
    }

    async fn enrich(&self, asset: &mut MediaAsset) {
        if let Some(enricher) = &self.enricher {
            let enrichment = enricher.enrich(&asset.path, asset.service).await;
            asset.apply(enrichment);
        }
    }

    async fn remux(&self, asset: &mut MediaAsset, status: &mut StatusMessage) -> Option<MuxReport> {
        if !self.mux.is_enabled() {
            return None;
        }

        let report = self.mux.run(&asset.path, status).await;
        asset.path = report.path.clone();
        Some(report)
    }

    /// Queue `request` on `queue`.
    ///
    /// The task reports its own failure on the status message and hands the
    /// error to the queue for logging.
    pub fn enqueue(self: &Arc<Self>, queue: &TaskQueue, request: AcquisitionRequest) -> TaskId {
        let pipeline = Arc::clone(self);
        queue.submit(request.label(), move || async move {
            pipeline.run(&request).await?;
            Ok(())
        })
    }
}

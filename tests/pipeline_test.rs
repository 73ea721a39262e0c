//! Pipeline integration tests
//!
//! Runs whole tasks against shell scripts standing in for the acquisition
//! tool, delivering into a temporary directory.

#![cfg(unix)]

mod common;

use std::sync::Arc;

use anidrop::error::{PipelineError, Stage};
use anidrop::metadata::{CatalogError, CoverCatalog};
use anidrop::pipeline::{AcquisitionRequest, Pipeline};
use anidrop::queue::TaskQueue;
use anidrop::sinks::DirectorySink;
use assert_matches::assert_matches;
use async_trait::async_trait;
use bytes::Bytes;
use common::{directory_config, fake_tool, RecordingChannel};
use serial_test::serial;
use tempfile::tempdir;

fn downloader_script(video_dir: &std::path::Path, file_name: &str) -> String {
    format!(
        r#"echo "Resolving $4"
echo "Progress: 10% (1/10)"
echo "Progress: 100% (10/10)"
printf 'episode' > "{}/{}"
"#,
        video_dir.display(),
        file_name
    )
}

#[tokio::test]
#[serial]
async fn test_successful_task_is_renamed_delivered_and_cleaned_up() {
    let tools = tempdir().unwrap();
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();

    let tool = fake_tool(
        tools.path(),
        "aniDL",
        &downloader_script(videos.path(), "Show_S01E02.mkv"),
    );
    let config = directory_config(videos.path(), out.path(), &tool);

    let channel = RecordingChannel::new();
    let sink = Arc::new(DirectorySink::new(out.path()).with_chunk_size(4));
    let pipeline = Pipeline::new(&config, channel.clone(), sink, None);

    let report = pipeline
        .run(&AcquisitionRequest::new("GRMG8ZQZR", vec![]))
        .await
        .unwrap();

    assert_eq!(report.asset.file_name(), "[CR] Show - S01E02 [1080p].mkv");
    assert!(report.mux.is_none());
    assert_eq!(
        std::fs::read(out.path().join("[CR] Show - S01E02 [1080p].mkv")).unwrap(),
        b"episode"
    );
    assert_eq!(std::fs::read_dir(videos.path()).unwrap().count(), 0);

    let texts = channel.texts();
    assert_eq!(texts[0], "⚙️ Starting download...");
    // The final line lands inside the throttle window and is shown at EOF.
    assert_eq!(texts[1], "⚙️ Progress: 10% (1/10)");
    assert_eq!(texts[2], "⚙️ Progress: 100% (10/10)");
    assert!(texts.contains(&"📤 Uploading to directory...".to_string()));
    assert_eq!(
        channel.last().as_deref(),
        Some("✅ **Upload complete on directory!**")
    );
}

/// Catalog that knows a single series.
struct OneSeries(&'static str);

#[async_trait]
impl CoverCatalog for OneSeries {
    fn name(&self) -> &'static str {
        "one-series"
    }

    async fn cover_url(&self, search: &str) -> Result<Option<String>, CatalogError> {
        Ok((search == self.0).then(|| "https://covers.test/show.jpg".to_string()))
    }

    async fn fetch_image(&self, _url: &str) -> Result<Bytes, CatalogError> {
        Ok(Bytes::from_static(b"jpeg"))
    }
}

#[tokio::test]
#[serial]
async fn test_chapters_and_cover_are_delivered_then_removed() {
    let tools = tempdir().unwrap();
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();

    let tool = fake_tool(
        tools.path(),
        "aniDL",
        &downloader_script(videos.path(), "Show_S01E02.mkv"),
    );
    // mkvmerge -o <output> <input> --chapters <file>
    let mkvmerge = fake_tool(tools.path(), "mkvmerge", "cp \"$3\" \"$2\"\nexit 0\n");
    let chapters = tools.path().join("chapters.txt");
    std::fs::write(&chapters, "CHAPTER01=00:00:00.000\nCHAPTER01NAME=Intro\n").unwrap();

    let mut config = directory_config(videos.path(), out.path(), &tool);
    config.pipeline.chapters = true;
    config.paths.chapters_file = chapters;
    config.tools.mkvmerge_path = Some(mkvmerge);

    let channel = RecordingChannel::new();
    let sink = Arc::new(DirectorySink::new(out.path()));
    let pipeline = Pipeline::new(
        &config,
        channel.clone(),
        sink,
        Some(Arc::new(OneSeries("Show"))),
    );

    let report = pipeline
        .run(&AcquisitionRequest::new("GRMG8ZQZR", vec![]))
        .await
        .unwrap();

    let mux = report.mux.expect("chapters enabled");
    assert!(mux.chapters.is_applied());
    assert_eq!(
        report.asset.file_name(),
        "[CR] Show - S01E02 [1080p]_muxed.mkv"
    );
    assert_eq!(report.asset.display_title.as_deref(), Some("Show"));

    assert_eq!(
        std::fs::read(out.path().join("[CR] Show - S01E02 [1080p]_muxed.mkv")).unwrap(),
        b"episode"
    );
    assert_eq!(
        std::fs::read(out.path().join("[CR] Show - S01E02 [1080p]_cover.jpg")).unwrap(),
        b"jpeg"
    );

    // Renamed source, merged file and cover are all gone locally.
    assert!(!videos.path().join("[CR] Show - S01E02 [1080p].mkv").exists());
    assert!(!videos.path().join("[CR] Show - S01E02 [1080p]_muxed.mkv").exists());
    assert!(!videos.path().join("[CR] Show - S01E02 [1080p]_cover.jpg").exists());
    assert_eq!(std::fs::read_dir(videos.path()).unwrap().count(), 0);

    assert_eq!(
        channel.last().as_deref(),
        Some("✅ **Upload complete on directory!**")
    );
}

#[tokio::test]
#[serial]
async fn test_failed_download_reports_stderr() {
    let tools = tempdir().unwrap();
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();

    let tool = fake_tool(
        tools.path(),
        "aniDL",
        "echo \"Progress: 3%\"\necho 'series not found' >&2\nexit 2\n",
    );
    let config = directory_config(videos.path(), out.path(), &tool);

    let channel = RecordingChannel::new();
    let pipeline = Pipeline::new(
        &config,
        channel.clone(),
        Arc::new(DirectorySink::new(out.path())),
        None,
    );

    let err = pipeline
        .run(&AcquisitionRequest::new("BAD", vec![]))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        PipelineError::ToolFailure {
            stage: Stage::Download,
            code: Some(2),
            ..
        }
    );
    assert_eq!(
        channel.last().as_deref(),
        Some("❌ Error occurred during download:\nseries not found\n")
    );
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_tool_is_a_launch_error() {
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();
    let tool = videos.path().join("missing").join("aniDL");
    let config = directory_config(videos.path(), out.path(), &tool);

    let channel = RecordingChannel::new();
    let pipeline = Pipeline::new(
        &config,
        channel.clone(),
        Arc::new(DirectorySink::new(out.path())),
        None,
    );

    let err = pipeline
        .run(&AcquisitionRequest::new("1", vec![]))
        .await
        .unwrap_err();

    assert!(err.is_launch());
    assert_eq!(
        channel.last().unwrap(),
        format!("❌ Error: {} tool not found.", tool.display())
    );
}

#[tokio::test]
#[serial]
async fn test_no_asset_after_download() {
    let tools = tempdir().unwrap();
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();

    let tool = fake_tool(tools.path(), "aniDL", "exit 0\n");
    let config = directory_config(videos.path(), out.path(), &tool);

    let channel = RecordingChannel::new();
    let pipeline = Pipeline::new(
        &config,
        channel.clone(),
        Arc::new(DirectorySink::new(out.path())),
        None,
    );

    let err = pipeline
        .run(&AcquisitionRequest::new("1", vec![]))
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::NoAsset { .. });
    assert_eq!(
        channel.last().as_deref(),
        Some("❌ No .mkv files found in the videos directory.")
    );
}

#[tokio::test]
#[serial]
async fn test_queued_tasks_run_one_after_another() {
    let tools = tempdir().unwrap();
    let videos = tempdir().unwrap();
    let out = tempdir().unwrap();

    // Each run names its file after the series id it was given.
    let tool = fake_tool(
        tools.path(),
        "aniDL",
        &format!(
            "sleep 0.2\nprintf '%s' \"$4\" > \"{}/Series $4 - 01.mkv\"\n",
            videos.path().display()
        ),
    );
    let config = directory_config(videos.path(), out.path(), &tool);

    let channel = RecordingChannel::new();
    let pipeline = Arc::new(Pipeline::new(
        &config,
        channel.clone(),
        Arc::new(DirectorySink::new(out.path())),
        None,
    ));

    let queue = TaskQueue::new();
    let first = pipeline.enqueue(&queue, AcquisitionRequest::new("Alpha", vec![]));
    let second = pipeline.enqueue(&queue, AcquisitionRequest::new("Beta", vec!["--hidive".into()]));
    assert!(first.get() < second.get());

    queue.wait_idle().await;

    assert_eq!(channel.posts(), 2);
    assert!(out.path().join("[CR] Series Alpha - S01E01 [1080p].mkv").exists());
    assert!(out.path().join("[HD] Series Beta - S01E01 [1080p].mkv").exists());

    let completions: Vec<_> = channel
        .texts()
        .into_iter()
        .filter(|t| t.starts_with("✅ **Upload complete"))
        .collect();
    assert_eq!(completions.len(), 2);
}

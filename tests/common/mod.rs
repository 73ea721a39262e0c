//! Shared helpers for integration tests.
//!
//! Provides [`RecordingChannel`], a status channel that keeps every text it
//! was asked to show, and [`fake_tool`] for standing in external binaries with
//! shell scripts.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use anidrop::config::{Config, SinkKind};
use anidrop::notifications::{ChannelError, MessageId, StatusChannel};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Status channel that records posts and edits in order.
#[derive(Default)]
pub struct RecordingChannel {
    texts: Mutex<Vec<String>>,
    posts: Mutex<usize>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every text shown, in order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.texts.lock().last().cloned()
    }

    /// Number of messages posted (one per task).
    pub fn posts(&self) -> usize {
        *self.posts.lock()
    }
}

#[async_trait]
impl StatusChannel for RecordingChannel {
    async fn post(&self, text: &str) -> Result<MessageId, ChannelError> {
        let mut posts = self.posts.lock();
        *posts += 1;
        self.texts.lock().push(text.to_string());
        Ok(MessageId(*posts as i64))
    }

    async fn edit(&self, _id: MessageId, text: &str) -> Result<(), ChannelError> {
        self.texts.lock().push(text.to_string());
        Ok(())
    }
}

#[cfg(unix)]
pub use anidrop_av::test_support::fake_tool;

/// Config delivering into `out_dir`, with mux stages and the settle delay off.
pub fn directory_config(video_dir: &Path, out_dir: &Path, tool: &Path) -> Config {
    let mut config = Config::default();
    config.paths.video_dir = video_dir.to_path_buf();
    config.paths.chapters_file = video_dir.join("chapters.txt");
    config.acquisition.tool = tool.to_path_buf();
    config.pipeline.sign_subtitles = false;
    config.pipeline.chapters = false;
    config.pipeline.settle_delay_secs = 0;
    config.delivery.sink = SinkKind::Directory;
    config.delivery.directory = Some(out_dir.to_path_buf());
    config.progress.chunk_size = 4096;
    config
}

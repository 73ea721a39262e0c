use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory the acquisition tool writes into
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// File extension picked up after a download (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Chapter definition merged into every episode when present
    #[serde(default = "default_chapters_file")]
    pub chapters_file: PathBuf,
}

fn default_video_dir() -> PathBuf {
    PathBuf::from("./videos")
}
fn default_extension() -> String {
    "mkv".to_string()
}
fn default_chapters_file() -> PathBuf {
    PathBuf::from("./chapters.txt")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            video_dir: default_video_dir(),
            extension: default_extension(),
            chapters_file: default_chapters_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcquisitionConfig {
    /// Path to the acquisition tool
    #[serde(default = "default_acquisition_tool")]
    pub tool: PathBuf,

    /// Stdout marker identifying progress lines worth forwarding
    #[serde(default = "default_progress_marker")]
    pub progress_marker: String,
}

fn default_acquisition_tool() -> PathBuf {
    PathBuf::from("./aniDL")
}
fn default_progress_marker() -> String {
    "Progress:".to_string()
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            tool: default_acquisition_tool(),
            progress_marker: default_progress_marker(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub mkvmerge_path: Option<PathBuf>,

    #[serde(default)]
    pub rclone_path: Option<PathBuf>,
}

/// Relative order of the enrichment and mux stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageOrder {
    #[default]
    EnrichFirst,
    MuxFirst,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Rename and fetch cover art
    #[serde(default = "default_true")]
    pub enrich: bool,

    /// Extract sign cues into a separate default track
    #[serde(default = "default_true")]
    pub sign_subtitles: bool,

    /// Merge `paths.chapters_file` when it exists
    #[serde(default = "default_true")]
    pub chapters: bool,

    #[serde(default)]
    pub order: StageOrder,

    /// Pause between muxing and upload
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_settle_delay() -> u64 {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enrich: true,
            sign_subtitles: true,
            chapters: true,
            order: StageOrder::default(),
            settle_delay_secs: default_settle_delay(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    /// Minimum spacing between two status edits of one transfer
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Read size used when streaming files to a sink
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_min_interval_ms() -> u64 {
    2000
}
fn default_chunk_size() -> usize {
    512 * 1024
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// AniList GraphQL endpoint
    #[serde(default = "default_metadata_endpoint")]
    pub endpoint: String,

    /// Longest title kept in file names
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Resolution tag used when the file name carries none
    #[serde(default = "default_resolution")]
    pub default_resolution: String,

    /// Cover lookup attempts per query
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_metadata_endpoint() -> String {
    "https://graphql.anilist.co".to_string()
}
fn default_max_title_length() -> usize {
    25
}
fn default_resolution() -> String {
    "1080p".to_string()
}
fn default_retries() -> u32 {
    3
}
fn default_retry_backoff() -> u64 {
    2
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            endpoint: default_metadata_endpoint(),
            max_title_length: default_max_title_length(),
            default_resolution: default_resolution(),
            retries: default_retries(),
            retry_backoff_secs: default_retry_backoff(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Primary delivery target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Telegram,
    Directory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub sink: SinkKind,

    /// Target directory for the `directory` sink
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Files above this size are refused before any transfer
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_max_upload_bytes() -> u64 {
    2 * 1024 * 1024 * 1024
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            directory: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api_url: String,

    /// Bot token (overridden by `ANIDROP_BOT_TOKEN`)
    #[serde(default)]
    pub bot_token: String,

    /// Chat receiving status messages and documents
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Bot API parse mode for messages and captions (e.g. "Markdown")
    #[serde(default)]
    pub parse_mode: Option<String>,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api(),
            bot_token: String::new(),
            chat_id: None,
            parse_mode: None,
        }
    }
}

impl TelegramConfig {
    /// Whether enough is configured to talk to the Bot API.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && self.chat_id.as_deref().is_some_and(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub enabled: bool,

    /// rclone remote name (without the trailing colon)
    #[serde(default)]
    pub remote: String,

    /// rclone configuration file
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Remote to request a share link from after copying
    #[serde(default)]
    pub link_remote: Option<String>,

    /// Turn the share link into a direct download (`download=1`)
    #[serde(default)]
    pub direct_link: bool,
}

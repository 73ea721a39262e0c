//! Configuration loading tests.

use std::fs;

use anidrop::config::{self, SinkKind, StageOrder, BOT_TOKEN_ENV};
use serial_test::serial;
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn test_full_config_file() {
    std::env::remove_var(BOT_TOKEN_ENV);
    let temp = tempdir().unwrap();
    let path = temp.path().join("anidrop.toml");
    fs::write(
        &path,
        r#"
[paths]
video_dir = "/srv/videos"
extension = "mp4"

[acquisition]
tool = "/opt/anidl/aniDL"

[pipeline]
sign_subtitles = false
order = "mux-first"
settle_delay_secs = 0

[delivery]
sink = "telegram"

[telegram]
bot_token = "123:abc"
chat_id = "-1001"

[mirror]
enabled = true
remote = "onedrive"
link_remote = "onedrive"
direct_link = true
"#,
    )
    .unwrap();

    let config = config::load_config(&path).unwrap();

    assert_eq!(config.paths.extension, "mp4");
    assert_eq!(config.acquisition.tool.to_str(), Some("/opt/anidl/aniDL"));
    assert_eq!(config.acquisition.progress_marker, "Progress:");
    assert!(!config.pipeline.sign_subtitles);
    assert!(config.pipeline.chapters);
    assert_eq!(config.pipeline.order, StageOrder::MuxFirst);
    assert_eq!(config.delivery.sink, SinkKind::Telegram);
    assert_eq!(config.delivery.max_upload_bytes, 2 * 1024 * 1024 * 1024);
    assert_eq!(config.telegram.chat_id.as_deref(), Some("-1001"));
    assert_eq!(config.mirror.link_remote.as_deref(), Some("onedrive"));
    assert!(config.mirror.direct_link);
}

#[test]
#[serial]
fn test_rejects_telegram_without_credentials() {
    std::env::remove_var(BOT_TOKEN_ENV);
    let temp = tempdir().unwrap();
    let path = temp.path().join("anidrop.toml");
    fs::write(&path, "[telegram]\nchat_id = \"1\"\n").unwrap();

    let err = config::load_config(&path).unwrap_err();
    assert!(err.to_string().contains("bot_token"));
}

#[test]
fn test_rejects_malformed_toml() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("anidrop.toml");
    fs::write(&path, "[paths\nvideo_dir = 1").unwrap();

    let err = config::load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

// ---------------------------------------------------------------------------
// Environment override
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn test_token_from_environment() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("anidrop.toml");
    fs::write(&path, "[telegram]\nchat_id = \"1\"\n").unwrap();

    std::env::set_var(BOT_TOKEN_ENV, "999:env");
    let result = config::load_config(&path);
    std::env::remove_var(BOT_TOKEN_ENV);

    assert_eq!(result.unwrap().telegram.bot_token, "999:env");
}

#[test]
#[serial]
fn test_explicit_path_wins_over_search() {
    std::env::remove_var(BOT_TOKEN_ENV);
    let temp = tempdir().unwrap();
    let path = temp.path().join("custom.toml");
    fs::write(
        &path,
        "[delivery]\nsink = \"directory\"\ndirectory = \"/srv/out\"\n",
    )
    .unwrap();

    let config = config::load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.delivery.sink, SinkKind::Directory);
}

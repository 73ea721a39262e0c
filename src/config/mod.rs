mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `telegram.bot_token`
pub const BOT_TOKEN_ENV: &str = "ANIDROP_BOT_TOKEN";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./anidrop.toml",
        "./config.toml",
        "~/.config/anidrop/config.toml",
        "/etc/anidrop/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found; callers that need working
    // credentials run validate_config themselves
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
        if !token.is_empty() {
            config.telegram.bot_token = token;
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    // Validate delivery
    match config.delivery.sink {
        SinkKind::Telegram => {
            if config.telegram.bot_token.is_empty() {
                anyhow::bail!(
                    "Telegram delivery requires telegram.bot_token (or {})",
                    BOT_TOKEN_ENV
                );
            }
            if config.telegram.chat_id.as_deref().unwrap_or("").is_empty() {
                anyhow::bail!("Telegram delivery requires telegram.chat_id");
            }
        }
        SinkKind::Directory => {
            if config.delivery.directory.is_none() {
                anyhow::bail!("Directory delivery requires delivery.directory");
            }
        }
    }

    // Validate mirror
    if config.mirror.enabled && config.mirror.remote.trim().is_empty() {
        anyhow::bail!("Mirror is enabled but has no remote");
    }

    if config.progress.min_interval_ms == 0 {
        anyhow::bail!("progress.min_interval_ms cannot be 0");
    }

    if config.metadata.max_title_length < 4 {
        anyhow::bail!(
            "metadata.max_title_length must be at least 4 (got {})",
            config.metadata.max_title_length
        );
    }

    // Validate paths exist
    if !config.paths.video_dir.exists() {
        tracing::warn!("Video directory does not exist: {:?}", config.paths.video_dir);
    }

    Ok(())
}

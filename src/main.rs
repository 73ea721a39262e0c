mod cli;

use anidrop::{
    config::{self, Config, SinkKind},
    metadata::{naming, AniListCatalog, CoverCatalog},
    notifications::{LogChannel, StatusChannel, TelegramBot},
    pipeline::{AcquisitionRequest, Pipeline, Service},
    queue::TaskQueue,
    sinks::{DeliverySink, DirectorySink},
};
use anidrop_av::{audio_stream_count, check_tool, filter_sign_cues, AudioLabel, ExternalTool};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn download(ids: Vec<String>, flags: Vec<String>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    config::validate_config(&config)?;

    let (channel, sink) = build_endpoints(&config)?;

    let catalog: Option<Arc<dyn CoverCatalog>> = config
        .pipeline
        .enrich
        .then(|| Arc::new(AniListCatalog::new(&config.metadata)) as Arc<dyn CoverCatalog>);

    let pipeline = Arc::new(Pipeline::new(&config, channel, sink, catalog));
    let queue = TaskQueue::new();

    for id in ids {
        let request = AcquisitionRequest::new(id, flags.clone());
        let task = pipeline.enqueue(&queue, request);

        match queue.pending().iter().position(|t| t.id == task) {
            Some(index) => println!("📥 Added to queue... (position {})", index + 1),
            None => println!("📥 Added to queue... (starting now)"),
        }
    }

    queue.wait_idle().await;
    tracing::info!("Queue drained");

    Ok(())
}

/// Pick the status channel and the primary sink.
fn build_endpoints(config: &Config) -> Result<(Arc<dyn StatusChannel>, Arc<dyn DeliverySink>)> {
    let bot = config.telegram.is_configured().then(|| {
        Arc::new(TelegramBot::new(&config.telegram).with_chunk_size(config.progress.chunk_size))
    });

    let channel: Arc<dyn StatusChannel> = match &bot {
        Some(bot) => bot.clone(),
        None => {
            tracing::info!("Telegram is not configured, status updates go to the log");
            Arc::new(LogChannel::new())
        }
    };

    let sink: Arc<dyn DeliverySink> = match config.delivery.sink {
        SinkKind::Telegram => match bot {
            Some(bot) => bot,
            None => anyhow::bail!("Telegram delivery requires a configured bot"),
        },
        SinkKind::Directory => {
            let dir = config
                .delivery
                .directory
                .clone()
                .context("Directory delivery requires delivery.directory")?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create delivery directory: {:?}", dir))?;
            Arc::new(DirectorySink::new(dir).with_chunk_size(config.progress.chunk_size))
        }
    };

    Ok((channel, sink))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "anidrop=trace,anidrop_av=debug".to_string()
        } else {
            "anidrop=info,anidrop_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Download { ids, flags } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(download(ids, flags, cli.config.as_deref()))
        }
        Commands::Name { file, service } => name_file(&file, service.into(), cli.config.as_deref()),
        Commands::Probe { file } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, cli.config.as_deref()))
        }
        Commands::Signs { file } => extract_signs(&file),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("anidrop {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn name_file(file: &str, service: Service, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let name = naming::canonical_file_name(
        file,
        service,
        config.metadata.max_title_length,
        &config.metadata.default_resolution,
    )
    .with_context(|| format!("Could not extract a title from {:?}", file))?;

    println!("{}", name);
    Ok(())
}

async fn probe_file(file: &Path, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let ffprobe = ExternalTool::Ffprobe.resolve(config.tools.ffprobe_path.as_deref());

    let count = audio_stream_count(&ffprobe, file)
        .await
        .with_context(|| format!("Failed to probe {:?}", file))?;

    println!("File: {}", file.display());
    println!("Audio streams: {} ({})", count, AudioLabel::from_count(count));

    Ok(())
}

fn extract_signs(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read subtitle file: {:?}", file))?;

    let track = filter_sign_cues(&content);
    if track.is_empty() {
        println!("No sign cues found in {}", file.display());
    } else {
        tracing::info!("Kept {} sign cues", track.cues);
        print!("{}", track.content);
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let tools = &config.tools;

    println!("Checking external tools...\n");

    let mut checks: Vec<_> = ExternalTool::ALL
        .iter()
        .map(|tool| {
            let configured = match tool {
                ExternalTool::Ffmpeg => tools.ffmpeg_path.as_deref(),
                ExternalTool::Ffprobe => tools.ffprobe_path.as_deref(),
                ExternalTool::Mkvmerge => tools.mkvmerge_path.as_deref(),
                ExternalTool::Rclone => tools.rclone_path.as_deref(),
            };
            tool.check(configured)
        })
        .collect();
    checks.push(check_tool(
        "acquisition tool",
        &config.acquisition.tool,
        "--version",
    ));

    for info in &checks {
        println!("{}", info);
    }

    println!();
    if checks.iter().all(|info| info.available) {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &Config) {
    println!("  Video directory: {}", config.paths.video_dir.display());
    println!("  Acquisition tool: {}", config.acquisition.tool.display());
    println!("  Delivery: {:?}", config.delivery.sink);
    println!("  Enrich: {}", config.pipeline.enrich);
    println!("  Sign subtitles: {}", config.pipeline.sign_subtitles);
    println!("  Chapters: {}", config.pipeline.chapters);
    println!("  Stage order: {:?}", config.pipeline.order);
    println!("  Mirror enabled: {}", config.mirror.enabled);
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use anidrop::pipeline::Service;

#[derive(Parser)]
#[command(name = "anidrop")]
#[command(author, version, about = "Media acquisition and delivery pipeline")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ServiceArg {
    Crunchy,
    Hidive,
}

impl From<ServiceArg> for Service {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Crunchy => Service::Crunchy,
            ServiceArg::Hidive => Service::Hidive,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, process and deliver one or more series
    Download {
        /// Series ids to acquire, one task each
        #[arg(required = true)]
        ids: Vec<String>,

        /// Extra flags passed through to the acquisition tool
        #[arg(last = true)]
        flags: Vec<String>,
    },

    /// Print the canonical name for a downloaded file
    Name {
        /// File name to parse
        #[arg(required = true)]
        file: String,

        /// Service the file came from
        #[arg(long, value_enum, default_value = "crunchy")]
        service: ServiceArg,
    },

    /// Count the audio streams of a media file
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Extract sign cues from an ASS subtitle file
    Signs {
        /// Subtitle file to filter
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

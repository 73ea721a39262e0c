//! # anidrop-av
//!
//! External tool layer for the anidrop pipeline.
//!
//! This crate provides functionality for:
//! - Running external tools with line-oriented stdout and buffered stderr
//! - Locating tools on `PATH` or at configured locations
//! - Counting audio streams with ffprobe
//! - Filtering "sign" cues out of ASS subtitle tracks
//! - Merging chapters and sign tracks into Matroska files with mkvmerge
//!
//! ## Features
//!
//! - `tracing` (default) - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use anidrop_av::{actions, SignFilter};
//! use std::path::Path;
//!
//! # async fn example() -> anidrop_av::Result<()> {
//! let outcome = actions::mux_sign_track(
//!     Path::new("ffmpeg"),
//!     Path::new("mkvmerge"),
//!     Path::new("/videos/episode.mkv"),
//!     &SignFilter::default(),
//! )
//! .await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod command;
mod error;
pub mod probe;
pub mod subtitle;
pub mod tools;
pub mod workspace;

#[cfg(all(unix, any(test, feature = "test-support")))]
pub mod test_support;

// Re-exports
pub use actions::{ChapterMerge, SignMux, SignStage};
pub use command::{RunningTool, ToolCommand, ToolExit, ToolOutput};
pub use error::{Error, Result};
pub use probe::{audio_stream_count, AudioLabel};
pub use subtitle::{filter_sign_cues, Cue, SignFilter, SignMatch, SignTrack, EVENTS_FORMAT};
pub use tools::{check_tool, ExternalTool, ToolInfo};
pub use workspace::Workspace;

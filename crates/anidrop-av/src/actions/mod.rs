//! Container mux operations.
//!
//! Both operations are best-effort: they report what happened as an outcome
//! value and only return `Err` when the tool could not be launched at all or
//! the filesystem failed underneath them.

mod chapters;
mod signs;

pub use chapters::{merge_chapters, muxed_output_path, ChapterMerge};
pub use signs::{add_sign_track, extract_subtitle_track, mux_sign_track, SignMux, SignStage};

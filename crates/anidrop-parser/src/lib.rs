//! # anidrop-parser
//!
//! A small parser for anime release file names.
//!
//! Extracts the series title, season and episode numbers, resolution and
//! release group from names as produced by download tools and fansub groups.
//!
//! ## Quick Start
//!
//! ```
//! use anidrop_parser::parse;
//!
//! let release = parse("[SubsPlease] Sousou no Frieren - 12 (1080p) [ABCD1234].mkv");
//!
//! assert_eq!(release.title, "Sousou no Frieren");
//! assert_eq!(release.episode, Some(12));
//! assert_eq!(release.resolution.as_deref(), Some("1080p"));
//! assert_eq!(release.group.as_deref(), Some("SubsPlease"));
//! ```

pub mod lexer;
pub mod model;
mod parser;

pub use model::ParsedRelease;

/// Parse a release file name into structured metadata.
///
/// Parsing never fails; fields that cannot be found are left empty.
///
/// # Examples
///
/// ```
/// use anidrop_parser::parse;
///
/// let release = parse("Show.Name.S02E05.1080p.WEB.mkv");
/// assert_eq!(release.title, "Show Name");
/// assert_eq!(release.season, Some(2));
/// assert_eq!(release.episode, Some(5));
/// assert_eq!(release.extension.as_deref(), Some("mkv"));
/// ```
pub fn parse(input: &str) -> ParsedRelease {
    parser::parse(input)
}

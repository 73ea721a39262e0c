//! Canonical episode file names.
//!
//! `[CR] Title - S01E05 [1080p].mkv`: service prefix, a cleaned and
//! length-limited title, zero padded season and episode, resolution tag.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::pipeline::Service;

/// Default limit for the title part of a file name.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 25;

const ELLIPSIS: &str = "...";

/// Episode facts recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Cleaned title; `:` and `|` survive as segment separators.
    pub title: String,
    /// Two digit season number.
    pub season: String,
    /// Two digit episode number.
    pub episode: String,
    /// Resolution tag from the file name, if any.
    pub resolution: Option<String>,
}

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("valid bracket pattern"))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip bracketed segments and punctuation from a parsed title.
pub fn clean_title(raw: &str) -> String {
    let without_groups = bracketed().replace_all(raw, " ");
    let kept: String = without_groups
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == ':' || c == '|' {
                c
            } else {
                ' '
            }
        })
        .collect();

    collapse_whitespace(&kept)
}

/// Extract title, season, episode and resolution from a file name.
///
/// Returns `None` when no title can be recovered.
pub fn parse_episode_info(filename: &str) -> Option<EpisodeInfo> {
    let normalized = filename.replace('_', " ");
    let release = anidrop_parser::parse(&normalized);

    let title = clean_title(&release.title);
    if title.is_empty() {
        return None;
    }

    Some(EpisodeInfo {
        title,
        season: format!("{:02}", release.season.unwrap_or(1)),
        episode: format!("{:02}", release.episode.unwrap_or(1)),
        resolution: release.resolution,
    })
}

/// Limit a title to `max` characters.
///
/// Long titles are cut at the first `:` or `|`; if the first segment is
/// still too long it is truncated to `max - 3` characters plus `...`.
pub fn shorten_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }

    let first = title.split([':', '|']).next().unwrap_or(title).trim();
    if first.chars().count() <= max {
        return first.to_string();
    }

    let mut short: String = first.chars().take(max.saturating_sub(ELLIPSIS.len())).collect();
    short.push_str(ELLIPSIS);
    short
}

/// Remove the separators kept for shortening.
fn file_safe(title: &str) -> String {
    collapse_whitespace(&title.replace([':', '|'], " "))
}

/// File name prefix of a service.
pub fn service_prefix(service: Service) -> &'static str {
    match service {
        Service::Crunchy => "[CR]",
        Service::Hidive => "[HD]",
    }
}

/// Second lookup query: separators turned into spaces.
pub fn fallback_query(title: &str) -> String {
    collapse_whitespace(&title.replace(['-', ':', '|', '/', '~'], " "))
}

/// Build the canonical file name for an episode.
pub fn canonical_name(
    info: &EpisodeInfo,
    service: Service,
    max_title_length: usize,
    default_resolution: &str,
    extension: &str,
) -> String {
    format!(
        "{} {} - S{}E{} [{}].{}",
        service_prefix(service),
        file_safe(&shorten_title(&info.title, max_title_length)),
        info.season,
        info.episode,
        info.resolution.as_deref().unwrap_or(default_resolution),
        extension
    )
}

/// Canonical file name for `filename`, keeping its extension.
pub fn canonical_file_name(
    filename: &str,
    service: Service,
    max_title_length: usize,
    default_resolution: &str,
) -> Option<String> {
    let info = parse_episode_info(filename)?;
    let extension = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mkv".to_string());

    Some(canonical_name(
        &info,
        service,
        max_title_length,
        default_resolution,
        &extension,
    ))
}

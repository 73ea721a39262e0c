//! Release name parsing over the token stream.

mod episode;
mod title;

use crate::lexer::{lex, Token};
use crate::model::ParsedRelease;
use phf::phf_set;

/// Container extensions stripped before tokenizing.
static VIDEO_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "mkv", "mp4", "m4v", "avi", "webm", "mov", "ts", "m2ts", "wmv", "flv",
};

/// Split a known video extension off `input`.
pub(crate) fn split_extension(input: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = input.rsplit_once('.') {
        let lower = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(lower.as_str()) {
            return (stem, Some(lower));
        }
    }
    (input, None)
}

/// Normalise a resolution token: `1920x1080` becomes `1080p`, suffixes are
/// lowercased.
pub(crate) fn normalize_resolution(token: &str) -> String {
    match token.split_once(['x', 'X']) {
        Some((_, height)) => format!("{}p", height),
        None => token.to_ascii_lowercase(),
    }
}

pub(crate) fn parse(input: &str) -> ParsedRelease {
    let (stem, extension) = split_extension(input.trim());
    let lexemes = lex(stem);

    let group = title::leading_group(stem, &lexemes);
    let start = title::title_start(&lexemes);
    let numbering = episode::find_numbering(&lexemes, start);

    let title = start
        .filter(|s| numbering.start != Some(*s))
        .map(|s| title::extract_title(stem, &lexemes, s, numbering.start))
        .unwrap_or_default();

    let resolution = lexemes.iter().find_map(|l| match l.token {
        Token::Resolution(r) => Some(normalize_resolution(r)),
        _ => None,
    });

    ParsedRelease {
        title,
        season: numbering.season,
        episode: numbering.episode,
        resolution,
        group,
        extension,
    }
}

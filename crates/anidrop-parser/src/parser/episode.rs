//! Season and episode detection.

use crate::lexer::{Lexeme, Token};

/// Season/episode numbers and the token index where numbering starts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Numbering {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Index of the first numbering token; the title ends before it.
    pub start: Option<usize>,
}

impl Numbering {
    fn mark(&mut self, index: usize) {
        self.start = Some(self.start.map_or(index, |s| s.min(index)));
    }
}

/// Leading decimal digits of `s`.
pub(crate) fn leading_number(s: &str) -> Option<u32> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Split `S01E05`, `s1ep5` or `S02E11v2` into season and episode.
pub(crate) fn split_season_episode(s: &str) -> Option<(u32, u32)> {
    let lower = s.to_ascii_lowercase();
    let rest = lower.strip_prefix('s')?;
    let (season, episode) = rest.split_once('e')?;
    let episode = episode.strip_prefix('p').unwrap_or(episode);
    Some((leading_number(season)?, leading_number(episode)?))
}

/// Split `1x05` into season and episode.
fn split_x(s: &str) -> Option<(u32, u32)> {
    let (season, episode) = s.split_once('x')?;
    Some((season.parse().ok()?, episode.parse().ok()?))
}

fn next_number(lexemes: &[Lexeme<'_>], index: usize) -> Option<u32> {
    match lexemes.get(index + 1) {
        Some(Lexeme {
            token: Token::Number(n),
            depth: 0,
            ..
        }) => leading_number(n),
        _ => None,
    }
}

/// Find season and episode numbers outside bracket groups.
///
/// `title_start` is the index of the first title token; bare numbers are
/// only taken as episodes once at least one title token precedes them.
pub(crate) fn find_numbering(lexemes: &[Lexeme<'_>], title_start: Option<usize>) -> Numbering {
    let mut numbering = Numbering::default();

    for (i, lexeme) in lexemes.iter().enumerate() {
        if lexeme.in_brackets() || title_start.is_some_and(|start| i < start) {
            continue;
        }

        match &lexeme.token {
            Token::SeasonEpisode(s) => {
                if let Some((season, episode)) = split_season_episode(s) {
                    numbering.season = Some(season);
                    numbering.episode = Some(episode);
                    numbering.mark(i);
                    break;
                }
            }
            Token::SeasonEpisodeX(s) => {
                if let Some((season, episode)) = split_x(s) {
                    numbering.season = Some(season);
                    numbering.episode = Some(episode);
                    numbering.mark(i);
                    break;
                }
            }
            Token::SeasonOnly(s) if numbering.season.is_none() => {
                numbering.season = leading_number(&s[1..]);
                numbering.mark(i);
            }
            Token::SeasonWord(_) if numbering.season.is_none() => {
                if let Some(season) = next_number(lexemes, i) {
                    numbering.season = Some(season);
                    numbering.mark(i);
                }
            }
            Token::Ordinal(s) if numbering.season.is_none() => {
                if matches!(
                    lexemes.get(i + 1).map(|l| &l.token),
                    Some(Token::SeasonWord(_))
                ) {
                    numbering.season = leading_number(s);
                    numbering.mark(i);
                }
            }
            Token::EpNumber(s) => {
                numbering.episode = leading_number(&s[2..]);
                numbering.mark(i);
                break;
            }
            Token::EpisodeWord(_) => {
                if let Some(episode) = next_number(lexemes, i) {
                    numbering.episode = Some(episode);
                    numbering.mark(i);
                    break;
                }
            }
            // "Title - 05"
            Token::Hyphen if lexeme.spaced_before && title_start.is_some_and(|s| i > s) => {
                if let Some(episode) = next_number(lexemes, i) {
                    numbering.episode = Some(episode);
                    numbering.mark(i);
                    break;
                }
            }
            _ => {}
        }
    }

    if numbering.episode.is_none() {
        if let Some((i, episode)) = trailing_episode(lexemes, title_start) {
            numbering.episode = Some(episode);
            numbering.mark(i);
        }
    }

    numbering
}

/// The last bare number of at most three digits following the title, as in
/// "Title 05 [1080p]".
fn trailing_episode(lexemes: &[Lexeme<'_>], title_start: Option<usize>) -> Option<(usize, u32)> {
    let start = title_start?;

    lexemes
        .iter()
        .enumerate()
        .skip(start + 1)
        .filter(|(_, l)| !l.in_brackets())
        .filter_map(|(i, l)| match l.token {
            Token::Number(n) => {
                let digits = n.split('v').next().unwrap_or(n);
                if digits.len() <= 3 {
                    leading_number(digits).map(|e| (i, e))
                } else {
                    None
                }
            }
            _ => None,
        })
        .last()
}

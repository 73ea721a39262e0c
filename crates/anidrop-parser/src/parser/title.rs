//! Title and release group extraction.

use crate::lexer::{Lexeme, Token};

/// Index of the first token that can begin a title: outside brackets and
/// not a delimiter.
pub(crate) fn title_start(lexemes: &[Lexeme<'_>]) -> Option<usize> {
    lexemes.iter().position(|l| {
        !l.in_brackets() && !l.token.is_open() && !l.token.is_close() && !l.token.is_delimiter()
    })
}

/// Index one past the last title token.
///
/// The title runs until numbering starts, a bracket group opens, or a
/// resolution tag appears.
fn title_end(lexemes: &[Lexeme<'_>], start: usize, numbering: Option<usize>) -> usize {
    let limit = numbering.unwrap_or(lexemes.len()).max(start + 1);

    lexemes
        .iter()
        .enumerate()
        .skip(start + 1)
        .take_while(|(i, _)| *i < limit)
        .find(|(_, l)| {
            !l.in_brackets() && (l.token.is_open() || matches!(l.token, Token::Resolution(_)))
        })
        .map_or(limit.min(lexemes.len()), |(i, _)| i)
}

/// Slice the title out of `input`, keeping punctuation the lexer skipped.
pub(crate) fn extract_title(
    input: &str,
    lexemes: &[Lexeme<'_>],
    start: usize,
    numbering: Option<usize>,
) -> String {
    let end = title_end(lexemes, start, numbering);

    let from = lexemes[start].span.start;
    let to = lexemes.get(end).map_or(input.len(), |l| l.span.start);

    let raw = input[from..to]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '.' | '_'))
        .replace('_', " ");

    let spaced = if raw.contains(char::is_whitespace) {
        raw
    } else {
        raw.replace('.', " ")
    };

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Release group from a leading `[Group]` tag.
///
/// A leading bracket holding a resolution is metadata, not a group.
pub(crate) fn leading_group(input: &str, lexemes: &[Lexeme<'_>]) -> Option<String> {
    let open = lexemes.first()?;
    if open.token != Token::BracketOpen {
        return None;
    }

    let close = lexemes
        .iter()
        .skip(1)
        .position(|l| l.depth == 0 && l.token.is_close())?
        + 1;

    if lexemes[1..close]
        .iter()
        .any(|l| matches!(l.token, Token::Resolution(_)))
    {
        return None;
    }

    let group = input[open.span.end..lexemes[close].span.start].trim();
    (!group.is_empty()).then(|| group.to_string())
}

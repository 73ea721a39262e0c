//! Token types for the Logos-based lexer.

use logos::Logos;

/// Token types recognized by the lexer.
///
/// Underscores are treated like whitespace. Characters no pattern accepts
/// (`:`, `!`, non-ASCII letters, ...) produce lexer errors that callers skip;
/// the text they belong to is recovered from spans.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t_]+")]
pub enum Token<'src> {
    /// Season and episode identifier (e.g., S01E05, S1E1, S01EP05, S01E05v2)
    #[regex(r"(?i)S[0-9]{1,4}E[Pp]?[0-9]{1,4}(?:v[0-9]+)?", priority = 10)]
    SeasonEpisode(&'src str),

    /// Season x episode format (e.g., 1x05, 02x11)
    #[regex(r"[0-9]{1,2}x[0-9]{1,3}", priority = 9)]
    SeasonEpisodeX(&'src str),

    /// Season-only identifier (e.g., S01, S2)
    #[regex(r"(?i)S[0-9]{1,2}", priority = 8)]
    SeasonOnly(&'src str),

    /// Spelled-out "Season" keyword
    #[regex(r"(?i)Season", priority = 7)]
    SeasonWord(&'src str),

    /// Ordinal number, as in "2nd Season"
    #[regex(r"(?i)(1st|2nd|3rd|[0-9]{1,2}th)", priority = 7)]
    Ordinal(&'src str),

    /// Spelled-out "Episode" or "Ep" keyword
    #[regex(r"(?i)(Episode|Ep)", priority = 7)]
    EpisodeWord(&'src str),

    /// Abbreviated episode number (e.g., Ep06, EP12)
    #[regex(r"(?i)Ep[0-9]{1,4}", priority = 9)]
    EpNumber(&'src str),

    /// Video resolution (e.g., 2160p, 1080p, 720p, 1920x1080)
    #[regex(
        r"(?i)((2160|1440|1080|720|576|480|360)[pi]|3840x2160|1920x1080|1280x720)",
        priority = 10
    )]
    Resolution(&'src str),

    /// Dot delimiter
    #[token(".")]
    Dot,

    /// Hyphen delimiter
    #[token("-")]
    Hyphen,

    /// Opening square bracket
    #[token("[")]
    BracketOpen,

    /// Closing square bracket
    #[token("]")]
    BracketClose,

    /// Opening parenthesis
    #[token("(")]
    ParenOpen,

    /// Closing parenthesis
    #[token(")")]
    ParenClose,

    /// Generic word token (lower priority than specific patterns)
    #[regex(r"[a-zA-Z][a-zA-Z0-9'&]*", priority = 1)]
    Word(&'src str),

    /// Numeric token, optionally versioned (e.g., 05, 12v2)
    #[regex(r"[0-9]+(?:v[0-9])?", priority = 2)]
    Number(&'src str),
}

impl Token<'_> {
    /// Whether the token opens a bracket group.
    pub fn is_open(&self) -> bool {
        matches!(self, Token::BracketOpen | Token::ParenOpen)
    }

    /// Whether the token closes a bracket group.
    pub fn is_close(&self) -> bool {
        matches!(self, Token::BracketClose | Token::ParenClose)
    }

    /// Whether the token is a delimiter.
    pub fn is_delimiter(&self) -> bool {
        matches!(self, Token::Dot | Token::Hyphen)
    }
}

//! Release-name tokenizer.
//!
//! Tokens come from a [logos](https://docs.rs/logos) lexer; this module adds
//! the bracket depth and spacing information the title and episode parsers
//! need.

mod token;
pub use token::Token;

use logos::Logos;
use std::ops::Range;

/// Byte offsets `[start, end)` of a token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The text this span covers.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A token together with its position and surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'src> {
    /// The classified token.
    pub token: Token<'src>,
    /// Byte span in the original input.
    pub span: Span,
    /// Bracket nesting depth; bracket tokens carry the depth outside them.
    pub depth: usize,
    /// Whether whitespace (or an underscore) precedes the token.
    pub spaced_before: bool,
}

impl Lexeme<'_> {
    /// Whether this token sits inside a bracket group.
    pub fn in_brackets(&self) -> bool {
        self.depth > 0
    }
}

/// Tokenize `input`, dropping characters no token pattern accepts.
pub fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut depth = 0usize;

    for (result, range) in Token::lexer(input).spanned() {
        let Ok(token) = result else {
            continue;
        };

        let spaced_before = input[..range.start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace() || c == '_');

        let token_depth = if token.is_close() {
            depth = depth.saturating_sub(1);
            depth
        } else {
            depth
        };
        if token.is_open() {
            depth += 1;
        }

        lexemes.push(Lexeme {
            token,
            span: Span::from(range),
            depth: token_depth,
            spaced_before,
        });
    }

    lexemes
}

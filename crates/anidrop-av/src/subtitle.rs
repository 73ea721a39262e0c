//! ASS subtitle sign-cue filtering.
//!
//! Release subtitle tracks mix spoken dialogue with on-screen "sign"
//! translations. This module keeps only the sign cues so they can be muxed as
//! a separate, default-enabled track.

/// Column schema written for the `[Events]` section of a filtered track.
pub const EVENTS_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Predicate set deciding which dialogue cues are signs.
#[derive(Debug, Clone)]
pub struct SignFilter {
    /// Substrings matched against the cue's style name.
    pub styles: Vec<String>,
    /// Override tags matched against the effect and text fields.
    pub tokens: Vec<String>,
    /// Substring matched against the actor (name) field.
    pub actor: String,
}

impl Default for SignFilter {
    fn default() -> Self {
        Self {
            styles: vec!["BW Phone Bubble".to_string(), "Text Date".to_string()],
            tokens: vec![
                "\\an".to_string(),
                "\\fad".to_string(),
                "\\pos".to_string(),
                "\\fs".to_string(),
            ],
            actor: "Sign".to_string(),
        }
    }
}

/// Which predicate selected a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMatch {
    Style,
    Override,
    Actor,
}

/// The fields of a `Dialogue:` line the filter looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue<'a> {
    pub style: &'a str,
    pub name: &'a str,
    pub effect: &'a str,
    pub text: &'a str,
}

impl<'a> Cue<'a> {
    /// Parse a `Dialogue:` event line.
    ///
    /// Returns `None` for other lines and for dialogue lines with fewer than
    /// ten fields. The text field keeps any commas it contains.
    pub fn parse(line: &'a str) -> Option<Self> {
        if !line.starts_with("Dialogue:") {
            return None;
        }

        let parts: Vec<&str> = line.splitn(10, ',').collect();
        if parts.len() < 10 {
            return None;
        }

        Some(Self {
            style: parts[3].trim(),
            name: parts[4].trim(),
            effect: parts[8].trim(),
            text: parts[9].trim(),
        })
    }
}

/// Result of filtering a subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignTrack {
    /// The rebuilt subtitle file.
    pub content: String,
    /// Number of sign cues kept.
    pub cues: usize,
}

impl SignTrack {
    /// Whether no sign cue survived (nothing worth muxing).
    pub fn is_empty(&self) -> bool {
        self.cues == 0
    }
}

impl SignFilter {
    /// Decide whether a cue is a sign, reporting the first matching predicate.
    pub fn classify(&self, cue: &Cue<'_>) -> Option<SignMatch> {
        if self.styles.iter().any(|s| cue.style.contains(s.as_str())) {
            return Some(SignMatch::Style);
        }

        if self
            .tokens
            .iter()
            .any(|t| cue.effect.contains(t.as_str()) || cue.text.contains(t.as_str()))
        {
            return Some(SignMatch::Override);
        }

        if !self.actor.is_empty() && cue.name.contains(self.actor.as_str()) {
            return Some(SignMatch::Actor);
        }

        None
    }

    /// Rebuild an ASS file keeping only sign cues.
    ///
    /// Lines outside `[Events]` are copied unchanged and in order. Inside
    /// `[Events]` the format line is replaced by [`EVENTS_FORMAT`] and only
    /// dialogue lines selected by [`classify`](Self::classify) remain.
    pub fn filter(&self, content: &str) -> SignTrack {
        let mut out: Vec<&str> = Vec::new();
        let mut in_events = false;
        let mut cues = 0;

        for raw in content.lines() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.starts_with('[') {
                in_events = trimmed.eq_ignore_ascii_case("[Events]");
                out.push(trimmed);
                if in_events {
                    out.push(EVENTS_FORMAT);
                }
                continue;
            }

            if !in_events {
                out.push(line);
                continue;
            }

            if let Some(cue) = Cue::parse(trimmed) {
                if let Some(_reason) = self.classify(&cue) {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("Keeping sign cue ({:?}): {}", _reason, trimmed);
                    out.push(trimmed);
                    cues += 1;
                }
            }
        }

        let mut content = out.join("\n");
        content.push('\n');

        SignTrack { content, cues }
    }
}

/// Filter sign cues with the default predicate set.
pub fn filter_sign_cues(content: &str) -> SignTrack {
    SignFilter::default().filter(content)
}

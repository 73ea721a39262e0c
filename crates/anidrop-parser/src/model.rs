//! Parsed release data.

use std::fmt;

/// Structured metadata extracted from a release file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedRelease {
    /// Series title, with the original punctuation kept.
    pub title: String,
    /// Season number, if the name carries one.
    pub season: Option<u32>,
    /// Episode number, if the name carries one.
    pub episode: Option<u32>,
    /// Normalised resolution tag (e.g. `1080p`).
    pub resolution: Option<String>,
    /// Release group from a leading `[Group]` tag.
    pub group: Option<String>,
    /// Container extension, lowercased, without the dot.
    pub extension: Option<String>,
}

impl ParsedRelease {
    /// Whether a title was found.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

impl fmt::Display for ParsedRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        match (self.season, self.episode) {
            (Some(s), Some(e)) => write!(f, " S{:02}E{:02}", s, e)?,
            (None, Some(e)) => write!(f, " - {:02}", e)?,
            (Some(s), None) => write!(f, " S{:02}", s)?,
            (None, None) => {}
        }
        if let Some(resolution) = &self.resolution {
            write!(f, " [{}]", resolution)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_release() {
        let release = ParsedRelease {
            title: "Frieren".to_string(),
            season: Some(1),
            episode: Some(12),
            resolution: Some("1080p".to_string()),
            ..Default::default()
        };
        assert_eq!(release.to_string(), "Frieren S01E12 [1080p]");

        let release = ParsedRelease {
            title: "Frieren".to_string(),
            episode: Some(3),
            ..Default::default()
        };
        assert_eq!(release.to_string(), "Frieren - 03");
    }
}

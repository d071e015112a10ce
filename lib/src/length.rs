//! Story length presets and their prompt-facing bands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target story length selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    /// 3-5 sentences, 100-200 words
    Short,
    /// 6-10 sentences, 200-400 words
    #[default]
    Medium,
    /// 10-15 sentences, 400-800 words
    Long,
}

impl StoryLength {
    /// The sentence/word targets and token budget communicated to the
    /// generation collaborator.
    pub fn band(&self) -> LengthBand {
        match self {
            StoryLength::Short => LengthBand {
                sentences: "3-5 sentences",
                words: "100-200 words",
                max_tokens: 300,
            },
            StoryLength::Medium => LengthBand {
                sentences: "6-10 sentences",
                words: "200-400 words",
                max_tokens: 600,
            },
            StoryLength::Long => LengthBand {
                sentences: "10-15 sentences",
                words: "400-800 words",
                max_tokens: 1200,
            },
        }
    }
}

impl fmt::Display for StoryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryLength::Short => write!(f, "short"),
            StoryLength::Medium => write!(f, "medium"),
            StoryLength::Long => write!(f, "long"),
        }
    }
}

impl FromStr for StoryLength {
    type Err = String;

    /// Unrecognized values fall back to `Medium`, matching the tolerant
    /// handling of the host application.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(StoryLength::Short),
            "medium" | "" => Ok(StoryLength::Medium),
            "long" => Ok(StoryLength::Long),
            other => Err(format!("unknown story length: {other}")),
        }
    }
}

/// Length targets handed to the generation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBand {
    /// Target sentence count, e.g. "3-5 sentences"
    pub sentences: &'static str,
    /// Target word count, e.g. "100-200 words"
    pub words: &'static str,
    /// Token budget for the provider call
    pub max_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("short".parse::<StoryLength>().unwrap(), StoryLength::Short);
        assert_eq!("LONG".parse::<StoryLength>().unwrap(), StoryLength::Long);
        assert!("epic".parse::<StoryLength>().is_err());
    }

    #[test]
    fn test_bands() {
        assert_eq!(StoryLength::Short.band().max_tokens, 300);
        assert_eq!(StoryLength::Medium.band().sentences, "6-10 sentences");
        assert_eq!(StoryLength::Long.band().words, "400-800 words");
    }

    #[test]
    fn test_display_round_trip() {
        for length in [StoryLength::Short, StoryLength::Medium, StoryLength::Long] {
            assert_eq!(length.to_string().parse::<StoryLength>().unwrap(), length);
        }
    }
}

//! Acceptance policy for generated stories.
//!
//! The scorer is deterministic and pure: tokenize, apply three checks
//! (minimum length, allowed-vocabulary rate, filler-word rate), and return a
//! verdict. On rejection the critique is a single fixed string regardless of
//! which check failed.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grammar and function words that are always exempt from vocabulary scoring:
/// articles, pronouns, auxiliary verbs, and common conjunctions/prepositions.
pub const ESSENTIAL_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "can", "could", "should", "may", "might", "must", "shall", "and", "or", "but",
    "so", "if", "when", "where", "what", "who", "how", "why", "in", "on", "at", "by", "for",
    "with", "to", "from", "about", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her",
    "us", "them", "my", "your", "his", "its", "our", "their", "this", "that", "these", "those",
    "here", "there", "now", "then",
];

static ESSENTIAL_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ESSENTIAL_WORDS.iter().copied().collect());

/// The fixed critique fed back into revision when a story is rejected.
pub const CRITIQUE: &str =
    "Increase allowed vocabulary usage to >=60%, avoid generic words, and ensure coherent flow.";

/// The filler word whose overuse marks generic, low-information prose.
const FILLER_WORD: &str = "thing";

/// Check whether a word is in the essential-grammar exemption set.
pub fn is_essential(word: &str) -> bool {
    ESSENTIAL_SET.contains(word)
}

/// Split text into lowercase alphabetic words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Fraction of content words (non-essential tokens) drawn from `allowed`.
///
/// Returns 1.0 when there are no content words or no restriction, so an
/// unrestricted story is vacuously compliant.
pub fn vocabulary_usage_rate(tokens: &[String], allowed: &HashSet<String>) -> f64 {
    if allowed.is_empty() {
        return 1.0;
    }
    let content: Vec<&String> = tokens.iter().filter(|w| !is_essential(w)).collect();
    if content.is_empty() {
        return 1.0;
    }
    let hits = content.iter().filter(|w| allowed.contains(w.as_str())).count();
    hits as f64 / content.len() as f64
}

/// Outcome of scoring a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the story passes the policy
    pub accepted: bool,
    /// Feedback for revision; `None` exactly when accepted
    pub critique: Option<String>,
}

impl Verdict {
    fn accept() -> Self {
        Self {
            accepted: true,
            critique: None,
        }
    }

    fn reject() -> Self {
        Self {
            accepted: false,
            critique: Some(CRITIQUE.to_string()),
        }
    }
}

/// Deterministic accept/reject policy for story drafts.
#[derive(Debug, Clone)]
pub struct VocabularyScorer {
    /// Minimum token count for a complete story
    pub min_tokens: usize,
    /// Minimum fraction of content words drawn from the allowed set
    pub min_vocabulary_rate: f64,
    /// Maximum fraction of tokens that may be the filler word
    pub max_filler_rate: f64,
}

impl Default for VocabularyScorer {
    fn default() -> Self {
        Self {
            min_tokens: 80,
            min_vocabulary_rate: 0.6,
            max_filler_rate: 0.05,
        }
    }
}

impl VocabularyScorer {
    /// Create a scorer with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a story against the policy.
    ///
    /// `allowed` is the bounded word set for vocabulary-restricted runs;
    /// pass an empty slice for unrestricted generation, which skips the
    /// rate check entirely.
    pub fn evaluate(&self, story: &str, allowed: &[String]) -> Verdict {
        let tokens = tokenize(story);

        if tokens.len() < self.min_tokens {
            return Verdict::reject();
        }

        if !allowed.is_empty() {
            let allowed_set: HashSet<String> =
                allowed.iter().map(|w| w.to_lowercase()).collect();
            if vocabulary_usage_rate(&tokens, &allowed_set) < self.min_vocabulary_rate {
                return Verdict::reject();
            }
        }

        let filler_count = tokens.iter().filter(|w| *w == FILLER_WORD).count();
        if filler_count as f64 > tokens.len() as f64 * self.max_filler_rate {
            return Verdict::reject();
        }

        Verdict::accept()
    }
}

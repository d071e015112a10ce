//! The result record returned to the caller.

use crate::flow::FlowState;
use crate::generate::split_keywords;
use crate::id::FlowId;
use serde::{Deserialize, Serialize};

/// Final outcome of a flow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryResult {
    /// Identifier of the run that produced this result
    pub id: FlowId,
    /// The final story, accepted or best-effort
    pub story: String,
    /// Whether the story passed the acceptance policy
    pub accepted: bool,
    /// Revision passes performed
    pub attempts: u32,
    /// Whitespace-separated word count of the story
    pub word_count: usize,
    /// Input keywords found verbatim (case-insensitively) in the story
    pub keywords_used: Vec<String>,
    /// `keywords_used` over total input keywords; 0 when no keywords
    pub keyword_usage_rate: f64,
    /// Whether a vocabulary restriction was in force
    pub vocabulary_restricted: bool,
    /// Size of the allowed vocabulary used
    pub vocabulary_count: usize,
    /// Context passages retrieved for generation
    pub context_documents_count: usize,
    /// Which generation path produced the story ("error" on generation failure)
    pub generation_method: String,
    /// Full timestamped trace of the run
    pub log: Vec<String>,
}

impl StoryResult {
    /// Extract the result from a terminal flow state.
    pub(crate) fn from_state(state: FlowState) -> Self {
        let (keywords_used, keyword_usage_rate) = keyword_usage(&state.keywords, &state.story);

        Self {
            id: state.id,
            word_count: state.story.split_whitespace().count(),
            keywords_used,
            keyword_usage_rate,
            story: state.story,
            accepted: state.accepted,
            attempts: state.attempts,
            vocabulary_restricted: state.vocabulary_restricted,
            vocabulary_count: state.allowed_vocabulary.len(),
            context_documents_count: state.context_documents.len(),
            generation_method: state.generation_method,
            log: state.log.into_entries(),
        }
    }
}

/// Which input keywords appear in the story, and the usage rate.
///
/// Matching is case-insensitive substring containment, so inflected forms
/// ("forests") still count for their keyword.
pub fn keyword_usage(keywords: &str, story: &str) -> (Vec<String>, f64) {
    let keyword_list = split_keywords(keywords);
    if keyword_list.is_empty() {
        return (Vec::new(), 0.0);
    }

    let story_lower = story.to_lowercase();
    let used: Vec<String> = keyword_list
        .iter()
        .filter(|k| story_lower.contains(&k.to_lowercase()))
        .cloned()
        .collect();

    let rate = used.len() as f64 / keyword_list.len() as f64;
    (used, rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_usage_accounting() {
        let story = "The Forest was dark, and a dragon slept within it.";
        let (used, rate) = keyword_usage("forest, magic, dragon", story);

        assert_eq!(used, vec!["forest", "dragon"]);
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_usage_empty_input() {
        let (used, rate) = keyword_usage("  , ", "Some story.");
        assert!(used.is_empty());
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_keyword_usage_all_present() {
        let (used, rate) = keyword_usage("ocean, sailor", "An OCEAN and a sailor.");
        assert_eq!(used.len(), 2);
        assert_eq!(rate, 1.0);
    }
}

//! Text generation collaborator trait and request type.
//!
//! The flow hands the generator a fully typed request; any prompt assembly
//! or response cleanup a concrete provider needs lives behind this boundary,
//! not in the flow logic.

pub mod openai;

use crate::error::LlmResult;
use crate::length::StoryLength;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Typed request handed to a [`TextGenerator`].
///
/// Primary keywords must appear prominently in the output per the prompt
/// contract; that requirement is communicated to the model here and verified
/// later by the scorer, never structurally by the generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The first (at most) three keywords; central to the plot
    pub primary_keywords: Vec<String>,
    /// Remaining keywords; included when possible
    pub secondary_keywords: Vec<String>,
    /// Truncated context passages, newline-joined
    pub context_text: String,
    /// Vocabulary restriction block; empty means free-form generation
    pub vocabulary_instruction: String,
    /// Target length band
    pub length: StoryLength,
}

impl GenerationRequest {
    /// Create a request from an already split keyword list.
    pub fn new(primary: Vec<String>, secondary: Vec<String>, length: StoryLength) -> Self {
        Self {
            primary_keywords: primary,
            secondary_keywords: secondary,
            length,
            ..Default::default()
        }
    }

    /// Set the context text.
    pub fn with_context(mut self, context_text: impl Into<String>) -> Self {
        self.context_text = context_text.into();
        self
    }

    /// Set the vocabulary instruction block.
    pub fn with_vocabulary_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.vocabulary_instruction = instruction.into();
        self
    }

    /// Whether this request carries a vocabulary restriction.
    pub fn is_restricted(&self) -> bool {
        !self.vocabulary_instruction.is_empty()
    }
}

/// The text-generation capability the flow calls out to.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a story for the given request.
    async fn generate_text(&self, request: &GenerationRequest) -> LlmResult<String>;

    /// Name of this generator, recorded as the result's generation method.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new(
            vec!["forest".to_string()],
            vec!["dragon".to_string()],
            StoryLength::Short,
        )
        .with_context("A deep wood.")
        .with_vocabulary_instruction("Use only these words: forest, magic");

        assert_eq!(request.primary_keywords, vec!["forest"]);
        assert_eq!(request.context_text, "A deep wood.");
        assert!(request.is_restricted());
    }

    #[test]
    fn test_unrestricted_by_default() {
        let request = GenerationRequest::default();
        assert!(!request.is_restricted());
    }
}

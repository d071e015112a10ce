//! Prompt builders for the story generator.
//!
//! These produce the text handed to the generation collaborator. The flow
//! itself never parses model output; everything quality-related is enforced
//! by the scorer after the fact.

use crate::llm::GenerationRequest;
use crate::scorer::ESSENTIAL_WORDS;

/// How many allowed words are shown in the prompt. The full set is enforced
/// at evaluation time; the prompt only carries a sample.
pub const VOCABULARY_SAMPLE_SIZE: usize = 100;

/// Build the system prompt for story generation.
pub fn build_system_prompt(restricted: bool) -> String {
    if restricted {
        "You are a story writer who MUST follow vocabulary restrictions EXACTLY. \
         When given a vocabulary list, you can ONLY use words from that list plus \
         basic grammar words (a, an, the, is, are, was, were, etc.). If you cannot \
         express something with the allowed words, you MUST rephrase or find \
         alternatives from the vocabulary list. This is a strict vocabulary exercise."
            .to_string()
    } else {
        "You are a story writer. Write engaging, grammatically correct stories \
         that flow naturally from sentence to sentence."
            .to_string()
    }
}

/// Build the vocabulary restriction block shown to the model.
///
/// Returns an empty string when there is no restriction, which signals
/// free-form generation.
pub fn vocabulary_instruction(allowed: &[String]) -> String {
    if allowed.is_empty() {
        return String::new();
    }

    let sample: Vec<&str> = allowed
        .iter()
        .take(VOCABULARY_SAMPLE_SIZE)
        .map(String::as_str)
        .collect();

    format!(
        r#"**CRITICAL VOCABULARY RESTRICTION - YOU MUST FOLLOW THIS EXACTLY:**

**ONLY USE THESE WORDS:**
1. Allowed Vocabulary: {vocabulary}
2. Essential Grammar Words: {essential}

**STRICT RULES:**
- DO NOT use ANY words outside these two lists
- If you need a word not in the lists, find an alternative from the allowed vocabulary
- Rephrase sentences to use only allowed words
- Every single word must be from the allowed lists

**PRIORITY: Use allowed vocabulary words as much as possible!**
"#,
        vocabulary = sample.join(", "),
        essential = ESSENTIAL_WORDS.join(", "),
    )
}

/// Build the main story prompt from a typed request.
pub fn build_story_prompt(request: &GenerationRequest) -> String {
    let band = request.length.band();

    let secondary = if request.secondary_keywords.is_empty() {
        "None".to_string()
    } else {
        request.secondary_keywords.join(", ")
    };

    let context = if request.context_text.is_empty() {
        "Use creativity to build context around the keywords.".to_string()
    } else {
        request.context_text.clone()
    };

    format!(
        r#"Create an engaging English story using these requirements:

**PRIMARY KEYWORDS (MUST include all):** {primary}
**SECONDARY KEYWORDS (include if possible):** {secondary}

**STORY LENGTH:** {sentences} ({words})

**CONTEXT INFORMATION:**
{context}

{vocabulary_instruction}
**STORY REQUIREMENTS:**
- Write EXACTLY {sentences} with approximately {words}
- Create a complete story with clear beginning, middle, and end
- FOCUS heavily on the primary keywords, making them central to the plot
- Use vivid descriptions and engaging narrative
- Every sentence must be grammatically perfect and meaningful
- Connect ideas smoothly and ensure the story flows naturally

Write the story now:"#,
        primary = request.primary_keywords.join(", "),
        secondary = secondary,
        sentences = band.sentences,
        words = band.words,
        context = context,
        vocabulary_instruction = request.vocabulary_instruction,
    )
}

/// Build the context block for a revision pass: the prior story plus the
/// critique, handed back as context for full regeneration.
pub fn revision_context(story: &str, critique: &str) -> Vec<String> {
    vec![
        story.to_string(),
        format!("Critique for revision: {critique}"),
    ]
}

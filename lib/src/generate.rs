//! Generation adapter: turns flow state into typed generation requests and
//! applies a small internal retry against raw draft quality.
//!
//! The outer revise loop (see `flow`) enforces the acceptance policy; the
//! retry here only guards against transport failures and obviously broken
//! drafts (too short, filler-heavy, or ignoring the vocabulary). Across
//! retries the draft with the highest allowed-vocabulary usage is retained
//! as a best-effort fallback.

use crate::error::{GenerationError, GenerationResult, LlmError};
use crate::flow::FlowLog;
use crate::length::StoryLength;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::prompts;
use crate::scorer::{tokenize, vocabulary_usage_rate};
use std::collections::HashSet;
use std::sync::Arc;

/// How many keywords count as primary.
const PRIMARY_KEYWORD_COUNT: usize = 3;
/// Context documents passed to the generator, at most.
const MAX_CONTEXT_DOCUMENTS: usize = 3;
/// Per-document character cap before joining.
const MAX_DOCUMENT_CHARS: usize = 200;

/// A draft produced by the adapter.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    /// The draft text
    pub story: String,
    /// Which generation path produced it (the generator's name)
    pub method: String,
}

/// Drives the text-generation collaborator with length- and
/// vocabulary-aware requests.
pub struct GenerationAdapter {
    generator: Arc<dyn TextGenerator>,
    max_attempts: u32,
    min_words: usize,
    max_filler_rate: f64,
    min_vocabulary_rate: f64,
}

impl GenerationAdapter {
    /// Create an adapter over the given generator with default retry
    /// thresholds.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_attempts: 3,
            min_words: 50,
            max_filler_rate: 0.10,
            min_vocabulary_rate: 0.40,
        }
    }

    /// Name of the underlying generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Generate a first draft.
    pub async fn generate(
        &self,
        keywords: &str,
        context: &[String],
        length: StoryLength,
        allowed: &[String],
        log: &mut FlowLog,
    ) -> GenerationResult<GeneratedStory> {
        let keyword_list = split_keywords(keywords);
        let (primary, secondary) = split_primary(&keyword_list);

        let request = GenerationRequest::new(primary, secondary, length)
            .with_context(limit_context(context))
            .with_vocabulary_instruction(prompts::vocabulary_instruction(allowed));

        self.generate_with_retry(&request, allowed, log).await
    }

    /// Regenerate conditioned on the prior story and critique.
    ///
    /// This is a full regeneration, not a patch: the prior draft and the
    /// critique are passed as context and no keywords are supplied.
    pub async fn revise(
        &self,
        story: &str,
        critique: &str,
        length: StoryLength,
        allowed: &[String],
        log: &mut FlowLog,
    ) -> GenerationResult<GeneratedStory> {
        let context = prompts::revision_context(story, critique);

        let request = GenerationRequest::new(Vec::new(), Vec::new(), length)
            .with_context(limit_context(&context))
            .with_vocabulary_instruction(prompts::vocabulary_instruction(allowed));

        self.generate_with_retry(&request, allowed, log).await
    }

    async fn generate_with_retry(
        &self,
        request: &GenerationRequest,
        allowed: &[String],
        log: &mut FlowLog,
    ) -> GenerationResult<GeneratedStory> {
        let allowed_set: HashSet<String> = allowed.iter().map(|w| w.to_lowercase()).collect();
        let mut best: Option<(f64, String)> = None;
        let mut last_error: Option<LlmError> = None;

        for attempt in 1..=self.max_attempts {
            let raw = match self.generator.generate_text(request).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generation attempt failed");
                    log.push(format!("Generate: attempt {attempt} failed ({e})"));
                    last_error = Some(e);
                    continue;
                }
            };

            let story = raw.trim().to_string();
            if story.is_empty() {
                log.push(format!("Generate: attempt {attempt} returned empty output"));
                continue;
            }

            let tokens = tokenize(&story);
            let rate = vocabulary_usage_rate(&tokens, &allowed_set);
            if best.as_ref().is_none_or(|(r, _)| rate > *r) {
                best = Some((rate, story.clone()));
            }

            if let Some(issue) = self.quality_issue(&tokens, rate, !allowed_set.is_empty()) {
                tracing::debug!(attempt, issue, "draft rejected, retrying");
                log.push(format!("Generate: attempt {attempt} rejected ({issue}), retrying"));
                continue;
            }

            log.push(format!("Generate: ok (attempt {attempt})"));
            return Ok(GeneratedStory {
                story,
                method: self.generator.name().to_string(),
            });
        }

        // No attempt cleared every threshold; fall back to the best draft
        // when one exists, otherwise surface the failure.
        if let Some((rate, story)) = best {
            log.push(format!(
                "Generate: returning best-effort draft (vocabulary rate {:.0}%)",
                rate * 100.0
            ));
            return Ok(GeneratedStory {
                story,
                method: self.generator.name().to_string(),
            });
        }

        match last_error {
            Some(source) => Err(GenerationError::Provider {
                generator: self.generator.name().to_string(),
                source,
            }),
            None => Err(GenerationError::EmptyOutput {
                generator: self.generator.name().to_string(),
            }),
        }
    }

    /// Check a draft against the raw-quality gates. Returns the reason the
    /// draft should be retried, or `None` when it is usable.
    fn quality_issue(
        &self,
        tokens: &[String],
        vocabulary_rate: f64,
        restricted: bool,
    ) -> Option<&'static str> {
        if tokens.len() < self.min_words {
            return Some("too short");
        }

        let limit = tokens.len() as f64 * self.max_filler_rate;
        for filler in ["thing", "something"] {
            let count = tokens.iter().filter(|w| *w == filler).count();
            if count as f64 > limit {
                return Some("filler words over limit");
            }
        }

        if restricted && vocabulary_rate < self.min_vocabulary_rate {
            return Some("low vocabulary usage");
        }

        None
    }
}

/// Split a comma-separated keyword string into trimmed, non-empty terms.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Split keywords into primary (first three) and secondary (remainder).
fn split_primary(keywords: &[String]) -> (Vec<String>, Vec<String>) {
    let primary = keywords.iter().take(PRIMARY_KEYWORD_COUNT).cloned().collect();
    let secondary = keywords.iter().skip(PRIMARY_KEYWORD_COUNT).cloned().collect();
    (primary, secondary)
}

/// Cap context to the first documents, each truncated, newline-joined.
fn limit_context(context: &[String]) -> String {
    context
        .iter()
        .take(MAX_CONTEXT_DOCUMENTS)
        .map(|doc| truncate_chars(doc, MAX_DOCUMENT_CHARS))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max` characters on a char boundary, marking the cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generator that replays a scripted sequence of outputs.
    struct ScriptedGenerator {
        outputs: Mutex<Vec<LlmResult<String>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedGenerator {
        fn new(outputs: Vec<LlmResult<String>>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(&self, _request: &GenerationRequest) -> LlmResult<String> {
            *self.calls.lock().unwrap() += 1;
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.is_empty() {
                Ok("fallback draft with plenty of words ".repeat(20))
            } else {
                outputs.remove(0)
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn words(n: usize) -> String {
        vec!["voyage"; n].join(" ")
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords(" forest , magic,, dragon "),
            vec!["forest", "magic", "dragon"]
        );
        assert!(split_keywords(" , ,").is_empty());
    }

    #[test]
    fn test_split_primary() {
        let keywords = split_keywords("a, b, c, d, e");
        let (primary, secondary) = split_primary(&keywords);
        assert_eq!(primary, vec!["a", "b", "c"]);
        assert_eq!(secondary, vec!["d", "e"]);
    }

    #[test]
    fn test_limit_context_caps_and_truncates() {
        let long_doc = "x".repeat(300);
        let context = vec![
            long_doc,
            "short".to_string(),
            "also short".to_string(),
            "dropped".to_string(),
        ];
        let text = limit_context(&context);
        assert!(!text.contains("dropped"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().ends_with("..."));
        assert_eq!(text.lines().next().unwrap().chars().count(), 203);
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        let text = "é".repeat(250);
        let truncated = truncate_chars(&text, 200);
        assert_eq!(truncated.chars().count(), 203);
    }

    #[tokio::test]
    async fn test_retries_short_drafts_then_accepts() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(words(10)),
            Ok(words(20)),
            Ok(words(120)),
        ]));
        let adapter = GenerationAdapter::new(generator.clone());
        let mut log = FlowLog::default();

        let draft = adapter
            .generate("ocean", &[], StoryLength::Short, &[], &mut log)
            .await
            .unwrap();

        assert_eq!(generator.call_count(), 3);
        assert_eq!(draft.method, "scripted");
        assert!(tokenize(&draft.story).len() >= 50);
    }

    #[tokio::test]
    async fn test_falls_back_to_best_draft() {
        // Every draft is too short; the adapter still returns one rather
        // than erroring, because a draft exists.
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(words(10)),
            Ok(words(30)),
            Ok(words(20)),
        ]));
        let adapter = GenerationAdapter::new(generator);
        let mut log = FlowLog::default();

        let draft = adapter
            .generate("ocean", &[], StoryLength::Short, &[], &mut log)
            .await
            .unwrap();
        assert!(!draft.story.is_empty());
    }

    #[tokio::test]
    async fn test_best_draft_tracks_vocabulary_rate() {
        let allowed = vec!["voyage".to_string()];
        // First draft ignores the vocabulary, second uses it but is short.
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(vec!["harbor"; 60].join(" ")),
            Ok(words(30)),
            Ok(vec!["harbor"; 60].join(" ")),
        ]));
        let adapter = GenerationAdapter::new(generator);
        let mut log = FlowLog::default();

        let draft = adapter
            .generate("voyage", &[], StoryLength::Short, &allowed, &mut log)
            .await
            .unwrap();
        assert!(draft.story.contains("voyage"));
    }

    #[tokio::test]
    async fn test_all_attempts_failing_surfaces_error() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(LlmError::Network("timeout".to_string())),
            Err(LlmError::Network("timeout".to_string())),
            Err(LlmError::Network("timeout".to_string())),
        ]));
        let adapter = GenerationAdapter::new(generator);
        let mut log = FlowLog::default();

        let result = adapter
            .generate("ocean", &[], StoryLength::Short, &[], &mut log)
            .await;
        assert!(matches!(result, Err(GenerationError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_empty_outputs_surface_empty_error() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("   ".to_string()),
            Ok(String::new()),
            Ok("\n".to_string()),
        ]));
        let adapter = GenerationAdapter::new(generator);
        let mut log = FlowLog::default();

        let result = adapter
            .generate("ocean", &[], StoryLength::Short, &[], &mut log)
            .await;
        assert!(matches!(result, Err(GenerationError::EmptyOutput { .. })));
    }

    #[tokio::test]
    async fn test_revision_passes_story_and_critique_as_context() {
        struct CapturingGenerator {
            last_request: Mutex<Option<GenerationRequest>>,
        }

        #[async_trait]
        impl TextGenerator for CapturingGenerator {
            async fn generate_text(&self, request: &GenerationRequest) -> LlmResult<String> {
                *self.last_request.lock().unwrap() = Some(request.clone());
                Ok(words(100))
            }

            fn name(&self) -> &str {
                "capturing"
            }
        }

        let generator = Arc::new(CapturingGenerator {
            last_request: Mutex::new(None),
        });
        let adapter = GenerationAdapter::new(generator.clone());
        let mut log = FlowLog::default();

        adapter
            .revise(
                "The old draft.",
                "Use more allowed words.",
                StoryLength::Medium,
                &[],
                &mut log,
            )
            .await
            .unwrap();

        let request = generator.last_request.lock().unwrap().clone().unwrap();
        assert!(request.primary_keywords.is_empty());
        assert!(request.context_text.contains("The old draft."));
        assert!(request.context_text.contains("Critique for revision:"));
    }
}

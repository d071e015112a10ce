//! The bounded-retry story flow: retrieve, generate, evaluate, revise.
//!
//! One `FlowState` is built per request, threaded through each step, and
//! discarded once the final [`StoryResult`](crate::result::StoryResult) is
//! extracted. Every transition appends a timestamped entry to the state's
//! log so a run can be audited without rerunning it.

use crate::generate::GenerationAdapter;
use crate::id::FlowId;
use crate::length::StoryLength;
use crate::llm::TextGenerator;
use crate::result::StoryResult;
use crate::retrieval::RetrievalStep;
use crate::scorer::VocabularyScorer;
use crate::store::{DocumentStore, VocabularyStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of revision passes before the flow stops and returns
/// whatever story exists.
const MAX_REVISIONS: u32 = 2;

/// Generation method recorded when the flow terminates on a generation
/// failure.
pub const METHOD_ERROR: &str = "error";

/// Append-only, timestamped trace of a flow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowLog {
    entries: Vec<String>,
}

impl FlowLog {
    /// Append a timestamped entry.
    pub fn push(&mut self, message: impl AsRef<str>) {
        let line = format!("[{}] {}", Utc::now().format("%H:%M:%S"), message.as_ref());
        tracing::debug!(target: "storyweave::flow", "{line}");
        self.entries.push(line);
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log into its entries.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// A story generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    /// Comma-separated keywords; order matters, the first three are primary
    pub keywords: String,
    /// Target length
    pub length: StoryLength,
    /// Whether output must draw from the store's vocabulary
    pub vocabulary_restricted: bool,
}

impl StoryRequest {
    /// Create a request with the default (medium) length, unrestricted.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            length: StoryLength::default(),
            vocabulary_restricted: false,
        }
    }

    /// Set the target length.
    pub fn with_length(mut self, length: StoryLength) -> Self {
        self.length = length;
        self
    }

    /// Enable or disable the vocabulary restriction.
    pub fn with_vocabulary_restriction(mut self, restricted: bool) -> Self {
        self.vocabulary_restricted = restricted;
        self
    }
}

/// Mutable state threaded through the flow steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    /// Identifier for this run
    pub id: FlowId,
    /// Comma-separated input keywords
    pub keywords: String,
    /// Target length
    pub length: StoryLength,
    /// Whether output must draw from a bounded word set
    pub vocabulary_restricted: bool,
    /// Allowed words; populated only when restricted
    pub allowed_vocabulary: Vec<String>,
    /// Retrieved passages, relevance-ordered
    pub context_documents: Vec<String>,
    /// Current draft
    pub story: String,
    /// Feedback from the last failed evaluation; empty when accepted
    pub critique: String,
    /// Revision counter, capped
    pub attempts: u32,
    /// Whether the current story passes the scorer
    pub accepted: bool,
    /// Which generation path produced the current story
    pub generation_method: String,
    /// Timestamped trace of every step
    pub log: FlowLog,
}

impl FlowState {
    /// Build the initial state for a request.
    pub fn new(request: StoryRequest) -> Self {
        Self {
            id: FlowId::new(),
            keywords: request.keywords,
            length: request.length,
            vocabulary_restricted: request.vocabulary_restricted,
            allowed_vocabulary: Vec::new(),
            context_documents: Vec::new(),
            story: String::new(),
            critique: String::new(),
            attempts: 0,
            accepted: false,
            generation_method: String::new(),
            log: FlowLog::default(),
        }
    }
}

/// The bounded-retry state machine orchestrating retrieval, generation,
/// scoring, and revision.
pub struct FlowController {
    retrieval: RetrievalStep,
    generation: GenerationAdapter,
    scorer: VocabularyScorer,
    max_revisions: u32,
}

impl FlowController {
    /// Create a controller over the three collaborators.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        vocabulary: Arc<dyn VocabularyStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            retrieval: RetrievalStep::new(documents, vocabulary),
            generation: GenerationAdapter::new(generator),
            scorer: VocabularyScorer::new(),
            max_revisions: MAX_REVISIONS,
        }
    }

    /// Replace the scorer thresholds.
    pub fn with_scorer(mut self, scorer: VocabularyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Run a request to one of its terminal states.
    ///
    /// Recoverable failures (retrieval, vocabulary) never abort the run.
    /// A generation failure terminates it with an error-flagged result
    /// (`generation_method == "error"`) rather than propagating. Hitting
    /// the revision cap without acceptance is a normal terminal state: the
    /// caller receives whatever story exists.
    pub async fn run(&self, request: StoryRequest) -> StoryResult {
        let mut state = FlowState::new(request);
        state.log.push(format!(
            "Flow: start (keywords='{}', length={}, restricted={})",
            state.keywords, state.length, state.vocabulary_restricted
        ));

        // Retrieve. Always proceeds to generation, even with empty context.
        self.retrieval.run(&mut state).await;

        // First draft.
        state.log.push(format!(
            "Generate: start (context={}, allowed={})",
            state.context_documents.len(),
            state.allowed_vocabulary.len()
        ));
        match self
            .generation
            .generate(
                &state.keywords,
                &state.context_documents,
                state.length,
                &state.allowed_vocabulary,
                &mut state.log,
            )
            .await
        {
            Ok(draft) => {
                state.story = draft.story;
                state.generation_method = draft.method;
            }
            Err(e) => return self.fail(state, &e.to_string()),
        }

        // Evaluate, revising up to the cap.
        loop {
            let verdict = self
                .scorer
                .evaluate(&state.story, &state.allowed_vocabulary);
            state.accepted = verdict.accepted;
            state.critique = verdict.critique.unwrap_or_default();
            state
                .log
                .push(format!("Evaluate: accepted={}", state.accepted));

            if state.accepted {
                state.log.push("Flow: done (accepted)");
                break;
            }
            if state.attempts >= self.max_revisions {
                state
                    .log
                    .push("Flow: done (revision cap reached, returning best effort)");
                break;
            }

            state.log.push("Revise: start");
            match self
                .generation
                .revise(
                    &state.story,
                    &state.critique,
                    state.length,
                    &state.allowed_vocabulary,
                    &mut state.log,
                )
                .await
            {
                Ok(draft) => {
                    state.story = draft.story;
                    state.generation_method = draft.method;
                    state.attempts += 1;
                    state
                        .log
                        .push(format!("Revise: attempt {} done", state.attempts));
                }
                Err(e) => return self.fail(state, &e.to_string()),
            }
        }

        StoryResult::from_state(state)
    }

    /// Terminate the run with an error-flagged result.
    fn fail(&self, mut state: FlowState, reason: &str) -> StoryResult {
        tracing::warn!(flow = %state.id, reason, "flow terminated on generation failure");
        state.log.push(format!("Flow: failed ({reason})"));
        state.story = format!("Sorry, a story could not be generated: {reason}");
        state.generation_method = METHOD_ERROR.to_string();
        state.accepted = false;
        state.critique.clear();
        StoryResult::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = StoryRequest::new("forest, magic")
            .with_length(StoryLength::Long)
            .with_vocabulary_restriction(true);

        assert_eq!(request.keywords, "forest, magic");
        assert_eq!(request.length, StoryLength::Long);
        assert!(request.vocabulary_restricted);
    }

    #[test]
    fn test_initial_state() {
        let state = FlowState::new(StoryRequest::new("ocean"));
        assert_eq!(state.attempts, 0);
        assert!(!state.accepted);
        assert!(state.story.is_empty());
        assert!(state.critique.is_empty());
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_log_is_append_only_and_stamped() {
        let mut log = FlowLog::default();
        log.push("first");
        log.push("second");

        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].contains("first"));
        // "[HH:MM:SS] message"
        assert!(log.entries()[1].starts_with('['));
        assert_eq!(log.entries()[1].as_bytes()[9], b']');
    }
}

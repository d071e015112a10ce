//! Context retrieval and allowed-vocabulary preparation.
//!
//! Retrieval is best-effort and never fatal: a failed search or an
//! unavailable vocabulary store leaves the flow with empty context or an
//! empty allowed set plus a logged warning, and generation proceeds.

use crate::flow::FlowState;
use crate::store::{DocumentStore, VocabularyStore};
use std::sync::Arc;

/// Default number of context passages requested per query.
const DEFAULT_TOP_K: usize = 3;
/// Filtered vocabularies smaller than this are considered too sparse to
/// constrain a whole story and are replaced by the full vocabulary.
const SPARSITY_THRESHOLD: usize = 30;

/// Queries the document store for context and, in restricted mode,
/// prepares the allowed word set.
pub struct RetrievalStep {
    documents: Arc<dyn DocumentStore>,
    vocabulary: Arc<dyn VocabularyStore>,
    top_k: usize,
    sparsity_threshold: usize,
}

impl RetrievalStep {
    /// Create a retrieval step over the given collaborators.
    pub fn new(documents: Arc<dyn DocumentStore>, vocabulary: Arc<dyn VocabularyStore>) -> Self {
        Self {
            documents,
            vocabulary,
            top_k: DEFAULT_TOP_K,
            sparsity_threshold: SPARSITY_THRESHOLD,
        }
    }

    /// Override how many passages are requested.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Populate `context_documents` and, when restricted,
    /// `allowed_vocabulary` on the state.
    pub async fn run(&self, state: &mut FlowState) {
        state.log.push("Retrieve: start");

        // The query is the first non-empty comma-separated keyword token.
        let query = state
            .keywords
            .split(',')
            .map(str::trim)
            .find(|k| !k.is_empty())
            .map(String::from);

        match query {
            None => {
                state.context_documents.clear();
                state.log.push("Retrieve: no keyword, skipping context");
            }
            Some(query) => match self.documents.search(&query, self.top_k).await {
                Ok(results) => {
                    state.context_documents =
                        results.into_iter().map(|r| r.document).collect();
                    state.log.push(format!(
                        "Retrieve: ok (query='{query}', docs={})",
                        state.context_documents.len()
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "retrieval failed, continuing without context");
                    state.context_documents.clear();
                    state
                        .log
                        .push(format!("Retrieve: failed ({e}), continuing without context"));
                }
            },
        }

        if state.vocabulary_restricted {
            self.prepare_vocabulary(state).await;
        }
    }

    /// Compute the allowed word set: filtered vocabulary first, falling
    /// back to the full vocabulary when the filtered set is too sparse or
    /// the call fails. Both failing leaves the set empty (permissive).
    async fn prepare_vocabulary(&self, state: &mut FlowState) {
        let filtered = self
            .vocabulary
            .filtered(&state.keywords, &state.context_documents)
            .await;

        match filtered {
            Ok(words) if words.len() >= self.sparsity_threshold => {
                state
                    .log
                    .push(format!("Vocabulary: prepared (size={})", words.len()));
                state.allowed_vocabulary = words;
            }
            Ok(sparse) => match self.vocabulary.full().await {
                Ok(words) => {
                    state.log.push(format!(
                        "Vocabulary: filtered set too sparse ({}), using full (size={})",
                        sparse.len(),
                        words.len()
                    ));
                    state.allowed_vocabulary = words;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "vocabulary unavailable");
                    state.allowed_vocabulary.clear();
                    state
                        .log
                        .push(format!("Vocabulary: failed to prepare ({e})"));
                }
            },
            Err(e) => match self.vocabulary.full().await {
                Ok(words) => {
                    state.log.push(format!(
                        "Vocabulary: filtered lookup failed ({e}), fallback to full (size={})",
                        words.len()
                    ));
                    state.allowed_vocabulary = words;
                }
                Err(e2) => {
                    tracing::warn!(error = %e2, "vocabulary unavailable");
                    state.allowed_vocabulary.clear();
                    state
                        .log
                        .push(format!("Vocabulary: failed to prepare ({e2})"));
                }
            },
        }
    }
}

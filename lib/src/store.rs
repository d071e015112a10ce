//! Collaborator traits for the document and vocabulary stores.
//!
//! The flow never owns these stores; it consumes a similarity-search
//! capability and a read-only view of the vocabulary the store has
//! accumulated. Embedding choice, persistence, and chunking are entirely the
//! collaborator's business.

use crate::error::{RetrievalResult, VocabularyResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single similarity-search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved passage
    pub document: String,
    /// Source metadata (file name, chunk index, ...)
    pub metadata: HashMap<String, serde_json::Value>,
    /// Distance from the query; smaller is closer
    pub distance: f32,
}

impl SearchResult {
    /// Create a result with just a document and distance.
    pub fn new(document: impl Into<String>, distance: f32) -> Self {
        Self {
            document: document.into(),
            metadata: HashMap::new(),
            distance,
        }
    }
}

/// Similarity search over the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Search for the `k` passages closest to `query`.
    ///
    /// May return fewer than `k` results; an empty result is valid and not
    /// an error.
    async fn search(&self, query: &str, k: usize) -> RetrievalResult<Vec<SearchResult>>;
}

/// Read access to the word set the document store has accumulated.
///
/// The store owns all mutation; the flow only reads. `add` exists so hosts
/// can grow the vocabulary as documents are ingested.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Words related to the given keywords and context passages.
    ///
    /// May return an empty or sparse set; callers decide whether that is
    /// adequate.
    async fn filtered(&self, keywords: &str, context: &[String]) -> VocabularyResult<Vec<String>>;

    /// The full vocabulary, used as a fallback when the filtered set is too
    /// sparse.
    async fn full(&self) -> VocabularyResult<Vec<String>>;

    /// Add words to the vocabulary.
    async fn add(&self, words: &[String]) -> VocabularyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_serde() {
        let mut result = SearchResult::new("The ocean was calm.", 0.12);
        result
            .metadata
            .insert("source".to_string(), serde_json::json!("voyages.pdf"));

        let json = serde_json::to_string(&result).unwrap();
        let parsed: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.document, "The ocean was calm.");
        assert_eq!(parsed.metadata["source"], "voyages.pdf");
    }
}

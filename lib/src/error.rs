//! Error types for the story flow.
//!
//! Uses thiserror for ergonomic error definition. Retrieval and vocabulary
//! errors are recovered inside the flow and never escape `FlowController::run`;
//! generation errors are the one unrecoverable class and are converted into an
//! error-flagged result.

/// Main error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Document retrieval error
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Vocabulary store error
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Story generation error
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the document store collaborator
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The backing store failed to execute the search
    #[error("Document store failed: {reason}")]
    Store { reason: String },

    /// The query could not be embedded or interpreted
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },
}

/// Errors raised by the vocabulary store collaborator
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    /// The backing store failed
    #[error("Vocabulary store failed: {reason}")]
    Store { reason: String },
}

/// Errors raised while generating a story draft
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The text generation collaborator failed on every attempt
    #[error("Generator '{generator}' failed: {source}")]
    Provider {
        generator: String,
        #[source]
        source: LlmError,
    },

    /// The generator returned an empty story on every attempt
    #[error("Generator '{generator}' returned empty output")]
    EmptyOutput { generator: String },
}

/// LLM provider errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// API error from the provider
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Response parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for retrieval operations
pub type RetrievalResult<T> = std::result::Result<T, RetrievalError>;

/// Result type for vocabulary operations
pub type VocabularyResult<T> = std::result::Result<T, VocabularyError>;

/// Result type for generation operations
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing api key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_error_conversion() {
        let retrieval = RetrievalError::Store {
            reason: "connection refused".to_string(),
        };
        let err: Error = retrieval.into();
        assert!(matches!(err, Error::Retrieval(_)));
    }

    #[test]
    fn test_generation_error_source() {
        let err = GenerationError::Provider {
            generator: "openai".to_string(),
            source: LlmError::Network("timeout".to_string()),
        };
        assert!(err.to_string().contains("openai"));
    }
}

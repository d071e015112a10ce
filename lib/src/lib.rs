//! # Storyweave
//!
//! Retrieval-grounded, vocabulary-constrained story generation with an
//! evaluate/revise feedback loop.
//!
//! ## Core Concepts
//!
//! - **FlowController**: a bounded-retry state machine; retrieve, generate,
//!   evaluate, and revise up to a fixed cap
//! - **VocabularyScorer**: the deterministic acceptance policy that gates
//!   drafts on length, allowed-vocabulary usage, and filler words
//! - **RetrievalStep**: best-effort context lookup and allowed-word-set
//!   preparation with a sparsity fallback
//! - **Collaborators**: the document store, vocabulary store, and text
//!   generator are traits; embedding, persistence, and provider choice all
//!   live outside this crate
//!
//! ## Example
//!
//! ```rust,ignore
//! use storyweave::prelude::*;
//! use storyweave::llm::openai::OpenAiGenerator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = Arc::new(OpenAiGenerator::from_env()?);
//!     let controller = FlowController::new(documents, vocabulary, generator);
//!
//!     let result = controller
//!         .run(StoryRequest::new("ocean, sailor").with_length(StoryLength::Short))
//!         .await;
//!     println!("{}", result.story);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod flow;
pub mod generate;
pub mod id;
pub mod length;
pub mod llm;
pub mod prompts;
pub mod result;
pub mod retrieval;
pub mod scorer;
pub mod store;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::flow::{FlowController, FlowLog, FlowState, StoryRequest};
    pub use crate::generate::{GeneratedStory, GenerationAdapter};
    pub use crate::id::FlowId;
    pub use crate::length::{LengthBand, StoryLength};
    pub use crate::llm::{GenerationRequest, TextGenerator};
    pub use crate::result::StoryResult;
    pub use crate::retrieval::RetrievalStep;
    pub use crate::scorer::{Verdict, VocabularyScorer};
    pub use crate::store::{DocumentStore, SearchResult, VocabularyStore};
}

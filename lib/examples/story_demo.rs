//! Story generation demo
//!
//! Runs the full retrieve/generate/evaluate/revise flow against the
//! OpenAI chat API with a small in-memory corpus.
//!
//! Run with: cargo run --example story_demo -- "ocean, sailor"
//! (Make sure .env file has OPENAI_API_KEY set)

use async_trait::async_trait;
use std::sync::Arc;
use storyweave::llm::openai::OpenAiGenerator;
use storyweave::prelude::*;

/// A handful of passages standing in for a real vector index. Every
/// search returns the top `k` passages regardless of the query.
struct DemoStore {
    passages: Vec<&'static str>,
}

#[async_trait]
impl DocumentStore for DemoStore {
    async fn search(&self, _query: &str, k: usize) -> RetrievalResult<Vec<SearchResult>> {
        Ok(self
            .passages
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, p)| SearchResult::new(p.to_string(), i as f32 * 0.1))
            .collect())
    }
}

/// Fixed word list shared by the filtered and full lookups.
struct DemoVocabulary {
    words: Vec<String>,
}

#[async_trait]
impl VocabularyStore for DemoVocabulary {
    async fn filtered(&self, _keywords: &str, _context: &[String]) -> VocabularyResult<Vec<String>> {
        Ok(self.words.clone())
    }

    async fn full(&self) -> VocabularyResult<Vec<String>> {
        Ok(self.words.clone())
    }

    async fn add(&self, _words: &[String]) -> VocabularyResult<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load .env file (try workspace root first, then current dir)
    if dotenvy::from_path("../.env").is_err() {
        let _ = dotenvy::dotenv();
    }

    let generator = match OpenAiGenerator::from_env() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please set OPENAI_API_KEY in .env file");
            std::process::exit(1);
        }
    };

    let keywords = std::env::args().nth(1).unwrap_or_else(|| "ocean, sailor".to_string());

    let store = DemoStore {
        passages: vec![
            "The old sailor watched the ocean from the harbor wall every morning.",
            "Storms on the open water test a crew's patience more than its strength.",
            "A lighthouse keeper once said the sea remembers every ship it has carried.",
        ],
    };
    let vocabulary = DemoVocabulary {
        words: [
            "ocean", "sailor", "ship", "harbor", "storm", "wave", "water", "wind", "sail",
            "crew", "lighthouse", "morning", "night", "journey", "voyage", "captain", "sea",
            "shore", "tide", "star", "map", "rope", "deck", "mast", "fish", "bird", "cloud",
            "rain", "sun", "moon", "island", "home", "heart", "dream", "story", "song",
        ]
        .iter()
        .map(|w| w.to_string())
        .collect(),
    };

    let flow = FlowController::new(Arc::new(store), Arc::new(vocabulary), Arc::new(generator));

    println!("Generating a story for: {keywords}\n");

    let result = flow
        .run(
            StoryRequest::new(&keywords)
                .with_length(StoryLength::Short)
                .with_vocabulary_restriction(true),
        )
        .await;

    println!("{}\n", result.story);
    println!("accepted: {}", result.accepted);
    println!("attempts: {}", result.attempts);
    println!("words: {}", result.word_count);
    println!(
        "keywords used: {:?} ({:.0}%)",
        result.keywords_used,
        result.keyword_usage_rate * 100.0
    );
    println!("vocabulary size: {}", result.vocabulary_count);
    println!("context documents: {}", result.context_documents_count);
    println!("\n--- log ---");
    for entry in &result.log {
        println!("{entry}");
    }

    Ok(())
}

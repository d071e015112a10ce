//! OpenAI-backed implementation of [`TextGenerator`].

use crate::error::{LlmError, LlmResult};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::prompts::{build_story_prompt, build_system_prompt};
use async_trait::async_trait;
use openai::{ChatMessage, ChatRequest, OpenAi};

/// Sampling settings tuned for story writing: enough temperature for
/// variety, penalties to discourage the repetitive prose the scorer
/// rejects anyway.
const TEMPERATURE: f32 = 0.7;
const PRESENCE_PENALTY: f32 = 0.6;
const FREQUENCY_PENALTY: f32 = 0.3;

/// Generates stories through the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: OpenAi,
}

impl OpenAiGenerator {
    /// Wrap an existing client.
    pub fn new(client: OpenAi) -> Self {
        Self { client }
    }

    /// Build a generator from `OPENAI_API_KEY` (and the optional
    /// `OPENAI_BASE_URL` / `OPENAI_MODEL` overrides).
    pub fn from_env() -> LlmResult<Self> {
        let client = OpenAi::from_env().map_err(map_error)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> LlmResult<String> {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(build_system_prompt(request.is_restricted())),
            ChatMessage::user(build_story_prompt(request)),
        ])
        .with_max_tokens(request.length.band().max_tokens)
        .with_temperature(TEMPERATURE)
        .with_presence_penalty(PRESENCE_PENALTY)
        .with_frequency_penalty(FREQUENCY_PENALTY);

        let response = self.client.complete(chat).await.map_err(map_error)?;
        Ok(response.content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn map_error(error: openai::Error) -> LlmError {
    match error {
        openai::Error::NoApiKey => {
            LlmError::Configuration("OPENAI_API_KEY is not set".to_string())
        }
        openai::Error::Network(message) => LlmError::Network(message),
        openai::Error::Api { status, message } => LlmError::Api { status, message },
        openai::Error::Parse(message) => LlmError::Parse(message),
        openai::Error::Config(message) => LlmError::Configuration(message),
    }
}

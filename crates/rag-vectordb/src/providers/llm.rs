//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;
use crate::generation::Prompt;

/// Answer text used when a provider replies without any content
pub const NO_ANSWER: &str = "No answer generated.";

/// A provider's reply, normalized
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated answer
    pub answer: String,
    /// Total tokens reported by the provider, 0 when it reports none
    pub tokens_used: u32,
}

/// Trait for LLM-based answer generation
///
/// Implementations:
/// - `OpenAiClient`: hosted chat completion API
/// - `OllamaClient`: local Ollama server (llama3.2 etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Answer an assembled prompt
    async fn complete(&self, prompt: &Prompt) -> Result<Completion>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

//! OpenAI-compatible chat completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};
use crate::generation::Prompt;
use crate::types::Role;

use super::llm::{Completion, LlmProvider, NO_ANSWER};

/// Chat completion client
///
/// A missing API key does not prevent construction; the first
/// [`complete`](LlmProvider::complete) call reports it instead.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessagePayload<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessagePayload<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Misconfiguration("OPENAI_API_KEY is not set".to_string()))
    }

    /// System message, then history, then the user turn
    fn messages<'a>(prompt: &'a Prompt) -> Vec<ChatMessagePayload<'a>> {
        let mut messages = Vec::with_capacity(prompt.history.len() + 2);
        messages.push(ChatMessagePayload {
            role: "system",
            content: &prompt.system,
        });
        for message in &prompt.history {
            messages.push(ChatMessagePayload {
                role: match message.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: &message.content,
            });
        }
        messages.push(ChatMessagePayload {
            role: "user",
            content: &prompt.user,
        });
        messages
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: Self::messages(prompt),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!(
            "Generating answer with model: {} ({} messages)",
            self.config.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "OpenAI completion failed: HTTP {} - {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let answer = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string());
        let tokens_used = completion.usage.map(|u| u.total_tokens).unwrap_or(0);

        Ok(Completion {
            answer,
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(api_key) = self.api_key() else {
            return Ok(false);
        };
        let url = format!("{}/models", self.base_url);

        match self.client.get(&url).bearer_auth(api_key).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

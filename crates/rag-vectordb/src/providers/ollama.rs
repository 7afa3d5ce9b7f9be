//! Ollama client for answer generation
//!
//! Ollama's `/api/generate` takes a single prompt, so the assembled
//! [`Prompt`] is flattened before sending.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OllamaConfig;
use crate::error::{Error, Result};
use crate::generation::Prompt;

use super::llm::{Completion, LlmProvider, NO_ANSWER};

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
    num_ctx: u32,
    top_k: u32,
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaClient {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.config.model,
            prompt: prompt.flatten(),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.num_predict,
                num_ctx: self.config.num_ctx,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
            },
        };

        tracing::info!("Generating answer with model: {}", self.config.model);
        tracing::debug!("Ollama prompt is {} chars", request.prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse generation response: {}", e)))?;

        let answer = generate_response
            .response
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| NO_ANSWER.to_string());

        Ok(Completion {
            answer,
            tokens_used: 0,
        })
    }

    /// Check if Ollama is available
    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

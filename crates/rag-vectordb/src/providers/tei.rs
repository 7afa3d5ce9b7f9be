//! Embedding client for a text-embeddings-inference style service
//!
//! `POST {base}/embed { "inputs": string | string[] }` answers with either a
//! flat vector or one vector per input.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// HTTP embedding client
pub struct TeiEmbedder {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbedInputs<'a> {
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: EmbedInputs<'a>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Batch(Vec<Vec<f32>>),
    Single(Vec<f32>),
}

impl TeiEmbedder {
    /// Create a new client for the service at `config.base_url`
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, inputs: EmbedInputs<'_>) -> Result<EmbedResponse> {
        let url = format!("{}/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { inputs })
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("HTTP {} - {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))
    }
}

#[async_trait]
impl EmbeddingProvider for TeiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.request(EmbedInputs::One(text)).await? {
            EmbedResponse::Single(vector) => Ok(vector),
            EmbedResponse::Batch(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| Error::embedding("service returned no embedding")),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let rows = match self.request(EmbedInputs::Many(texts)).await? {
            EmbedResponse::Batch(rows) => rows,
            EmbedResponse::Single(vector) => vec![vector],
        };

        if rows.len() != texts.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                rows.len()
            )));
        }

        tracing::debug!("Embedded batch of {} texts", rows.len());
        Ok(rows)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "tei"
    }
}

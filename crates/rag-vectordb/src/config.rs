//! Configuration for the RAG service
//!
//! Built once at startup: defaults, then an optional TOML file, then
//! environment variables. The resulting [`RagConfig`] is immutable and handed
//! to each component.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding service configuration
    pub embedding: EmbeddingConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// OpenAI-compatible chat completion configuration
    pub openai: OpenAiConfig,
    /// Ollama generation configuration
    pub ollama: OllamaConfig,
    /// Retrieval and prompt assembly configuration
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// The single origin allowed by CORS
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "http://localhost:4200".to_string(),
        }
    }
}

/// Embedding inference service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the service exposing `POST /embed`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Vector database (Chroma) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Chroma base URL
    pub url: String,
    /// Collection holding the documents
    pub collection: String,
    /// Chroma tenant
    pub tenant: String,
    /// Chroma database within the tenant
    pub database: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            collection: "documents".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            timeout_secs: 120,
        }
    }
}

/// OpenAI-compatible chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; absence is tolerated until the first OpenAI query
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL (`chat/completions` is appended)
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum completion tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 120,
        }
    }
}

/// Ollama generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f64,
    /// Maximum output tokens (`num_predict`)
    pub num_predict: u32,
    /// Context window size in tokens (`num_ctx`)
    pub num_ctx: u32,
    /// Top-k sampling
    pub top_k: u32,
    /// Nucleus sampling
    pub top_p: f64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.5,
            num_predict: 500,
            num_ctx: 2048,
            top_k: 20,
            top_p: 0.9,
            timeout_secs: 120,
        }
    }
}

/// Retrieval and prompt assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates kept only when `distance < relevance_threshold`
    pub relevance_threshold: f64,
    /// Candidates fetched per RAG query when the request omits `contextLimit`
    pub default_context_limit: usize,
    /// Results returned by document search when the request omits `limit`
    pub default_search_limit: usize,
    /// Most recent conversation messages forwarded to the provider
    pub history_window: usize,
    /// Characters of document content kept in each returned source
    pub source_preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 1.2,
            default_context_limit: 3,
            default_search_limit: 5,
            history_window: 10,
            source_preview_chars: 200,
        }
    }
}

impl RagConfig {
    /// Load configuration: defaults, then the TOML file named by `RAG_CONFIG`
    /// (if set), then environment overrides.
    pub fn load() -> Result<Self> {
        let base = match std::env::var("RAG_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides through a lookup function so the
    /// environment itself stays out of tests.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("CHROMA_URL") {
            self.vector_db.url = v;
        }
        if let Some(v) = var("CHROMA_COLLECTION") {
            self.vector_db.collection = v;
        }
        if let Some(v) = var("CHROMA_TENANT") {
            self.vector_db.tenant = v;
        }
        if let Some(v) = var("CHROMA_DATABASE") {
            self.vector_db.database = v;
        }
        if let Some(v) = var("EMBEDDING_SERVICE_URL") {
            self.embedding.base_url = v;
        }
        if let Some(v) = var("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = var("OPENAI_MODEL") {
            self.openai.model = v;
        }
        if let Some(v) = var("OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Some(v) = var("OLLAMA_URL") {
            self.ollama.base_url = v;
        }
        if let Some(v) = var("OLLAMA_MODEL") {
            self.ollama.model = v;
        }
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = var("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = var("CORS_ORIGIN") {
            self.server.cors_origin = v;
        }
        if let Some(window) = var("HISTORY_WINDOW").and_then(|v| v.parse().ok()) {
            self.retrieval.history_window = window;
        }

        self
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("vector_db.url", &self.vector_db.url),
            ("embedding.base_url", &self.embedding.base_url),
            ("openai.base_url", &self.openai.base_url),
            ("ollama.base_url", &self.ollama.base_url),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".into()));
        }
        let names = [
            ("vector_db.collection", &self.vector_db.collection),
            ("vector_db.tenant", &self.vector_db.tenant),
            ("vector_db.database", &self.vector_db.database),
        ];
        for (name, value) in names {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }
        if self.retrieval.history_window == 0 {
            return Err(Error::Config("retrieval.history_window must be >= 1".into()));
        }
        if self.retrieval.default_context_limit == 0 || self.retrieval.default_search_limit == 0 {
            return Err(Error::Config("retrieval limits must be >= 1".into()));
        }
        let threshold = self.retrieval.relevance_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(Error::Config("retrieval.relevance_threshold must be > 0".into()));
        }

        Ok(())
    }

    /// True when an OpenAI API key is configured
    pub fn has_openai_key(&self) -> bool {
        self.openai.api_key.is_some()
    }
}

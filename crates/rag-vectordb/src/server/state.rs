//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::RagOrchestrator;
use crate::providers::{
    ChromaStore, EmbeddingProvider, LlmProvider, OllamaClient, OpenAiClient, TeiEmbedder,
    VectorStoreProvider,
};
use crate::retrieval::DocumentCatalog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Document CRUD and search
    catalog: DocumentCatalog,
    /// Query pipeline
    orchestrator: RagOrchestrator,
}

impl AppState {
    /// Create new application state, connecting to every upstream
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");

        let embedder = Arc::new(TeiEmbedder::new(&config.embedding)?);
        tracing::info!("Embedding client initialized ({})", config.embedding.base_url);

        let store = Arc::new(ChromaStore::connect(&config.vector_db).await?);

        let openai = Arc::new(OpenAiClient::new(&config.openai)?);
        let llama = Arc::new(OllamaClient::new(&config.ollama)?);
        tracing::info!(
            "LLM providers initialized (openai: {}, llama: {} at {})",
            config.openai.model,
            config.ollama.model,
            config.ollama.base_url
        );

        Ok(Self::from_parts(config, embedder, store, openai, llama))
    }

    /// Assemble state from already constructed providers
    pub fn from_parts(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        openai: Arc<dyn LlmProvider>,
        llama: Arc<dyn LlmProvider>,
    ) -> Self {
        let catalog = DocumentCatalog::new(embedder, store);
        let orchestrator =
            RagOrchestrator::new(catalog.clone(), openai, llama, config.retrieval.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                orchestrator,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the document catalog
    pub fn catalog(&self) -> &DocumentCatalog {
        &self.inner.catalog
    }

    /// Get the query orchestrator
    pub fn orchestrator(&self) -> &RagOrchestrator {
        &self.inner.orchestrator
    }

    /// True when both the vector store and the embedding service answer
    pub async fn is_ready(&self) -> bool {
        let (embedder, store) = self.inner.catalog.health().await;
        if !embedder {
            tracing::warn!("Embedding service is not healthy");
        }
        if !store {
            tracing::warn!("Vector store is not healthy");
        }
        embedder && store
    }
}

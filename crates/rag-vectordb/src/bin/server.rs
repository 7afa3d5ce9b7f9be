//! RAG Server binary
//!
//! Run with: cargo run -p rag-vectordb --bin rag-vectordb-server

use rag_vectordb::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_vectordb=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chroma: {} (collection '{}')", config.vector_db.url, config.vector_db.collection);
    tracing::info!("  - Embedding service: {}", config.embedding.base_url);
    tracing::info!("  - OpenAI model: {}", config.openai.model);
    tracing::info!("  - Ollama: {} ({})", config.ollama.base_url, config.ollama.model);
    tracing::info!("  - History window: {}", config.retrieval.history_window);

    if !config.has_openai_key() {
        tracing::warn!("OPENAI_API_KEY not set. OpenAI queries will fail.");
    }

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  UI: http://{}/", server.address());
    println!("  API docs: http://{}/api", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

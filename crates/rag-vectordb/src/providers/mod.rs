//! Provider abstractions for embeddings, vector storage and LLM generation
//!
//! Every external collaborator sits behind a trait so the catalog and the
//! orchestrator can be exercised without network access.

pub mod embedding;
pub mod tei;
pub mod vector_store;
pub mod chroma;
pub mod llm;
pub mod openai;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use tei::TeiEmbedder;
pub use vector_store::{CollectionSnapshot, QueryHits, VectorStoreProvider};
pub use chroma::ChromaStore;
pub use llm::{Completion, LlmProvider, NO_ANSWER};
pub use openai::OpenAiClient;
pub use ollama::OllamaClient;

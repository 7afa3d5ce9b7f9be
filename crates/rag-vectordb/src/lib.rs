//! rag-vectordb: document catalog over a vector database with
//! retrieval-augmented answers
//!
//! Documents are embedded by an external inference service and stored in a
//! Chroma collection. Questions are answered by OpenAI or a local Ollama
//! model, with the closest stored documents supplied as context and returned
//! as sources.

pub mod config;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Document, SearchResult},
    query::{Provider, RagQuery},
    response::RagQueryResult,
};

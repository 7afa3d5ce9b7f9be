//! Document catalog over the vector store
//!
//! Assigns ids and metadata, keeps each stored embedding in step with its
//! document content, and answers similarity searches.

use chrono::Utc;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{DeleteResponse, Document, SearchResult};

/// CRUD and search over stored documents
#[derive(Clone)]
pub struct DocumentCatalog {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl DocumentCatalog {
    /// Create a catalog over the given providers
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Store a new document
    pub async fn add(&self, content: &str, title: Option<String>) -> Result<Document> {
        if content.trim().is_empty() {
            return Err(Error::invalid("content must not be empty"));
        }

        let document = Document::new(content, title);
        self.write(&document).await?;

        tracing::info!("Added document {} ({} chars)", document.id, content.len());
        Ok(document)
    }

    /// Remove a document by id
    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        self.store.delete(id).await?;

        tracing::info!("Deleted document {}", id);
        Ok(DeleteResponse {
            success: true,
            id: id.to_string(),
        })
    }

    /// Replace content and/or title of an existing document
    ///
    /// Other metadata is kept. The embedding is recomputed from the final
    /// content and written back in a single upsert under the same id.
    pub async fn update(
        &self,
        id: &str,
        content: Option<String>,
        title: Option<String>,
    ) -> Result<Document> {
        if content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(Error::invalid("content must not be empty"));
        }

        let mut document = self
            .list()
            .await?
            .into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;

        if let Some(content) = content {
            document.content = content;
        }
        // A blank title leaves the stored one in place
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            document.metadata.title = Some(title);
        }
        document.metadata.updated_at = Some(Utc::now());

        self.write(&document).await?;

        tracing::info!("Updated document {}", id);
        Ok(document)
    }

    /// Every stored document
    pub async fn list(&self) -> Result<Vec<Document>> {
        Ok(self.store.get_all().await?.into_documents())
    }

    /// Number of stored documents, 0 when the store cannot be reached
    pub async fn count(&self) -> usize {
        self.store.count().await
    }

    /// Documents closest to `query`, nearest first
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::invalid("query must not be empty"));
        }
        if k == 0 {
            return Err(Error::invalid("limit must be >= 1"));
        }

        let embedding = self.embedder.embed(query).await?;
        let results = self.store.query(&embedding, k).await?.into_results();

        tracing::debug!("Search returned {} of {} requested", results.len(), k);
        Ok(results)
    }

    /// Health of the embedding service and the vector store
    pub async fn health(&self) -> (bool, bool) {
        let embedder = self.embedder.health_check().await.unwrap_or(false);
        let store = self.store.health_check().await.unwrap_or(false);
        (embedder, store)
    }

    async fn write(&self, document: &Document) -> Result<()> {
        let embedding = self.embedder.embed(&document.content).await?;
        self.store
            .upsert(
                &document.id,
                &document.content,
                &embedding,
                &document.metadata.to_map(),
            )
            .await
    }
}

//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{Document, DocumentMetadata, MetadataMap, SearchResult};

/// Nearest neighbours of one query vector, in ascending distance order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryHits {
    pub ids: Vec<String>,
    pub texts: Vec<String>,
    pub metadatas: Vec<MetadataMap>,
    pub distances: Vec<f64>,
}

impl QueryHits {
    /// Zip the parallel columns into search results
    pub fn into_results(self) -> Vec<SearchResult> {
        self.ids
            .into_iter()
            .zip(self.texts)
            .zip(self.metadatas)
            .zip(self.distances)
            .map(|(((id, content), metadata), distance)| SearchResult {
                document: Document {
                    id,
                    content,
                    metadata: DocumentMetadata::from_map(metadata),
                },
                distance,
            })
            .collect()
    }
}

/// Every entry of the collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    pub ids: Vec<String>,
    pub texts: Vec<String>,
    pub metadatas: Vec<MetadataMap>,
}

impl CollectionSnapshot {
    /// Zip the parallel columns into documents
    pub fn into_documents(self) -> Vec<Document> {
        self.ids
            .into_iter()
            .zip(self.texts)
            .zip(self.metadatas)
            .map(|((id, content), metadata)| Document {
                id,
                content,
                metadata: DocumentMetadata::from_map(metadata),
            })
            .collect()
    }
}

/// Trait for vector storage and similarity search over one collection
///
/// Implementations:
/// - `ChromaStore`: Chroma REST API
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace the entry stored under `id`
    async fn upsert(
        &self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &MetadataMap,
    ) -> Result<()>;

    /// Remove the entry stored under `id`
    async fn delete(&self, id: &str) -> Result<()>;

    /// Nearest `k` entries to `embedding`, closest first
    async fn query(&self, embedding: &[f32], k: usize) -> Result<QueryHits>;

    /// Fetch the whole collection
    async fn get_all(&self) -> Result<CollectionSnapshot>;

    /// Number of stored entries
    ///
    /// Never fails: a store error is logged and reported as `0`, so callers
    /// must tolerate undercounting.
    async fn count(&self) -> usize;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hits_into_results() {
        let hits = QueryHits {
            ids: vec!["a".into(), "b".into()],
            texts: vec!["alpha".into(), "beta".into()],
            metadatas: vec![
                json!({ "title": "A" }).as_object().cloned().unwrap(),
                MetadataMap::new(),
            ],
            distances: vec![0.1, 0.9],
        };
        let results = hits.into_results();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.title(), Some("A"));
        assert_eq!(results[1].document.content, "beta");
        assert_eq!(results[1].distance, 0.9);
    }

    #[test]
    fn test_snapshot_into_documents() {
        let snapshot = CollectionSnapshot {
            ids: vec!["a".into()],
            texts: vec!["alpha".into()],
            metadatas: vec![MetadataMap::new()],
        };
        let docs = snapshot.into_documents();
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[0].metadata, DocumentMetadata::default());
    }
}

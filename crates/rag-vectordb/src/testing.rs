//! In-process doubles for the external collaborators

use async_trait::async_trait;
use axum::Router;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::generation::Prompt;
use crate::providers::{
    CollectionSnapshot, Completion, EmbeddingProvider, LlmProvider, QueryHits,
    VectorStoreProvider,
};
use crate::types::{MetadataMap, SearchResult};

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

const DIMS: usize = 16;

/// Deterministic embedder: identical texts map to identical vectors
#[derive(Default)]
pub struct HashEmbedder {
    calls: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte histogram folded into a fixed number of buckets
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMS];
        for byte in text.bytes() {
            vector[byte as usize % DIMS] += 1.0;
        }
        vector
    }

    /// Texts embedded so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::embedding("HTTP 503 Service Unavailable - down"));
        }
        self.calls.lock().push(text.to_string());
        Ok(Self::vector_for(text))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "hash"
    }
}

struct Entry {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: MetadataMap,
}

/// In-memory vector store with euclidean distance
///
/// `script` replaces similarity search with fixed hits so distance
/// thresholds can be tested exactly.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<Entry>>,
    upserts: Mutex<Vec<String>>,
    scripted: RwLock<Option<Vec<SearchResult>>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Ids passed to `upsert`, in call order
    pub fn upserts(&self) -> Vec<String> {
        self.upserts.lock().clone()
    }

    pub fn clear_upserts(&self) {
        self.upserts.lock().clear();
    }

    pub fn embedding_of(&self, id: &str) -> Option<Vec<f32>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.embedding.clone())
    }

    /// Answer every query with `hits` (capped at `k`)
    pub fn script(&self, hits: Vec<SearchResult>) {
        *self.scripted.write() = Some(hits);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::vector_store("connection refused"));
        }
        Ok(())
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[async_trait]
impl VectorStoreProvider for MemoryStore {
    async fn upsert(
        &self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &MetadataMap,
    ) -> Result<()> {
        self.check()?;
        self.upserts.lock().push(id.to_string());

        let entry = Entry {
            id: id.to_string(),
            text: text.to_string(),
            embedding: embedding.to_vec(),
            metadata: metadata.clone(),
        };
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check()?;
        self.entries.write().retain(|e| e.id != id);
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<QueryHits> {
        self.check()?;

        let mut rows: Vec<(String, String, MetadataMap, f64)> = match &*self.scripted.read() {
            Some(hits) => hits
                .iter()
                .map(|h| {
                    (
                        h.document.id.clone(),
                        h.document.content.clone(),
                        h.document.metadata.to_map(),
                        h.distance,
                    )
                })
                .collect(),
            None => self
                .entries
                .read()
                .iter()
                .map(|e| {
                    (
                        e.id.clone(),
                        e.text.clone(),
                        e.metadata.clone(),
                        euclidean(&e.embedding, embedding),
                    )
                })
                .collect(),
        };
        rows.sort_by(|a, b| a.3.total_cmp(&b.3));
        rows.truncate(k);

        let mut hits = QueryHits::default();
        for (id, text, metadata, distance) in rows {
            hits.ids.push(id);
            hits.texts.push(text);
            hits.metadatas.push(metadata);
            hits.distances.push(distance);
        }
        Ok(hits)
    }

    async fn get_all(&self) -> Result<CollectionSnapshot> {
        self.check()?;

        let entries = self.entries.read();
        Ok(CollectionSnapshot {
            ids: entries.iter().map(|e| e.id.clone()).collect(),
            texts: entries.iter().map(|e| e.text.clone()).collect(),
            metadatas: entries.iter().map(|e| e.metadata.clone()).collect(),
        })
    }

    async fn count(&self) -> usize {
        match self.check() {
            Ok(()) => self.entries.read().len(),
            Err(e) => {
                tracing::warn!("Counting failed, reporting 0: {}", e);
                0
            }
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// LLM double that records every prompt and answers with a fixed reply
pub struct RecordingLlm {
    name: &'static str,
    completion: Completion,
    prompts: Mutex<Vec<Prompt>>,
    failing: AtomicBool,
}

impl RecordingLlm {
    pub fn new(name: &'static str, answer: &str, tokens_used: u32) -> Self {
        Self {
            name,
            completion: Completion {
                answer: answer.to_string(),
                tokens_used,
            },
            prompts: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        self.prompts.lock().push(prompt.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::llm(format!("{} unavailable", self.name)));
        }
        Ok(self.completion.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

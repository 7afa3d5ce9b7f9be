//! Chroma vector store over its v2 REST API
//!
//! The collection is created or fetched once in [`ChromaStore::connect`];
//! every later call addresses it by id under the configured tenant and
//! database.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::MetadataMap;

use super::vector_store::{CollectionSnapshot, QueryHits, VectorStoreProvider};

const COLLECTION_DESCRIPTION: &str = "RAG documents collection";

/// Client bound to one Chroma collection
pub struct ChromaStore {
    client: Client,
    base_url: String,
    collections_url: String,
    collection_id: String,
    collection_name: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    metadata: serde_json::Value,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    ids: [&'a str; 1],
    embeddings: [&'a [f32]; 1],
    documents: [&'a str; 1],
    metadatas: [&'a MetadataMap; 1],
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

/// Columns are nested one level: one row per query embedding
#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<MetadataMap>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<MetadataMap>>>,
}

/// Column `i` of an optional Chroma column, defaulting missing cells
fn cell<T: Clone + Default>(column: &Option<Vec<Option<T>>>, i: usize) -> T {
    column
        .as_ref()
        .and_then(|c| c.get(i).cloned().flatten())
        .unwrap_or_default()
}

fn first_row<T>(column: Option<Vec<T>>) -> Option<T> {
    column.and_then(|rows| rows.into_iter().next())
}

impl ChromaStore {
    /// Connect to Chroma and create-or-fetch the configured collection
    pub async fn connect(config: &VectorDbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        let base_url = config.url.trim_end_matches('/').to_string();
        let collections_url = format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            base_url, config.tenant, config.database
        );

        let request = CreateCollectionRequest {
            name: &config.collection,
            metadata: json!({ "description": COLLECTION_DESCRIPTION }),
            get_or_create: true,
        };
        let collection: CollectionResponse = send_json(
            client
                .post(&collections_url)
                .json(&request),
            "create collection",
        )
        .await?;

        tracing::info!(
            "Using Chroma collection '{}' ({}) in {}/{} at {}",
            config.collection,
            collection.id,
            config.tenant,
            config.database,
            base_url
        );

        Ok(Self {
            client,
            base_url,
            collections_url,
            collection_id: collection.id,
            collection_name: config.collection.clone(),
        })
    }

    fn collection_url(&self, action: &str) -> String {
        format!("{}/{}/{}", self.collections_url, self.collection_id, action)
    }

    async fn fetch_count(&self) -> Result<usize> {
        send_json(self.client.get(self.collection_url("count")), "count").await
    }
}

/// Send a request and fail with `VectorStore` on transport errors or a
/// non-2xx status, keeping the reply body in the message
async fn send(request: RequestBuilder, operation: &str) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::vector_store(format!("{} request failed: {}", operation, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::vector_store(format!(
            "{} failed: HTTP {} - {}",
            operation, status, body
        )));
    }

    Ok(response)
}

/// Send a request and decode its JSON reply
async fn send_json<T: DeserializeOwned>(request: RequestBuilder, operation: &str) -> Result<T> {
    send(request, operation)
        .await?
        .json()
        .await
        .map_err(|e| Error::vector_store(format!("Failed to parse {} response: {}", operation, e)))
}

#[async_trait]
impl VectorStoreProvider for ChromaStore {
    async fn upsert(
        &self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &MetadataMap,
    ) -> Result<()> {
        let request = UpsertRequest {
            ids: [id],
            embeddings: [embedding],
            documents: [text],
            metadatas: [metadata],
        };
        send(self.client.post(self.collection_url("upsert")).json(&request), "upsert").await?;

        tracing::debug!("Upserted {} ({} dims)", id, embedding.len());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        send(
            self.client
                .post(self.collection_url("delete"))
                .json(&json!({ "ids": [id] })),
            "delete",
        )
        .await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<QueryHits> {
        let request = QueryRequest {
            query_embeddings: [embedding],
            n_results: k,
            include: ["documents", "metadatas", "distances"],
        };
        let response: QueryResponse = send_json(
            self.client.post(self.collection_url("query")).json(&request),
            "query",
        )
        .await?;

        let ids = response.ids.into_iter().next().unwrap_or_default();
        let documents = first_row(response.documents);
        let metadatas = first_row(response.metadatas);
        let distances = first_row(response.distances);

        let mut rows: Vec<(String, String, MetadataMap, f64)> = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let text = cell(&documents, i);
                let metadata = cell(&metadatas, i);
                let distance = distances
                    .as_ref()
                    .and_then(|d| d.get(i).copied().flatten())
                    .unwrap_or(f64::MAX);
                (id, text, metadata, distance)
            })
            .collect();

        rows.sort_by(|a, b| a.3.partial_cmp(&b.3).unwrap_or(Ordering::Equal));
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
        let response: GetResponse = send_json(
            self.client
                .post(self.collection_url("get"))
                .json(&json!({ "include": ["documents", "metadatas"] })),
            "get",
        )
        .await?;

        let texts = (0..response.ids.len())
            .map(|i| cell(&response.documents, i))
            .collect();
        let metadatas = (0..response.ids.len())
            .map(|i| cell(&response.metadatas, i))
            .collect();

        Ok(CollectionSnapshot {
            ids: response.ids,
            texts,
            metadatas,
        })
    }

    async fn count(&self) -> usize {
        match self.fetch_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Counting '{}' failed, reporting 0: {}", self.collection_name, e);
                0
            }
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/v2/heartbeat", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "chroma"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_upstream;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::Value;

    const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

    fn action(name: &str) -> String {
        format!("{}/c-1/{}", COLLECTIONS, name)
    }

    fn collections_route() -> Router {
        Router::new().route(
            COLLECTIONS,
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["get_or_create"], true);
                assert_eq!(body["metadata"]["description"], COLLECTION_DESCRIPTION);
                Json(json!({ "id": "c-1", "name": body["name"] }))
            }),
        )
    }

    async fn connect(base_url: String) -> ChromaStore {
        ChromaStore::connect(&VectorDbConfig {
            url: base_url,
            timeout_secs: 5,
            ..VectorDbConfig::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_connect_keeps_collection_id() {
        let base = spawn_upstream(collections_route()).await;
        let store = connect(base).await;
        assert_eq!(store.collection_id, "c-1");
        assert_eq!(store.collection_url("count"), format!("{}{}", store.base_url, action("count")));
    }

    #[tokio::test]
    async fn test_connect_uses_configured_tenant_and_database() {
        let app = Router::new().route(
            "/api/v2/tenants/acme/databases/kb/collections",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["name"], "notes");
                Json(json!({ "id": "c-9" }))
            }),
        );
        let base = spawn_upstream(app).await;

        let store = ChromaStore::connect(&VectorDbConfig {
            url: format!("{}/", base),
            collection: "notes".into(),
            tenant: "acme".into(),
            database: "kb".into(),
            timeout_secs: 5,
        })
        .await
        .unwrap();

        assert_eq!(
            store.collection_url("query"),
            format!("{}/api/v2/tenants/acme/databases/kb/collections/c-9/query", base)
        );
    }

    #[tokio::test]
    async fn test_connect_failure_is_vector_store_error() {
        let app = Router::new().route(
            COLLECTIONS,
            post(|| async { (StatusCode::GONE, "use the v2 api") }),
        );
        let base = spawn_upstream(app).await;

        let err = ChromaStore::connect(&VectorDbConfig {
            url: base,
            ..VectorDbConfig::default()
        })
        .await
        .err()
        .unwrap();
        assert!(matches!(err, Error::VectorStore(ref m) if m.contains("create collection failed") && m.contains("v2 api")));
    }

    #[tokio::test]
    async fn test_query_takes_first_row_sorted_and_capped() {
        let app = collections_route().route(
            &action("query"),
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["n_results"], 2);
                assert_eq!(body["include"][2], "distances");
                Json(json!({
                    "ids": [["b", "a", "c"]],
                    "documents": [["beta", "alpha", null]],
                    "metadatas": [[{ "title": "B" }, null, {}]],
                    "distances": [[0.9, 0.1, 0.5]]
                }))
            }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        let hits = store.query(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.ids, vec!["a", "c"]);
        assert_eq!(hits.texts, vec!["alpha", ""]);
        assert_eq!(hits.distances, vec![0.1, 0.5]);
        assert!(hits.metadatas[0].is_empty());
    }

    #[tokio::test]
    async fn test_query_keeps_full_distance_precision() {
        let app = collections_route().route(
            &action("query"),
            post(|| async {
                Json(json!({
                    "ids": [["near"]],
                    "documents": [["text"]],
                    "metadatas": [[null]],
                    "distances": [[1.1999999999]]
                }))
            }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        let hits = store.query(&[0.0], 1).await.unwrap();
        assert_eq!(hits.distances, vec![1.1999999999]);
        assert!(hits.distances[0] < 1.2);
    }

    #[tokio::test]
    async fn test_get_all_fills_missing_cells() {
        let app = collections_route().route(
            &action("get"),
            post(|| async {
                Json(json!({
                    "ids": ["a", "b"],
                    "documents": ["alpha", "beta"],
                    "metadatas": [{ "title": "A" }, null]
                }))
            }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        let snapshot = store.get_all().await.unwrap();
        assert_eq!(snapshot.ids.len(), 2);
        assert_eq!(snapshot.metadatas[0]["title"], "A");
        assert!(snapshot.metadatas[1].is_empty());
    }

    #[tokio::test]
    async fn test_upsert_sends_single_entry() {
        let app = collections_route().route(
            &action("upsert"),
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["ids"], json!(["doc"]));
                assert_eq!(body["documents"], json!(["text"]));
                assert_eq!(body["embeddings"], json!([[0.5]]));
                assert_eq!(body["metadatas"][0]["title"], "T");
                Json(json!(true))
            }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        let metadata = json!({ "title": "T" }).as_object().cloned().unwrap();
        store.upsert("doc", "text", &[0.5], &metadata).await.unwrap();
    }

    #[tokio::test]
    async fn test_count_degrades_to_zero() {
        let app = collections_route().route(
            &action("count"),
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_count_reads_number() {
        let app = collections_route().route(&action("count"), get(|| async { Json(json!(7)) }));
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        assert_eq!(store.count().await, 7);
    }

    #[tokio::test]
    async fn test_errors_are_typed() {
        let app = collections_route()
            .route(
                &action("delete"),
                post(|| async { (StatusCode::BAD_REQUEST, "bad ids") }),
            )
            .route(
                &action("get"),
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "get exploded") }),
            );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        let err = store.delete("x").await.unwrap_err();
        assert!(matches!(err, Error::VectorStore(ref m) if m.contains("bad ids")));

        let err = store.get_all().await.unwrap_err();
        assert!(matches!(err, Error::VectorStore(ref m) if m.contains("get failed") && m.contains("get exploded")));
    }

    #[tokio::test]
    async fn test_health_uses_v2_heartbeat() {
        let app = collections_route().route(
            "/api/v2/heartbeat",
            get(|| async { Json(json!({ "nanosecond heartbeat": 1 })) }),
        );
        let base = spawn_upstream(app).await;
        let store = connect(base).await;

        assert!(store.health_check().await.unwrap());
    }
}

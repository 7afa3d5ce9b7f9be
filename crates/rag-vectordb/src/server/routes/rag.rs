//! Retrieval-augmented query endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{RagQueryRequest, RagQueryResult};

/// POST /rag/query - Answer a question from stored documents
#[utoipa::path(
    post,
    path = "/rag/query",
    tag = "rag",
    request_body = RagQueryRequest,
    responses(
        (status = 200, description = "Answer with cited sources", body = RagQueryResult),
        (status = 400, description = "Empty question or unsupported provider"),
        (status = 500, description = "OpenAI selected without an API key"),
        (status = 502, description = "Embedding service or vector database failed"),
        (status = 503, description = "LLM provider failed")
    )
)]
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<RagQueryRequest>,
) -> Result<Json<RagQueryResult>> {
    let start = Instant::now();

    let query = request
        .into_query(state.config().retrieval.default_context_limit)
        .map_err(Error::rag_query)?;

    tracing::info!("Query: \"{}\" via {}", query.question, query.provider);

    let result = state.orchestrator().query(query).await?;

    tracing::info!(
        "Answered in {}ms ({:?} mode, {} sources, {} tokens)",
        start.elapsed().as_millis(),
        result.mode,
        result.sources.len(),
        result.tokens_used
    );

    Ok(Json(result))
}

//! Document management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{
    AddDocumentRequest, CountResponse, DeleteResponse, Document, SearchRequest, SearchResult,
    UpdateDocumentRequest,
};

/// POST /documents - Store a new document
#[utoipa::path(
    post,
    path = "/documents",
    tag = "documents",
    request_body = AddDocumentRequest,
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Empty content"),
        (status = 502, description = "Embedding service or vector database failed")
    )
)]
pub async fn add_document(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<Document>)> {
    let document = state.catalog().add(&request.content, request.title).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents - List all documents
#[utoipa::path(
    get,
    path = "/documents",
    tag = "documents",
    responses((status = 200, description = "All stored documents", body = [Document]))
)]
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<Document>>> {
    Ok(Json(state.catalog().list().await?))
}

/// GET /documents/count - Number of stored documents
#[utoipa::path(
    get,
    path = "/documents/count",
    tag = "documents",
    responses((status = 200, description = "Document count, 0 when the store is unreachable", body = CountResponse))
)]
pub async fn count_documents(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.catalog().count().await,
    })
}

/// POST /documents/search - Similarity search
#[utoipa::path(
    post,
    path = "/documents/search",
    tag = "documents",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Closest documents first", body = [SearchResult]),
        (status = 400, description = "Empty query")
    )
)]
pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>> {
    let limit = request
        .limit
        .filter(|&n| n > 0)
        .unwrap_or(state.config().retrieval.default_search_limit);

    tracing::info!("Search: \"{}\" (limit {})", request.query, limit);

    Ok(Json(state.catalog().search(&request.query, limit).await?))
}

/// PUT /documents/:id - Replace content and/or title
#[utoipa::path(
    put,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Document id")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Updated document", body = Document),
        (status = 404, description = "No document with this id")
    )
)]
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>> {
    let document = state
        .catalog()
        .update(&id, request.content, request.title)
        .await?;
    Ok(Json(document))
}

/// DELETE /documents/:id - Delete a document
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Document id")),
    responses((status = 200, description = "Document deleted", body = DeleteResponse))
)]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    Ok(Json(state.catalog().delete(&id).await?))
}

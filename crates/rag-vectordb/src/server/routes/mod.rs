//! API routes for the RAG server

pub mod docs;
pub mod documents;
pub mod rag;
pub mod ui;

use axum::{
    routing::{get, post, put},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Document management
        .route(
            "/documents",
            get(documents::list_documents).post(documents::add_document),
        )
        .route("/documents/count", get(documents::count_documents))
        .route("/documents/search", post(documents::search_documents))
        .route(
            "/documents/:id",
            put(documents::update_document).delete(documents::delete_document),
        )
        // Query
        .route("/rag/query", post(rag::query_rag))
        // Docs and client
        .route("/api", get(docs::swagger_ui))
        .route("/api/openapi.json", get(docs::openapi_json))
        .route("/", get(ui::index))
}

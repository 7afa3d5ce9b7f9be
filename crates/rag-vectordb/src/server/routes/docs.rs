//! OpenAPI document and Swagger UI

use axum::{response::Html, Json};
use utoipa::OpenApi;

use crate::types::{
    AddDocumentRequest, ChatMessage, CountResponse, DeleteResponse, Document, Provider,
    QueryMode, RagQueryRequest, RagQueryResult, Role, SearchRequest, SearchResult, Source,
    UpdateDocumentRequest,
};

use super::{documents, rag};

/// OpenAPI description of every JSON endpoint
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rag-vectordb",
        description = "Document storage with vector search and retrieval-augmented answers"
    ),
    paths(
        documents::add_document,
        documents::list_documents,
        documents::count_documents,
        documents::search_documents,
        documents::update_document,
        documents::delete_document,
        rag::query_rag,
    ),
    components(schemas(
        Document,
        SearchResult,
        AddDocumentRequest,
        UpdateDocumentRequest,
        SearchRequest,
        CountResponse,
        DeleteResponse,
        RagQueryRequest,
        RagQueryResult,
        ChatMessage,
        Role,
        Provider,
        QueryMode,
        Source,
    )),
    tags(
        (name = "documents", description = "Document management and search"),
        (name = "rag", description = "Retrieval-augmented question answering")
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>rag-vectordb API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/api/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

/// GET /api - Swagger UI over `/api/openapi.json`
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_endpoint_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/documents",
            "/documents/count",
            "/documents/search",
            "/documents/{id}",
            "/rag/query",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}

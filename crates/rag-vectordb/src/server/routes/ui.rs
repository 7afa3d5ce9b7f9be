//! Single-page client

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// GET / - Document manager and chat
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

//! Response types for the HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::document::SearchResult;
use super::query::Provider;

/// Whether retrieved documents were used to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// At least one document passed the relevance threshold
    Rag,
    /// No relevant documents; the model answered from its own knowledge
    General,
}

/// A document cited in an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Source {
    /// Document id
    pub id: String,
    /// Leading characters of the document content followed by `...`
    pub content: String,
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Distance to the question embedding
    pub distance: f64,
}

impl Source {
    /// Build a source from a search hit, keeping `preview_chars` characters
    pub fn from_result(result: &SearchResult, preview_chars: usize) -> Self {
        Self {
            id: result.document.id.clone(),
            content: preview(&result.document.content, preview_chars),
            title: result.document.metadata.title.clone(),
            distance: result.distance,
        }
    }
}

/// First `max_chars` characters of `content` followed by `...`
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn preview(content: &str, max_chars: usize) -> String {
    let head: String = content.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// Answer to `POST /rag/query`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RagQueryResult {
    /// Generated answer
    pub answer: String,
    /// The question as asked
    pub question: String,
    /// Provider that produced the answer
    pub provider: Provider,
    /// Documents supplied as context
    pub sources: Vec<Source>,
    /// Total tokens reported by the provider (0 when not reported)
    pub tokens_used: u32,
    /// `rag` when context was used, `general` otherwise
    pub mode: QueryMode,
    /// System prompt sent upstream
    pub system_prompt: String,
    /// User prompt sent upstream
    pub user_prompt: String,
}

/// Answer to `DELETE /documents/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

/// Answer to `GET /documents/count`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document::Document;

    #[test]
    fn test_preview_caps_at_char_count() {
        let long = "a".repeat(250);
        let p = preview(&long, 200);
        assert_eq!(p.len(), 203);
        assert!(p.ends_with("..."));

        assert_eq!(preview("short", 200), "short...");
    }

    #[test]
    fn test_preview_multibyte() {
        let text = "é".repeat(10);
        assert_eq!(preview(&text, 3), "ééé...");
    }

    #[test]
    fn test_source_from_result() {
        let result = SearchResult {
            document: Document::new("x".repeat(300), Some("Guide".into())),
            distance: 0.42,
        };
        let source = Source::from_result(&result, 200);

        assert_eq!(source.id, result.document.id);
        assert_eq!(source.content.chars().count(), 203);
        assert_eq!(source.title.as_deref(), Some("Guide"));
        assert_eq!(source.distance, 0.42);
    }

    #[test]
    fn test_result_json_shape() {
        let result = RagQueryResult {
            answer: "42".into(),
            question: "?".into(),
            provider: Provider::Llama,
            sources: vec![],
            tokens_used: 0,
            mode: QueryMode::General,
            system_prompt: "s".into(),
            user_prompt: "u".into(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["tokensUsed"], 0);
        assert_eq!(value["mode"], "general");
        assert_eq!(value["provider"], "llama");
        assert_eq!(value["systemPrompt"], "s");
    }
}

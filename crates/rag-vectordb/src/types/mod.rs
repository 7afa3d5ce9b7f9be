//! Core types for the RAG service

pub mod document;
pub mod query;
pub mod response;

pub use document::{
    AddDocumentRequest, Document, DocumentMetadata, MetadataMap, SearchRequest, SearchResult,
    UpdateDocumentRequest,
};
pub use query::{ChatMessage, Provider, RagQuery, RagQueryRequest, Role};
pub use response::{CountResponse, DeleteResponse, QueryMode, RagQueryResult, Source};

//! RAG query request types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::Error;

/// LLM backend answering a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Hosted OpenAI-compatible chat completion API
    #[default]
    OpenAi,
    /// Locally run Ollama generation service
    Llama,
}

impl Provider {
    /// Wire name as accepted and echoed by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Llama => "llama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "llama" => Ok(Provider::Llama),
            _ => Err(Error::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when history is flattened into a single prompt
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One prior turn of the client-held conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /rag/query`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RagQueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of candidate documents to retrieve (default: 3, also used for 0)
    #[serde(default)]
    pub context_limit: Option<usize>,

    /// `openai` (default) or `llama`
    #[serde(default)]
    pub provider: Option<String>,

    /// Prior conversation, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// Validated query handed to the orchestrator
#[derive(Debug, Clone)]
pub struct RagQuery {
    pub question: String,
    pub context_limit: usize,
    pub provider: Provider,
    pub history: Vec<ChatMessage>,
}

impl RagQuery {
    /// Create a query with the default provider and no history
    pub fn new(question: impl Into<String>, context_limit: usize) -> Self {
        Self {
            question: question.into(),
            context_limit,
            provider: Provider::default(),
            history: Vec::new(),
        }
    }

    /// Select the provider
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Attach prior conversation
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }
}

impl RagQueryRequest {
    /// Validate the request, filling defaults for omitted fields
    pub fn into_query(self, default_context_limit: usize) -> Result<RagQuery, Error> {
        if self.question.trim().is_empty() {
            return Err(Error::invalid("question must not be empty"));
        }

        let context_limit = self
            .context_limit
            .filter(|&n| n > 0)
            .unwrap_or(default_context_limit);

        let provider = match self.provider.as_deref() {
            None => Provider::default(),
            Some(name) if name.trim().is_empty() => Provider::default(),
            Some(name) => name.parse()?,
        };

        Ok(RagQuery {
            question: self.question,
            context_limit,
            provider,
            history: self.conversation_history,
        })
    }
}

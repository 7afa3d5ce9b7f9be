//! Prompt templates for RAG generation

use crate::types::{ChatMessage, QueryMode, SearchResult};

/// System prompt when no stored document is relevant
pub const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer questions using your knowledge.
If you're not certain about something, acknowledge it.";

/// System prompt when retrieved documents are supplied as context
pub const RAG_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions using both your general knowledge and the provided context from a knowledge base.

When answering:
1. Prioritize information from the provided documents when relevant
2. You can also use your general knowledge to provide comprehensive answers
3. If you use information from the documents, cite them (e.g., \"According to Document 1...\")
4. If the documents don't fully answer the question, supplement with your knowledge
5. Be clear about what comes from the documents vs. your general knowledge";

/// An assembled prompt, ready for any provider
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// System instructions
    pub system: String,
    /// Final user turn (the question, possibly preceded by context)
    pub user: String,
    /// Prior conversation, already windowed, oldest first
    pub history: Vec<ChatMessage>,
}

impl Prompt {
    /// Collapse into one completion-style prompt for providers without a
    /// message list
    pub fn flatten(&self) -> String {
        let mut conversation = self
            .history
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        if !conversation.is_empty() {
            conversation.push_str("\n\n");
        }

        format!(
            "{}\n\nConversation History:\n{}{}",
            self.system, conversation, self.user
        )
    }
}

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from relevant search results
    ///
    /// Blocks are numbered from 1 and tagged with the title when present.
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| match result.document.title() {
                Some(title) => format!("[Document {}: {}]\n{}", i + 1, title, result.document.content),
                None => format!("[Document {}]\n{}", i + 1, result.document.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Most recent `window` messages, oldest first
    pub fn window_history(history: &[ChatMessage], window: usize) -> Vec<ChatMessage> {
        let start = history.len().saturating_sub(window);
        history[start..].to_vec()
    }

    /// Assemble the prompt for `question`
    ///
    /// With no relevant documents the question goes out as-is under the
    /// general system prompt.
    pub fn build(
        question: &str,
        relevant: &[SearchResult],
        history: &[ChatMessage],
        window: usize,
    ) -> (Prompt, QueryMode) {
        let history = Self::window_history(history, window);

        if relevant.is_empty() {
            let prompt = Prompt {
                system: GENERAL_SYSTEM_PROMPT.to_string(),
                user: question.to_string(),
                history,
            };
            return (prompt, QueryMode::General);
        }

        let prompt = Prompt {
            system: RAG_SYSTEM_PROMPT.to_string(),
            user: format!(
                "Context from knowledge base:\n{}\n\nQuestion: {}",
                Self::build_context(relevant),
                question
            ),
            history,
        };
        (prompt, QueryMode::Rag)
    }
}

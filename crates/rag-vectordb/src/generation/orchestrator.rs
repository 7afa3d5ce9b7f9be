//! Retrieval-augmented query pipeline
//!
//! embed question -> nearest documents -> distance filter -> prompt ->
//! provider -> normalized result. Stateless per call.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::DocumentCatalog;
use crate::types::{Provider, RagQuery, RagQueryResult, SearchResult, Source};

use super::prompt::PromptBuilder;

/// Answers questions from stored documents through the selected provider
#[derive(Clone)]
pub struct RagOrchestrator {
    catalog: DocumentCatalog,
    openai: Arc<dyn LlmProvider>,
    llama: Arc<dyn LlmProvider>,
    retrieval: RetrievalConfig,
}

/// Keep results strictly closer than `threshold`
pub fn filter_relevant(results: Vec<SearchResult>, threshold: f64) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| r.distance < threshold)
        .collect()
}

impl RagOrchestrator {
    pub fn new(
        catalog: DocumentCatalog,
        openai: Arc<dyn LlmProvider>,
        llama: Arc<dyn LlmProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            catalog,
            openai,
            llama,
            retrieval,
        }
    }

    fn provider(&self, provider: Provider) -> &dyn LlmProvider {
        match provider {
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Llama => self.llama.as_ref(),
        }
    }

    /// Answer a query
    ///
    /// Any failure along the way comes back as [`Error::RagQuery`].
    pub async fn query(&self, query: RagQuery) -> Result<RagQueryResult> {
        self.run(query).await.map_err(|e| {
            tracing::error!("RAG query failed: {}", e);
            Error::rag_query(e)
        })
    }

    async fn run(&self, query: RagQuery) -> Result<RagQueryResult> {
        let candidates = self
            .catalog
            .search(&query.question, query.context_limit)
            .await?;
        let candidate_count = candidates.len();
        let relevant = filter_relevant(candidates, self.retrieval.relevance_threshold);

        let (prompt, mode) = PromptBuilder::build(
            &query.question,
            &relevant,
            &query.history,
            self.retrieval.history_window,
        );

        let llm = self.provider(query.provider);
        tracing::info!(
            "Query via {} ({}): {}/{} documents relevant, {} history messages",
            query.provider,
            llm.model(),
            relevant.len(),
            candidate_count,
            prompt.history.len()
        );

        let completion = llm.complete(&prompt).await?;

        let sources = relevant
            .iter()
            .map(|r| Source::from_result(r, self.retrieval.source_preview_chars))
            .collect();

        Ok(RagQueryResult {
            answer: completion.answer,
            question: query.question,
            provider: query.provider,
            sources,
            tokens_used: completion.tokens_used,
            mode,
            system_prompt: prompt.system,
            user_prompt: prompt.user,
        })
    }
}

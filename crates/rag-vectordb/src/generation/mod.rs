//! Prompt assembly and the query pipeline

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{filter_relevant, RagOrchestrator};
pub use prompt::{Prompt, PromptBuilder};

//! Structured summary generation.

use crate::config::Prompts;
use crate::error::Result;
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Turns research content into an eight-section academic summary with one model call.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the prompt sent to the model.
    pub fn prompt(&self, content: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), content.to_string());
        self.prompts
            .render_with_custom(&self.prompts.summarizer.template, &vars)
    }

    /// Summarize content. Model failures propagate unchanged.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn summarize(&self, content: &str) -> Result<String> {
        info!("Summarizing with {}", self.model.model());
        self.model.complete(&self.prompt(content)).await
    }
}

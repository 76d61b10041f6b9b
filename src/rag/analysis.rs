//! Legal section analysis over retrieved statute context.

use super::{ContextBuilder, RetrievedSection};
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{NyayError, Result};
use crate::generation::Generator;
use crate::vector_store::VectorStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of analysing an incident description.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Raw model output.
    pub analysis: String,
    /// Sections that were placed in the prompt.
    pub sections: Vec<RetrievedSection>,
}

/// Answers "which sections apply?" for a free-text incident.
pub struct LegalAnalyzer {
    context_builder: ContextBuilder,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl LegalAnalyzer {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        collection: &str,
        top_k: usize,
    ) -> Self {
        Self {
            context_builder: ContextBuilder::new(vector_store, embedder, collection)
                .with_top_k(top_k),
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the analysis prompt for a query and its context text.
    pub fn render_prompt(&self, query: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("query".to_string(), query.to_string());
        self.prompts
            .render_with_custom(&self.prompts.analysis.template, &vars)
    }

    /// Retrieve relevant sections and ask the model which ones apply.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn analyze(&self, query: &str) -> Result<Analysis> {
        if query.trim().is_empty() {
            return Err(NyayError::InvalidInput("query must not be empty".to_string()));
        }

        let context = self.context_builder.build(query).await?;

        info!("Generating response with {}", self.generator.model());
        let prompt = self.render_prompt(query, &context.text);
        let analysis = self.generator.generate(&prompt).await?;
        info!("Received response from model");

        Ok(Analysis {
            analysis,
            sections: context.sections,
        })
    }
}

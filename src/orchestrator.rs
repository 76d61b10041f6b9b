//! Component wiring for Nyay.
//!
//! Builds the embedder, generator, vector store and prompts once from
//! settings and hands out the pipelines that use them.

use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::generation::{create_generator, Generator};
use crate::ingest::Ingestor;
use crate::rag::{ContextBuilder, FirDrafter, LegalAnalyzer};
use crate::vector_store::{create_vector_store, VectorStore};
use std::sync::Arc;
use tracing::info;

/// Owns the shared components of the ingestion and query pipelines.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    vector_store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Create an orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "Using {} embeddings ({}) and {} generation ({})",
            settings.embedding.provider,
            settings.embedding.model,
            settings.generation.provider,
            settings.generation.model
        );

        let embedder = create_embedder(&settings)?;
        let generator = create_generator(&settings)?;
        let vector_store = create_vector_store(&settings)?;

        Ok(Self {
            settings,
            prompts,
            embedder,
            generator,
            vector_store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            generator,
            vector_store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Name of the collection queries and ingestion target.
    pub fn collection(&self) -> &str {
        &self.settings.vector_store.collection
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.embedder.clone(), self.vector_store.clone())
            .with_id_prefix(&self.settings.ingest.id_prefix)
    }

    /// Retrieval only, with an optional top-k override.
    pub fn context_builder(&self, top_k: Option<usize>) -> ContextBuilder {
        ContextBuilder::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            self.collection(),
        )
        .with_top_k(top_k.unwrap_or(self.settings.retrieval.top_k))
    }

    pub fn analyzer(&self, top_k: Option<usize>) -> LegalAnalyzer {
        LegalAnalyzer::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            self.generator.clone(),
            self.collection(),
            top_k.unwrap_or(self.settings.retrieval.top_k),
        )
        .with_prompts(self.prompts.clone())
    }

    pub fn fir_drafter(&self) -> FirDrafter {
        FirDrafter::new(self.generator.clone()).with_prompts(self.prompts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tests::{KeywordEmbedder, STATUTES};
    use crate::rag::tests::RecordingGenerator;
    use crate::rag::FirData;
    use crate::vector_store::MemoryVectorStore;

    fn orchestrator(settings: Settings, generator: Arc<RecordingGenerator>) -> Orchestrator {
        Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(KeywordEmbedder::new(vec!["murder", "theft", "cheat"])),
            generator,
            Arc::new(MemoryVectorStore::new()),
        )
    }

    #[tokio::test]
    async fn test_ingest_then_analyze_uses_configured_collection() {
        let mut settings = Settings::default();
        settings.vector_store.collection = "bns".to_string();
        settings.ingest.id_prefix = "bns".to_string();
        settings.retrieval.top_k = 1;

        let generator = Arc::new(RecordingGenerator::new("Section 420 applies."));
        let orchestrator = orchestrator(settings, generator.clone());

        let report = orchestrator
            .ingestor()
            .ingest_text(STATUTES, orchestrator.collection())
            .await
            .unwrap();
        assert_eq!(report.collection, "bns");

        let analysis = orchestrator
            .analyzer(None)
            .analyze("he tried to cheat me")
            .await
            .unwrap();
        assert_eq!(analysis.sections.len(), 1);
        assert_eq!(analysis.sections[0].id, "bns_420");
    }

    #[tokio::test]
    async fn test_custom_prompt_variables_reach_fir_prompt() {
        let generator = Arc::new(RecordingGenerator::new("FIR"));
        let mut prompts = Prompts::default();
        prompts.fir.template = "{{station_code}} / {{police_station}}".to_string();
        prompts
            .variables
            .insert("station_code".to_string(), "PS-17".to_string());

        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            prompts,
            Arc::new(KeywordEmbedder::new(vec!["x"])),
            generator.clone(),
            Arc::new(MemoryVectorStore::new()),
        );

        orchestrator
            .fir_drafter()
            .draft(&FirData::default())
            .await
            .unwrap();
        assert_eq!(generator.last_prompt().unwrap(), "PS-17 / (Not specified)");
    }

    #[test]
    fn test_top_k_override() {
        let orchestrator = orchestrator(Settings::default(), Arc::new(RecordingGenerator::new("")));
        assert_eq!(orchestrator.context_builder(None).top_k(), 3);
        assert_eq!(orchestrator.context_builder(Some(7)).top_k(), 7);
    }
}

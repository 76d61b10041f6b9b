//! Gemini embeddings implementation.

use super::Embedder;
use crate::config::Settings;
use crate::error::Result;
use crate::gemini::{GeminiClient, TaskType};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Upper bound on texts per batchEmbedContents call.
const MAX_BATCH_SIZE: usize = 100;

/// Gemini-based embedder.
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    batch_size: usize,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder.
    pub fn new(client: GeminiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Create an embedder from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(GeminiClient::from_settings(settings)?, &settings.embedding.model)
            .with_batch_size(settings.ingest.batch_size))
    }

    /// Set the number of texts sent per request (clamped to 1..=100).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed_content(&self.model, text, TaskType::RetrievalQuery)
            .await
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self
                .client
                .batch_embed_contents(&self.model, chunk, TaskType::RetrievalDocument)
                .await?;
            all_embeddings.extend(embeddings);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        0
    }
}

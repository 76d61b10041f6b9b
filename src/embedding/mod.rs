//! Embedding generation for semantic search and retrieval.

mod gemini;
mod openai;

pub use gemini::GeminiEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{Provider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
///
/// Providers that distinguish query and document embeddings use the
/// query flavour for `embed` and the document flavour for `embed_batch`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a search query.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for documents being indexed, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions (0 when the model decides).
    fn dimensions(&self) -> usize;
}

/// Build the embedder selected in settings.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.embedding.provider {
        Provider::Gemini => Arc::new(GeminiEmbedder::from_settings(settings)?),
        Provider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?),
    };
    Ok(embedder)
}

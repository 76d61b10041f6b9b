//! Text generation against hosted language models.

mod gemini;
mod openai;

pub use gemini::GeminiGenerator;
pub use openai::OpenAIGenerator;

use crate::config::{Provider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for single-prompt text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Submit a fully rendered prompt and return the model's raw text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Build the generator selected in settings.
pub fn create_generator(settings: &Settings) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match settings.generation.provider {
        Provider::Gemini => Arc::new(GeminiGenerator::from_settings(settings)?),
        Provider::OpenAI => Arc::new(
            OpenAIGenerator::new(&settings.generation.model)?
                .with_temperature(settings.generation.temperature),
        ),
    };
    Ok(generator)
}

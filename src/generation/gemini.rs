//! Gemini text generation.

use super::Generator;
use crate::config::Settings;
use crate::error::Result;
use crate::gemini::GeminiClient;
use async_trait::async_trait;
use tracing::instrument;

/// Generator backed by Gemini's generateContent.
pub struct GeminiGenerator {
    client: GeminiClient,
    model: String,
    temperature: Option<f32>,
}

impl GeminiGenerator {
    pub fn new(client: GeminiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: None,
        }
    }

    /// Create a generator from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(
            Self::new(GeminiClient::from_settings(settings)?, &settings.generation.model)
                .with_temperature(settings.generation.temperature),
        )
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .generate_content(&self.model, prompt, self.temperature)
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

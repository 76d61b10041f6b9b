//! Configuration module for Nyay.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, FirPrompts, Prompts};
pub use settings::{
    EmbeddingSettings, GeminiSettings, GeneralSettings, GenerationSettings, IngestSettings,
    PromptSettings, Provider, RetrievalSettings, ServerSettings, Settings, VectorStoreSettings,
    GEMINI_API_KEY_ENV, PORT_ENV,
};

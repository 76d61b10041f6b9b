//! Retrieval-augmented legal analysis and FIR drafting.
//!
//! The analysis path embeds an incident description, pulls the nearest
//! statute sections from the vector store and asks the generator which of
//! them apply. FIR drafting skips retrieval and only fills a template.

mod analysis;
pub mod context;
mod fir;

pub use analysis::{Analysis, LegalAnalyzer};
pub use context::{ContextBuilder, RetrievedContext, NO_SECTIONS_FOUND};
pub use fir::{Accused, Complainant, FirData, FirDrafter, Incident};

use crate::vector_store::SearchResult;
use serde::Serialize;

/// A statute section returned by retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedSection {
    /// Document id (e.g. `ipc_379`).
    pub id: String,
    /// Full section text as stored.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for RetrievedSection {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.document.id,
            content: result.document.content,
            score: result.score,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::error::{NyayError, Result};
    use crate::generation::Generator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned reply and remembers the last prompt it saw.
    pub(crate) struct RecordingGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingGenerator {
        pub(crate) fn new(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| NyayError::Generation("quota exceeded".to_string()))
        }

        fn model(&self) -> &str {
            "recording"
        }
    }
}

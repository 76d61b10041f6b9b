//! Pre-flight checks before expensive operations.
//!
//! Validates that provider credentials are available before starting
//! operations that would otherwise fail midway.

use crate::config::{Provider, Settings};
use crate::error::{NyayError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion embeds every section.
    Ingest,
    /// Analysis embeds the query and calls the generator.
    Analyze,
    /// Search only embeds the query.
    Search,
    /// FIR drafting only calls the generator.
    Fir,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let providers = match operation {
        Operation::Ingest | Operation::Search => vec![settings.embedding.provider],
        Operation::Analyze => vec![settings.embedding.provider, settings.generation.provider],
        Operation::Fir => vec![settings.generation.provider],
    };

    for provider in providers {
        match provider {
            Provider::Gemini => check_gemini_key(settings)?,
            Provider::OpenAI => check_env_key("OPENAI_API_KEY", "sk-...")?,
        }
    }
    Ok(())
}

fn check_gemini_key(settings: &Settings) -> Result<()> {
    if settings.gemini_api_key().is_some() {
        return Ok(());
    }
    Err(NyayError::Config(
        "GEMINI_API_KEY not set. Set it with: export GEMINI_API_KEY='...' or add it to .env"
            .to_string(),
    ))
}

fn check_env_key(name: &str, example: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(NyayError::Config(format!(
            "{} is empty. Set it with: export {}='{}'",
            name, name, example
        ))),
        Err(_) => Err(NyayError::Config(format!(
            "{} not set. Set it with: export {}='{}'",
            name, name, example
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_key_from_settings() {
        let mut settings = Settings::default();
        settings.gemini.api_key = Some("test-key".to_string());
        assert!(check(Operation::Analyze, &settings).is_ok());
        assert!(check(Operation::Fir, &settings).is_ok());
    }

    #[test]
    fn test_blank_gemini_key_fails() {
        let mut settings = Settings::default();
        settings.gemini.api_key = Some("   ".to_string());
        let err = check(Operation::Search, &settings).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}

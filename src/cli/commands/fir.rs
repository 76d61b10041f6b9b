//! FIR command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::FirData;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the fir command.
pub async fn run_fir(input: &Path, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Fir, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let body: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    let data = FirData::from_request(body)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Drafting FIR...");
    let result = orchestrator.fir_drafter().draft(&data).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => println!("{}", text),
        Err(e) => {
            Output::error(&format!("Failed to draft FIR: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

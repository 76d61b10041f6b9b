//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::context::format_context_for_display;
use anyhow::Result;

/// Run the analyze command.
pub async fn run_analyze(query: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let analyzer = orchestrator.analyzer(top_k);

    let spinner = Output::spinner("Searching statutes...");

    match analyzer.analyze(query).await {
        Ok(result) => {
            spinner.finish_and_clear();

            println!("\n{}\n", result.analysis);

            if result.sections.is_empty() {
                Output::warning("No sections were retrieved; the answer used no statute context.");
            } else {
                Output::header("Retrieved sections");
                println!("{}", format_context_for_display(&result.sections));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to analyse query: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

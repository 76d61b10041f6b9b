//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the ingest command.
pub async fn run_ingest(
    data: Option<PathBuf>,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let data_path = data.unwrap_or_else(|| settings.data_path());
    let collection = collection.unwrap_or_else(|| settings.vector_store.collection.clone());

    let orchestrator = Orchestrator::new(settings)?;

    Output::info(&format!("Loading data from {}", data_path.display()));
    let spinner = Output::spinner("Parsing and embedding statute sections...");

    let result = orchestrator.ingestor().run(&data_path, &collection).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if report.replaced_existing {
                Output::warning(&format!("Replaced existing collection '{}'", report.collection));
            }
            Output::success(&format!(
                "Added {} of {} sections to '{}'",
                report.documents_added, report.sections_parsed, report.collection
            ));
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

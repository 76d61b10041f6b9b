//! Collections command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::create_vector_store;
use anyhow::Result;

/// Run the collections command.
pub async fn run_collections(settings: Settings) -> Result<()> {
    let store = create_vector_store(&settings)?;
    let collections = store.list_collections().await?;

    if collections.is_empty() {
        Output::info("No collections yet. Run 'nyay ingest' to build one.");
        return Ok(());
    }

    Output::header(&format!("Collections ({})", collections.len()));
    for info in &collections {
        Output::list_item(&format!(
            "{} ({} sections, created {})",
            info.name,
            info.document_count,
            info.created_at.format("%Y-%m-%d %H:%M")
        ));
    }

    Ok(())
}

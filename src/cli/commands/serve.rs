//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server::{build_router, AppState};
use std::sync::Arc;
use tracing::warn;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if settings.gemini_api_key().is_none() {
        warn!("GEMINI_API_KEY not found; Gemini calls will fail until it is set");
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings.clone())?;
    let collection = orchestrator.collection().to_string();
    match orchestrator.vector_store().has_collection(&collection).await {
        Ok(true) => {}
        Ok(false) => warn!(
            "Collection {} not found. Run 'nyay ingest' first; analysis will use no context.",
            collection
        ),
        Err(e) => warn!("Could not inspect vector store: {}", e),
    }

    let state = Arc::new(AppState {
        analyzer: orchestrator.analyzer(None),
        fir_drafter: orchestrator.fir_drafter(),
    });

    let app = build_router(state, &settings.server)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Nyay API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze");
    Output::kv("Generate FIR", "POST /generate-fir");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

//! Nyay CLI entry point.

use anyhow::Result;
use clap::Parser;
use nyay::cli::{commands, log_filter, Cli, Commands};
use nyay::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets and PORT may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            log_filter(cli.verbose, &settings.general.log_level)
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ingest { data, collection } => {
            commands::run_ingest(data, collection, settings).await?;
        }

        Commands::Analyze { query, top_k } => {
            commands::run_analyze(&query, top_k, settings).await?;
        }

        Commands::Search { query, top_k } => {
            commands::run_search(&query, top_k, settings).await?;
        }

        Commands::Fir { input } => {
            commands::run_fir(&input, settings).await?;
        }

        Commands::Collections => {
            commands::run_collections(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}

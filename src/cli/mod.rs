//! CLI module for Nyay.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nyay - legal section lookup and FIR drafting
///
/// Indexes a statute file into a local vector store, answers "which sections
/// apply?" for an incident description, and drafts First Information Reports.
#[derive(Parser, Debug)]
#[command(name = "nyay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Parse the statute file, embed every section and replace the collection
    Ingest {
        /// Statute text file (defaults to ingest.data_path)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Target collection (defaults to vector_store.collection)
        #[arg(long)]
        collection: Option<String>,
    },

    /// Analyse an incident and list the sections that may apply
    Analyze {
        /// Incident description
        query: String,

        /// Number of sections to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show the nearest statute sections without calling the generator
    Search {
        /// Search query
        query: String,

        /// Number of sections to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Draft an FIR from a JSON file of form data
    Fir {
        /// JSON file, either {"firData": {...}} or the FIR object itself
        input: PathBuf,
    },

    /// List vector store collections
    Collections,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Log filter for the nyay crate: -v flags win, otherwise the configured level.
pub fn log_filter(verbose: u8, configured: &str) -> String {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("nyay={}", level)
}

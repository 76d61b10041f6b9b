//! Nyay - statute retrieval and FIR drafting
//!
//! A retrieval-augmented backend for a legal assistant. It indexes a statute
//! file into a local vector store and uses a hosted model to answer
//! "which sections apply?" and to draft First Information Reports.
//!
//! The name "Nyay" is the Hindi word for "justice."
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `gemini` - Gemini REST client (embeddings and generation)
//! - `embedding` - Embedding providers
//! - `generation` - Text generation providers
//! - `vector_store` - Named document collections with similarity search
//! - `statutes` - Statute section parser
//! - `ingest` - Batch ingestion of a statute file
//! - `rag` - Legal analysis and FIR drafting
//! - `orchestrator` - Component wiring
//! - `server` - HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use nyay::config::Settings;
//! use nyay::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator
//!         .ingestor()
//!         .run(&orchestrator.settings().data_path(), orchestrator.collection())
//!         .await?;
//!     println!("Indexed {} sections", report.documents_added);
//!
//!     let result = orchestrator
//!         .analyzer(None)
//!         .analyze("Someone broke into my house at night and took my laptop")
//!         .await?;
//!     println!("{}", result.analysis);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod server;
pub mod statutes;
pub mod vector_store;

pub use error::{NyayError, Result};

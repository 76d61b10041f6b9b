//! CLI command implementations.

mod analyze;
mod collections;
mod config;
mod fir;
mod ingest;
mod search;
mod serve;

pub use analyze::run_analyze;
pub use collections::run_collections;
pub use config::run_config;
pub use fir::run_fir;
pub use ingest::run_ingest;
pub use search::run_search;
pub use serve::run_serve;

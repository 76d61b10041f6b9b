//! Vector store abstraction for Nyay.
//!
//! Documents live in named collections. A collection is created once by
//! ingestion and queried by nearest-neighbour search at request time.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::{NyayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A document stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within its collection (e.g. `ipc_302`).
    pub id: String,
    /// Text content.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create an empty collection. Fails if it already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection and its documents. Returns false if it did not exist.
    async fn delete_collection(&self, name: &str) -> Result<bool>;

    /// Check whether a collection exists.
    async fn has_collection(&self, name: &str) -> Result<bool>;

    /// List all collections.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Add documents to an existing collection.
    ///
    /// Ids must be unique within the batch and not already present.
    /// Either every document is added or none is.
    async fn add(&self, collection: &str, docs: &[Document]) -> Result<usize>;

    /// Return up to `limit` documents ordered by similarity, best first.
    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of documents in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Build the vector store selected in settings.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
        "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
        "memory" => Arc::new(MemoryVectorStore::new()),
        other => {
            return Err(NyayError::Config(format!(
                "Unknown vector store provider: {}",
                other
            )))
        }
    };
    Ok(store)
}

/// Reject batches that repeat an id.
pub(crate) fn check_unique_ids(docs: &[Document]) -> Result<()> {
    let mut seen = HashSet::with_capacity(docs.len());
    for doc in docs {
        if !seen.insert(doc.id.as_str()) {
            return Err(NyayError::VectorStore(format!(
                "Duplicate document id in batch: {}",
                doc.id
            )));
        }
    }
    Ok(())
}

/// Sort by score descending and keep the best `limit`.
pub(crate) fn rank(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
    results.truncate(limit);
    results
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

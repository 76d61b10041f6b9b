//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets. Nothing survives the process.

use super::{
    check_unique_ids, cosine_similarity, rank, CollectionInfo, Document, SearchResult, VectorStore,
};
use crate::error::{NyayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Collection {
    created_at: DateTime<Utc>,
    documents: HashMap<String, Document>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Collection>>> {
        self.collections
            .read()
            .map_err(|e| NyayError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Collection>>> {
        self.collections
            .write()
            .map_err(|e| NyayError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.write()?;
        if collections.contains_key(name) {
            return Err(NyayError::VectorStore(format!(
                "Collection already exists: {}",
                name
            )));
        }
        collections.insert(
            name.to_string(),
            Collection {
                created_at: Utc::now(),
                documents: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        Ok(self.write()?.remove(name).is_some())
    }

    async fn has_collection(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        Ok(self
            .read()?
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                document_count: c.documents.len(),
                created_at: c.created_at,
            })
            .collect())
    }

    async fn add(&self, collection: &str, docs: &[Document]) -> Result<usize> {
        check_unique_ids(docs)?;

        let mut collections = self.write()?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| NyayError::CollectionNotFound(collection.to_string()))?;

        if let Some(existing) = docs.iter().find(|d| target.documents.contains_key(&d.id)) {
            return Err(NyayError::VectorStore(format!(
                "Document id already exists in {}: {}",
                collection, existing.id
            )));
        }

        for doc in docs {
            target.documents.insert(doc.id.clone(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.read()?;
        let target = collections
            .get(collection)
            .ok_or_else(|| NyayError::CollectionNotFound(collection.to_string()))?;

        let results = target
            .documents
            .values()
            .map(|doc| SearchResult {
                document: doc.clone(),
                score: cosine_similarity(query_embedding, &doc.embedding),
            })
            .collect();

        Ok(rank(results, limit))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.read()?
            .get(collection)
            .map(|c| c.documents.len())
            .ok_or_else(|| NyayError::CollectionNotFound(collection.to_string()))
    }
}

//! Context building for RAG responses.

use super::RetrievedSection;
use crate::embedding::Embedder;
use crate::error::{NyayError, Result};
use crate::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Context text used when retrieval yields nothing.
pub const NO_SECTIONS_FOUND: &str = "No specific legal sections found in the database.";

/// Sections retrieved for a query, plus the text handed to the prompt.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub sections: Vec<RetrievedSection>,
    pub text: String,
}

impl RetrievedContext {
    fn from_sections(sections: Vec<RetrievedSection>) -> Self {
        let text = format_context_for_prompt(&sections);
        Self { sections, text }
    }
}

/// Builds context from search results for RAG.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    top_k: usize,
}

impl ContextBuilder {
    /// Create a new context builder over `collection`.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: &str,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            collection: collection.to_string(),
            top_k: 3,
        }
    }

    /// Set how many sections are retrieved.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query and fetch the nearest sections.
    ///
    /// Embedding failures propagate. A missing collection or a store
    /// failure is logged and treated as an empty result so the caller can
    /// still answer with the fallback context.
    #[instrument(skip(self, query), fields(collection = %self.collection, top_k = self.top_k))]
    pub async fn build(&self, query: &str) -> Result<RetrievedContext> {
        info!("Embedding user query");
        let query_embedding = self.embedder.embed(query).await?;

        info!("Retrieving relevant sections");
        let results = match self
            .vector_store
            .query(&self.collection, &query_embedding, self.top_k)
            .await
        {
            Ok(results) => results,
            Err(NyayError::CollectionNotFound(name)) => {
                error!("Collection {} not found. Run the ingest command first.", name);
                Vec::new()
            }
            Err(e) => {
                error!("Error querying vector database: {}", e);
                Vec::new()
            }
        };

        if results.is_empty() {
            warn!("No relevant documents found");
        } else {
            info!("Context retrieved successfully ({} sections)", results.len());
        }

        Ok(RetrievedContext::from_sections(
            results.into_iter().map(RetrievedSection::from).collect(),
        ))
    }
}

/// Join section texts with blank lines, or the fallback when empty.
pub fn format_context_for_prompt(sections: &[RetrievedSection]) -> String {
    if sections.is_empty() {
        return NO_SECTIONS_FOUND.to_string();
    }

    sections
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format sections for display to the user.
pub fn format_context_for_display(sections: &[RetrievedSection]) -> String {
    sections
        .iter()
        .map(|s| format!("{} (score: {:.2})", s.id, s.score))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tests::{KeywordEmbedder, STATUTES};
    use crate::ingest::Ingestor;
    use crate::vector_store::MemoryVectorStore;

    async fn seeded_store() -> (Arc<KeywordEmbedder>, Arc<MemoryVectorStore>) {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["murder", "theft", "cheat"]));
        let store = Arc::new(MemoryVectorStore::new());
        Ingestor::new(embedder.clone(), store.clone())
            .ingest_text(STATUTES, "ipc")
            .await
            .unwrap();
        (embedder, store)
    }

    #[tokio::test]
    async fn test_build_joins_with_blank_lines() {
        let (embedder, store) = seeded_store().await;
        let builder = ContextBuilder::new(store, embedder, "ipc").with_top_k(2);

        let context = builder.build("my bicycle was stolen, it was theft").await.unwrap();
        assert_eq!(context.sections.len(), 2);
        assert_eq!(context.sections[0].id, "ipc_378");

        let parts: Vec<&str> = context.text.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Section 378: Theft."));
    }

    #[tokio::test]
    async fn test_missing_collection_falls_back() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["theft"]));
        let store = Arc::new(MemoryVectorStore::new());
        let builder = ContextBuilder::new(store, embedder, "ipc");

        let context = builder.build("theft").await.unwrap();
        assert!(context.sections.is_empty());
        assert_eq!(context.text, NO_SECTIONS_FOUND);
    }

    #[tokio::test]
    async fn test_empty_collection_falls_back() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["theft"]));
        let store = Arc::new(MemoryVectorStore::new());
        store.create_collection("ipc").await.unwrap();

        let context = ContextBuilder::new(store, embedder, "ipc")
            .build("theft")
            .await
            .unwrap();
        assert_eq!(context.text, NO_SECTIONS_FOUND);
    }

    #[test]
    fn test_format_for_display() {
        let sections = vec![RetrievedSection {
            id: "ipc_379".to_string(),
            content: "Section 379".to_string(),
            score: 0.876,
        }];
        assert_eq!(format_context_for_display(&sections), "ipc_379 (score: 0.88)");
    }
}

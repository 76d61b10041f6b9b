//! One-shot batch ingestion of a statute file into a vector collection.

use crate::embedding::Embedder;
use crate::error::{NyayError, Result};
use crate::statutes::{SectionParser, StatuteSection};
use crate::vector_store::{Document, VectorStore};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub sections_parsed: usize,
    pub documents_added: usize,
    /// Whether an older collection of the same name was dropped.
    pub replaced_existing: bool,
}

/// Parses, embeds and loads statute sections.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    parser: SectionParser,
    id_prefix: String,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            vector_store,
            parser: SectionParser::new(),
            id_prefix: "ipc".to_string(),
        }
    }

    /// Set the prefix used to build section ids.
    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    /// Ingest the statute file at `data_path` into `collection`.
    #[instrument(skip(self), fields(path = %data_path.display()))]
    pub async fn run(&self, data_path: &Path, collection: &str) -> Result<IngestReport> {
        info!("Loading data from {}", data_path.display());
        let raw = std::fs::read_to_string(data_path).map_err(|e| {
            NyayError::Io(std::io::Error::new(
                e.kind(),
                format!("Data file not found at {}: {}", data_path.display(), e),
            ))
        })?;

        self.ingest_text(&raw, collection).await
    }

    /// Ingest already-loaded statute text into `collection`.
    #[instrument(skip(self, raw))]
    pub async fn ingest_text(&self, raw: &str, collection: &str) -> Result<IngestReport> {
        let sections = self.parser.parse(raw);
        info!("Parsed {} sections", sections.len());

        if sections.is_empty() {
            return Err(NyayError::Parse(
                "No sections found; expected lines like 'Section 302: Title'".to_string(),
            ));
        }
        self.check_unique_numbers(&sections)?;

        let texts: Vec<String> = sections.iter().map(StatuteSection::document).collect();

        info!("Generating embeddings for {} sections", texts.len());
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(NyayError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        info!("Embeddings generated successfully");

        let documents: Vec<Document> = sections
            .iter()
            .zip(texts)
            .zip(embeddings)
            .map(|((section, text), embedding)| {
                Document::new(section.id(&self.id_prefix), text, embedding)
            })
            .collect();

        let replaced_existing = self.vector_store.delete_collection(collection).await?;
        if replaced_existing {
            warn!("Replaced existing collection {}", collection);
        }

        self.vector_store.create_collection(collection).await?;
        let documents_added = self.vector_store.add(collection, &documents).await?;
        let stored = self.vector_store.count(collection).await?;

        info!("Successfully added {} documents to {}", stored, collection);

        Ok(IngestReport {
            collection: collection.to_string(),
            sections_parsed: sections.len(),
            documents_added,
            replaced_existing,
        })
    }

    fn check_unique_numbers(&self, sections: &[StatuteSection]) -> Result<()> {
        let mut seen = HashSet::new();
        for section in sections {
            if !seen.insert(section.number.as_str()) {
                return Err(NyayError::Parse(format!(
                    "Section {} appears more than once",
                    section.number
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as keyword hits so similarity is predictable.
    pub(crate) struct KeywordEmbedder {
        pub keywords: Vec<&'static str>,
        pub batch_calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        pub(crate) fn new(keywords: Vec<&'static str>) -> Self {
            Self {
                keywords,
                batch_calls: AtomicUsize::new(0),
            }
        }

        fn vector(&self, text: &str) -> Vec<f32> {
            let lower = text.to_lowercase();
            self.keywords
                .iter()
                .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self.vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| self.vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            self.keywords.len()
        }
    }

    pub(crate) const STATUTES: &str = "Section 302: Punishment for murder\n\
Whoever commits murder shall be punished with death.\n\
Section 378: Theft\n\
Whoever dishonestly takes movable property commits theft.\n\
Section 420: Cheating\n\
Whoever cheats and dishonestly induces delivery of property.\n";

    #[tokio::test]
    async fn test_ingest_text() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["murder", "theft", "cheat"]));
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(embedder.clone(), store.clone());

        let report = ingestor.ingest_text(STATUTES, "ipc").await.unwrap();
        assert_eq!(report.sections_parsed, 3);
        assert_eq!(report.documents_added, 3);
        assert!(!report.replaced_existing);
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);

        let results = store.query("ipc", &[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].document.id, "ipc_378");
        assert!(results[0].document.content.starts_with("Section 378: Theft. Whoever"));
    }

    #[tokio::test]
    async fn test_reingest_replaces_collection() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["murder"]));
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(embedder, store.clone()).with_id_prefix("bns");

        ingestor.ingest_text(STATUTES, "statutes").await.unwrap();
        let report = ingestor
            .ingest_text("Section 103: Murder\nPunishment for murder.", "statutes")
            .await
            .unwrap();

        assert!(report.replaced_existing);
        assert_eq!(store.count("statutes").await.unwrap(), 1);
        let results = store.query("statutes", &[1.0], 5).await.unwrap();
        assert_eq!(results[0].document.id, "bns_103");
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected_before_embedding() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["x"]));
        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(embedder.clone(), store.clone());

        let err = ingestor.ingest_text("nothing useful", "ipc").await.unwrap_err();
        assert!(matches!(err, NyayError::Parse(_)));
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 0);
        assert!(!store.has_collection("ipc").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_section_numbers_rejected() {
        let embedder = Arc::new(KeywordEmbedder::new(vec!["x"]));
        let ingestor = Ingestor::new(embedder, Arc::new(MemoryVectorStore::new()));

        let err = ingestor
            .ingest_text("Section 1: A\none\nSection 1: B\ntwo", "ipc")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Section 1"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let ingestor = Ingestor::new(
            Arc::new(KeywordEmbedder::new(vec!["x"])),
            Arc::new(MemoryVectorStore::new()),
        );
        let err = ingestor
            .run(Path::new("/definitely/not/here/ipc_data.txt"), "ipc")
            .await
            .unwrap_err();
        assert!(matches!(err, NyayError::Io(_)));
    }

    #[tokio::test]
    async fn test_run_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipc_data.txt");
        std::fs::write(&path, STATUTES).unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(Arc::new(KeywordEmbedder::new(vec!["theft"])), store.clone());
        let report = ingestor.run(&path, "ipc").await.unwrap();

        assert_eq!(report.documents_added, 3);
        assert_eq!(store.count("ipc").await.unwrap(), 3);
    }
}

//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! A statute corpus is a few hundred rows, so a full scan per query is fine.

use super::{
    check_unique_ids, cosine_similarity, rank, CollectionInfo, Document, SearchResult, VectorStore,
};
use crate::error::{NyayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
        id TEXT NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL,
        PRIMARY KEY (collection, id)
    );
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a persistent store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(&conn)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NyayError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM collections WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn require_collection(conn: &Connection, name: &str) -> Result<()> {
        if Self::collection_exists(conn, name)? {
            Ok(())
        } else {
            Err(NyayError::CollectionNotFound(name.to_string()))
        }
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;

        if Self::collection_exists(&conn, name)? {
            return Err(NyayError::VectorStore(format!(
                "Collection already exists: {}",
                name
            )));
        }

        conn.execute(
            "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;

        info!("Created collection {}", name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;

        let tx = conn.unchecked_transaction()?;
        let removed_docs = tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;
        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;

        if removed > 0 {
            info!("Deleted collection {} ({} documents)", name, removed_docs);
        }
        Ok(removed > 0)
    }

    async fn has_collection(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::collection_exists(&conn, name)
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, c.created_at, COUNT(d.id)
            FROM collections c
            LEFT JOIN documents d ON d.collection = c.name
            GROUP BY c.name, c.created_at
            ORDER BY c.name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let created_at: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok(CollectionInfo {
                name: row.get(0)?,
                document_count: count as usize,
                created_at: Self::parse_timestamp(&created_at),
            })
        })?;

        let collections = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(collections)
    }

    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn add(&self, collection: &str, docs: &[Document]) -> Result<usize> {
        check_unique_ids(docs)?;

        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO documents (collection, id, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for doc in docs {
                stmt.execute(params![
                    collection,
                    doc.id,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ])
                .map_err(|e| match e {
                    rusqlite::Error::SqliteFailure(err, _)
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        NyayError::VectorStore(format!(
                            "Document id already exists in {}: {}",
                            collection, doc.id
                        ))
                    }
                    other => other.into(),
                })?;
            }
        }
        tx.commit()?;

        info!("Added {} documents to {}", docs.len(), collection);
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let mut stmt = conn.prepare(
            "SELECT id, content, embedding, indexed_at FROM documents WHERE collection = ?1",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let embedding_bytes: Vec<u8> = row.get(2)?;
            let indexed_at: String = row.get(3)?;
            Ok(Document {
                id: row.get(0)?,
                content: row.get(1)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: Self::parse_timestamp(&indexed_at),
            })
        })?;

        let mut results = Vec::new();
        for doc in rows {
            let doc = doc?;
            let score = cosine_similarity(query_embedding, &doc.embedding);
            results.push(SearchResult {
                document: doc,
                score,
            });
        }

        let results = rank(results, limit);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

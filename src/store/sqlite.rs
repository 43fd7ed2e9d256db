//! SQLite-backed document store.
//!
//! One table keyed on the document id; metadata and embeddings are stored as
//! JSON text. Batch writes run inside a single transaction so a failed write
//! leaves the store unchanged.

use crate::document::Document;
use crate::store::{DocumentStore, DuplicatePolicy, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a store at the given path and run migrations.
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let url = format!("sqlite:{}?mode=rwc", path);
        // An in-memory database exists per connection, so the pool must not
        // grow past one or each connection would see a different database.
        let max_connections = if path == ":memory:" { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                meta TEXT NOT NULL,
                embedding TEXT,
                written_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a stored document by id.
    pub async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<(String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT id, content, meta, embedding FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, content, meta_json, embedding_json)) = row else {
            return Ok(None);
        };

        let meta = serde_json::from_str(&meta_json)?;
        let embedding = embedding_json
            .map(|json| serde_json::from_str(&json))
            .transpose()?;

        Ok(Some(Document {
            id,
            content,
            meta,
            embedding,
        }))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn write(
        &self,
        documents: &[Document],
        policy: DuplicatePolicy,
    ) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().timestamp();
        let mut written = 0usize;

        for document in documents {
            let meta_json = serde_json::to_string(&document.meta)?;
            let embedding_json = document
                .embedding
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            let sql = match policy {
                DuplicatePolicy::Skip => {
                    "INSERT OR IGNORE INTO documents (id, content, meta, embedding, written_at) \
                     VALUES (?, ?, ?, ?, ?)"
                }
                DuplicatePolicy::Overwrite => {
                    "INSERT OR REPLACE INTO documents (id, content, meta, embedding, written_at) \
                     VALUES (?, ?, ?, ?, ?)"
                }
                DuplicatePolicy::Fail => {
                    "INSERT INTO documents (id, content, meta, embedding, written_at) \
                     VALUES (?, ?, ?, ?, ?)"
                }
            };

            let result = sqlx::query(sql)
                .bind(&document.id)
                .bind(&document.content)
                .bind(&meta_json)
                .bind(&embedding_json)
                .bind(now)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(outcome) => written += outcome.rows_affected() as usize,
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(StoreError::Duplicate {
                        id: document.id.clone(),
                    });
                }
                Err(e) => return Err(StoreError::Database(e)),
            }
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

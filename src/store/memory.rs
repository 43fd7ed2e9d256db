//! In-memory document store for tests and development.

use crate::document::Document;
use crate::store::{DocumentStore, DuplicatePolicy, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps documents in a map keyed on their id. Not meant for production
/// volumes; perfect for asserting what a pipeline actually wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored document by id.
    pub async fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().await.get(id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn write(
        &self,
        documents: &[Document],
        policy: DuplicatePolicy,
    ) -> Result<usize, StoreError> {
        let mut stored = self.documents.write().await;
        let mut written = 0;

        for document in documents {
            if stored.contains_key(&document.id) {
                match policy {
                    DuplicatePolicy::Skip => continue,
                    DuplicatePolicy::Overwrite => {}
                    DuplicatePolicy::Fail => {
                        return Err(StoreError::Duplicate {
                            id: document.id.clone(),
                        });
                    }
                }
            }
            stored.insert(document.id.clone(), document.clone());
            written += 1;
        }

        Ok(written)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.documents.read().await.len() as u64)
    }
}

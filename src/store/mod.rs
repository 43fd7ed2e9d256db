//! Document persistence behind a small async trait.
//!
//! Stores key documents on their content-derived id; [`DuplicatePolicy`]
//! decides what happens when an id is already present. [`MemoryStore`] backs
//! tests; [`SqliteStore`] backs the CLI.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::document::Document;
use async_trait::async_trait;
use thiserror::Error;

/// What to do when a document's id already exists in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Leave the stored document alone; the incoming one is not counted.
    #[default]
    Skip,
    /// Replace the stored document.
    Overwrite,
    /// Return [`StoreError::Duplicate`].
    Fail,
}

impl DuplicatePolicy {
    /// Parse a policy name as written in config files.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "skip" => Some(DuplicatePolicy::Skip),
            "overwrite" => Some(DuplicatePolicy::Overwrite),
            "fail" => Some(DuplicatePolicy::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with this id is already stored and the policy is `Fail`
    #[error("Document {id} already exists in the store")]
    Duplicate { id: String },
    /// Document metadata or embedding could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Async document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a batch of documents under the given duplicate policy.
    ///
    /// Returns the number of documents actually written (skipped duplicates
    /// are not counted).
    async fn write(
        &self,
        documents: &[Document],
        policy: DuplicatePolicy,
    ) -> Result<usize, StoreError>;

    /// Number of documents currently stored.
    async fn count(&self) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!(DuplicatePolicy::parse("skip"), Some(DuplicatePolicy::Skip));
        assert_eq!(
            DuplicatePolicy::parse("overwrite"),
            Some(DuplicatePolicy::Overwrite)
        );
        assert_eq!(DuplicatePolicy::parse("fail"), Some(DuplicatePolicy::Fail));
        assert_eq!(DuplicatePolicy::parse("bogus"), None);
    }
}

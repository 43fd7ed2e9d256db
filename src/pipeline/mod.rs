//! Pipeline stages and their composition.
//!
//! A stage is anything exposing `process(batch) -> batch`; composition is
//! explicit — [`IndexPipeline`] runs its stages in the order they were added
//! and then writes the result to a store. No registry, no routing.

mod embed;
mod split;

pub use embed::{EmbedError, Embedder, EmbedStage, HashEmbedder};
pub use split::{DocumentSplitter, SplitError};

use crate::document::Document;
use crate::store::{DocumentStore, DuplicatePolicy, StoreError};
use thiserror::Error;

/// Failure inside a pipeline stage or the final store write.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One transformation step over a document batch.
pub trait DocumentStage: Send + Sync {
    fn process(&self, documents: Vec<Document>) -> Result<Vec<Document>, PipelineError>;
}

/// Fixed linear composition of stages followed by a store write.
///
/// ```no_run
/// use feedstack::pipeline::{DocumentSplitter, EmbedStage, HashEmbedder, IndexPipeline};
/// use feedstack::store::{DuplicatePolicy, MemoryStore};
///
/// # async fn example(documents: Vec<feedstack::document::Document>) -> anyhow::Result<()> {
/// let store = MemoryStore::new();
/// let pipeline = IndexPipeline::new(store, DuplicatePolicy::Skip)
///     .add_stage(Box::new(DocumentSplitter::new(150, 50)?))
///     .add_stage(Box::new(EmbedStage::new(HashEmbedder::new())));
/// let written = pipeline.run(documents).await?;
/// # Ok(())
/// # }
/// ```
pub struct IndexPipeline<S: DocumentStore> {
    stages: Vec<Box<dyn DocumentStage>>,
    store: S,
    policy: DuplicatePolicy,
}

impl<S: DocumentStore> IndexPipeline<S> {
    pub fn new(store: S, policy: DuplicatePolicy) -> Self {
        Self {
            stages: Vec::new(),
            store,
            policy,
        }
    }

    /// Append a stage; stages run in insertion order.
    pub fn add_stage(mut self, stage: Box<dyn DocumentStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the documents through every stage, write the result, and return
    /// the number of documents the store accepted.
    pub async fn run(&self, documents: Vec<Document>) -> Result<usize, PipelineError> {
        let mut batch = documents;
        for stage in &self.stages {
            batch = stage.process(batch)?;
        }

        let written = self.store.write(&batch, self.policy).await?;
        tracing::info!(
            documents = batch.len(),
            written = written,
            "Pipeline run complete"
        );
        Ok(written)
    }
}

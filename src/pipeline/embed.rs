//! Embedding stage: attach vector representations to documents.
//!
//! Model internals are out of scope for this crate; [`Embedder`] is the seam
//! where a real model plugs in. The bundled [`HashEmbedder`] derives a
//! deterministic unit-norm vector from a SHA-256 of the text, which keeps
//! ingestion idempotent and tests hermetic.

use crate::document::Document;
use crate::pipeline::{DocumentStage, PipelineError};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Embedding backend error: {0}")]
    Backend(String),
}

/// Anything that can turn texts into fixed-dimension vectors.
pub trait Embedder: Send + Sync {
    /// Dimension of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per text, in input order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Deterministic hash-derived embedder.
///
/// Seeds an xorshift generator from the SHA-256 of each text and emits a
/// normalized vector. The same text always embeds to the same vector; no
/// model weights, no network.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Embedder with the default dimension (384, matching common
    /// sentence-transformer models).
    pub fn new() -> Self {
        Self { dimension: 384 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        // Seed from the first eight digest bytes; keep it nonzero for xorshift
        let mut state = digest
            .iter()
            .take(8)
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
            | 1;

        let mut vector = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state as f64 / u64::MAX as f64) as f32;
            vector.push(unit * 2.0 - 1.0);
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Adapts an [`Embedder`] to the [`DocumentStage`] contract: documents pass
/// through unchanged except for their `embedding` field.
pub struct EmbedStage<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> EmbedStage<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: Embedder> DocumentStage for EmbedStage<E> {
    fn process(&self, documents: Vec<Document>) -> Result<Vec<Document>, PipelineError> {
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let vectors = self.embedder.embed(&texts)?;

        Ok(documents
            .into_iter()
            .zip(vectors)
            .map(|(mut document, vector)| {
                document.embedding = Some(vector);
                document
            })
            .collect())
    }
}

//! Word-window document splitting.

use crate::document::{Document, MetaValue};
use crate::pipeline::{DocumentStage, PipelineError};
use thiserror::Error;

/// Invalid splitter configuration, rejected at construction time.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("split_length must be greater than zero")]
    ZeroLength,
    #[error("split_overlap {overlap} must be smaller than split_length {length}")]
    OverlapTooLarge { length: usize, overlap: usize },
}

/// Splits documents into overlapping word windows.
///
/// Each chunk inherits the parent document's metadata plus `source_id` (the
/// parent's id) and `split_id` (the chunk's position), so chunks stay
/// traceable and their ids stay distinct even when the text repeats. A
/// document with empty content yields no chunks.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSplitter {
    split_length: usize,
    split_overlap: usize,
}

impl DocumentSplitter {
    /// Create a splitter producing windows of `split_length` words that
    /// overlap by `split_overlap` words.
    ///
    /// # Errors
    ///
    /// [`SplitError::ZeroLength`] for a zero window, and
    /// [`SplitError::OverlapTooLarge`] when the overlap would prevent the
    /// window from advancing.
    pub fn new(split_length: usize, split_overlap: usize) -> Result<Self, SplitError> {
        if split_length == 0 {
            return Err(SplitError::ZeroLength);
        }
        if split_overlap >= split_length {
            return Err(SplitError::OverlapTooLarge {
                length: split_length,
                overlap: split_overlap,
            });
        }
        Ok(Self {
            split_length,
            split_overlap,
        })
    }

    /// Split one document into chunk documents.
    pub fn split(&self, document: &Document) -> Vec<Document> {
        let words: Vec<&str> = document.content.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.split_length - self.split_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut split_id: i64 = 0;

        loop {
            let end = usize::min(start + self.split_length, words.len());
            let mut meta = document.meta.clone();
            meta.insert(
                "source_id".to_string(),
                MetaValue::Str(document.id.clone()),
            );
            meta.insert("split_id".to_string(), MetaValue::Int(split_id));
            chunks.push(Document::new(words[start..end].join(" "), meta));

            if end == words.len() {
                break;
            }
            start += step;
            split_id += 1;
        }

        chunks
    }
}

impl DocumentStage for DocumentSplitter {
    fn process(&self, documents: Vec<Document>) -> Result<Vec<Document>, PipelineError> {
        Ok(documents.iter().flat_map(|d| self.split(d)).collect())
    }
}

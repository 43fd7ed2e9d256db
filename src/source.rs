//! Source descriptors: where a converter's raw bytes come from.
//!
//! A [`Source`] is either a filesystem path or an in-memory [`ByteStream`]
//! (typically produced by the fetcher). Resolution turns either into raw
//! bytes plus source-level metadata; a failure here is per-source and never
//! aborts the batch — the converter logs it and moves on.

use crate::document::{Meta, MetaValue};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a source descriptor into bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The referenced file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved bytes for one source plus its own metadata.
///
/// The fetcher records `url` and `content_type` here; a file source records
/// `file_path`. Consumed exactly once by a converter.
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    pub data: Vec<u8>,
    pub meta: Meta,
}

impl ByteStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            meta: Meta::new(),
        }
    }

    pub fn with_meta(data: Vec<u8>, meta: Meta) -> Self {
        Self { data, meta }
    }
}

/// One input to a converter: a file path or pre-fetched bytes.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Stream(ByteStream),
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<ByteStream> for Source {
    fn from(stream: ByteStream) -> Self {
        Source::Stream(stream)
    }
}

impl Source {
    /// Human-readable identifier for log lines about this source.
    ///
    /// Paths display as-is; streams prefer their `url` metadata and fall
    /// back to a placeholder.
    pub fn label(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Stream(stream) => match stream.meta.get("url") {
                Some(url) => url.to_string(),
                None => "<in-memory stream>".to_string(),
            },
        }
    }

    /// Resolve this source to raw bytes and its source-level metadata.
    ///
    /// A path source contributes a `file_path` metadata key, matching what
    /// the fetcher does with `url` for streams.
    pub fn resolve(self) -> Result<(Vec<u8>, Meta), SourceError> {
        match self {
            Source::Path(path) => {
                let data = std::fs::read(&path).map_err(|source| SourceError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                let mut meta = Meta::new();
                meta.insert(
                    "file_path".to_string(),
                    MetaValue::Str(path.display().to_string()),
                );
                Ok((data, meta))
            }
            Source::Stream(stream) => Ok((stream.data, stream.meta)),
        }
    }
}

//! Converters: raw byte sources in, normalized documents out.
//!
//! Two converters share one contract: a batch of [`Source`]s plus optional
//! caller metadata goes in, and one [`Document`] per successfully-processed
//! source comes out, in input order. A failing source is logged and skipped;
//! it never aborts the batch. Only a batch-level precondition violation
//! (per-source metadata list of the wrong length) is returned as an error,
//! and it fails fast before any source is touched.
//!
//! - [`rss::RssConverter`] — RSS/Atom feeds, entry text concatenation
//! - [`html::HtmlConverter`] — whole web pages

mod html;
mod markup;
mod rss;

pub use html::HtmlConverter;
pub use markup::strip_markup;
pub use rss::{EntryExtraction, RssConverter};

use crate::document::{Document, Meta};
use thiserror::Error;

/// Caller-supplied metadata for a conversion batch.
///
/// `Shared` broadcasts one mapping to every source. `PerSource` must be
/// exactly as long as the source list or the whole call fails fast.
#[derive(Debug, Clone, Default)]
pub enum MetaSpec {
    #[default]
    None,
    Shared(Meta),
    PerSource(Vec<Meta>),
}

/// Batch-level precondition violations. Per-source failures are never
/// surfaced this way; they are logged and recorded in [`Converted::failures`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Per-source metadata length {meta} does not match source count {sources}")]
    MetaLengthMismatch { sources: usize, meta: usize },
}

/// One skipped source: its label and a description of what went wrong.
///
/// The same information is emitted as a warning log line; this structured
/// form exists so callers and tests can inspect the gaps.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Result of a conversion batch.
///
/// `documents` preserves the input order of the sources that succeeded;
/// failed sources leave gaps, not placeholders. For every input source there
/// is exactly one entry across the two lists.
#[derive(Debug, Default)]
pub struct Converted {
    pub documents: Vec<Document>,
    pub failures: Vec<SourceFailure>,
}

/// Expand a [`MetaSpec`] into one metadata mapping per source.
///
/// Fails fast on a length mismatch, before any source is read.
fn meta_per_source(meta: MetaSpec, source_count: usize) -> Result<Vec<Meta>, ConvertError> {
    match meta {
        MetaSpec::None => Ok(vec![Meta::new(); source_count]),
        MetaSpec::Shared(shared) => Ok(vec![shared; source_count]),
        MetaSpec::PerSource(list) => {
            if list.len() != source_count {
                return Err(ConvertError::MetaLengthMismatch {
                    sources: source_count,
                    meta: list.len(),
                });
            }
            Ok(list)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MetaValue;

    #[test]
    fn test_meta_none_yields_empty_maps() {
        let metas = meta_per_source(MetaSpec::None, 3).unwrap();
        assert_eq!(metas.len(), 3);
        assert!(metas.iter().all(Meta::is_empty));
    }

    #[test]
    fn test_meta_shared_broadcasts() {
        let mut shared = Meta::new();
        shared.insert("lang".to_string(), MetaValue::from("en"));
        let metas = meta_per_source(MetaSpec::Shared(shared), 2).unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0], metas[1]);
        assert_eq!(metas[0].get("lang"), Some(&MetaValue::from("en")));
    }

    #[test]
    fn test_meta_length_mismatch_fails() {
        let result = meta_per_source(MetaSpec::PerSource(vec![Meta::new(); 2]), 3);
        assert!(matches!(
            result,
            Err(ConvertError::MetaLengthMismatch {
                sources: 3,
                meta: 2
            })
        ));
    }

    #[test]
    fn test_meta_per_source_matching_length_ok() {
        let metas = meta_per_source(MetaSpec::PerSource(vec![Meta::new(); 2]), 2).unwrap();
        assert_eq!(metas.len(), 2);
    }
}

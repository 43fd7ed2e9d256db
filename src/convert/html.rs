//! Whole-page HTML to document conversion.
//!
//! Same batch contract and recovery discipline as the RSS converter; the
//! extraction step is just "strip the whole page" instead of walking feed
//! entries.

use crate::convert::{meta_per_source, Converted, ConvertError, MetaSpec, SourceFailure};
use crate::convert::markup::strip_markup;
use crate::document::{merge_meta, Document};
use crate::source::Source;

/// Converts fetched web pages into plain-text documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlConverter;

impl HtmlConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a batch of HTML sources into documents.
    ///
    /// Per source: resolve bytes, decode UTF-8, strip markup, merge stream
    /// metadata with caller metadata (caller wins), emit one document.
    /// Unreadable or non-UTF-8 sources are logged and skipped; the batch
    /// continues.
    ///
    /// # Errors
    ///
    /// [`ConvertError::MetaLengthMismatch`] on a per-source metadata list of
    /// the wrong length, before any source is read.
    pub fn convert(
        &self,
        sources: Vec<Source>,
        meta: MetaSpec,
    ) -> Result<Converted, ConvertError> {
        let meta_list = meta_per_source(meta, sources.len())?;

        let mut converted = Converted::default();
        for (source, caller_meta) in sources.into_iter().zip(meta_list) {
            let label = source.label();

            let (data, stream_meta) = match source.resolve() {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(source = %label, error = %e, "Could not read source, skipping");
                    converted.failures.push(SourceFailure {
                        source: label,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let html = match String::from_utf8(data) {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(
                        source = %label,
                        error = %e,
                        "Failed to extract text from source, skipping"
                    );
                    converted.failures.push(SourceFailure {
                        source: label,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let merged = merge_meta(&stream_meta, &caller_meta);
            converted
                .documents
                .push(Document::new(strip_markup(&html), merged));
        }

        Ok(converted)
    }
}

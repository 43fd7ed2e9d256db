//! RSS/Atom feed to document conversion.
//!
//! This is the core transform of the crate: a batch of raw feed sources goes
//! in, one cleaned-text document per readable, parseable source comes out.
//! Per entry the title and description are concatenated, the accumulated
//! buffer is stripped of markup, and the stream's metadata is merged with the
//! caller's (caller wins). A malformed source is logged and skipped inside
//! its own recovery scope — one bad feed never aborts the batch.

use crate::convert::{meta_per_source, Converted, ConvertError, MetaSpec, SourceFailure};
use crate::convert::markup::strip_markup;
use crate::document::{merge_meta, Document};
use crate::source::Source;
use thiserror::Error;

/// How to treat feed entries missing a title or description.
///
/// The original behavior treated any feed with an incomplete entry as
/// unusable (the whole source is skipped); whether that was intent or a
/// latent defect is an open question, so both behaviors are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryExtraction {
    /// An entry missing either field fails the whole source.
    #[default]
    Strict,
    /// A missing field reads as the empty string.
    Tolerant,
}

/// Failure while turning one source's bytes into text. Always recovered
/// locally: logged, recorded, and the batch moves on.
#[derive(Debug, Error)]
enum ExtractError {
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
    #[error("Entry {index} has no title")]
    MissingTitle { index: usize },
    #[error("Entry {index} has no description")]
    MissingDescription { index: usize },
}

/// Converts batches of RSS/Atom sources into documents.
///
/// # Example
///
/// ```no_run
/// use feedstack::convert::{MetaSpec, RssConverter};
/// use feedstack::source::Source;
///
/// let converter = RssConverter::new();
/// let sources = vec![Source::from("feeds/sample.rss")];
/// let converted = converter.convert(sources, MetaSpec::None)?;
/// println!("{}", converted.documents[0].content);
/// # Ok::<(), feedstack::convert::ConvertError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RssConverter {
    extraction: EntryExtraction,
}

impl RssConverter {
    /// Converter with strict entry extraction (the default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter with the given entry extraction behavior.
    pub fn with_extraction(extraction: EntryExtraction) -> Self {
        Self { extraction }
    }

    /// Convert a batch of feed sources into documents.
    ///
    /// Sources are processed strictly sequentially, in input order. Each
    /// source resolves to bytes, decodes as UTF-8, parses as a feed, has its
    /// entry text concatenated and markup-stripped, and is emitted as one
    /// document with merged metadata. Any per-source failure emits one
    /// warning, records a [`SourceFailure`], and processing continues.
    ///
    /// A feed that parses to zero entries is not a failure: it emits a
    /// document with empty content.
    ///
    /// # Errors
    ///
    /// [`ConvertError::MetaLengthMismatch`] if `meta` is a per-source list
    /// whose length differs from `sources.len()`. This is checked before any
    /// source is read; no documents are produced and no reads are attempted.
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

            let content = match self.extract_text(data) {
                Ok(content) => content,
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
            converted.documents.push(Document::new(content, merged));
        }

        Ok(converted)
    }

    /// Decode, parse, concatenate entry text, strip markup.
    ///
    /// Failures anywhere in this chain are reported as one unit; the caller
    /// treats them uniformly (skip the source).
    fn extract_text(&self, data: Vec<u8>) -> Result<String, ExtractError> {
        let xml = String::from_utf8(data)?;
        let feed = feed_rs::parser::parse(xml.as_bytes())?;

        let mut text = String::new();
        for (index, entry) in feed.entries.into_iter().enumerate() {
            let title = entry.title.map(|t| t.content);
            let description = entry.summary.map(|s| s.content);

            let (title, description) = match self.extraction {
                EntryExtraction::Strict => (
                    title.ok_or(ExtractError::MissingTitle { index })?,
                    description.ok_or(ExtractError::MissingDescription { index })?,
                ),
                EntryExtraction::Tolerant => (
                    title.unwrap_or_default(),
                    description.unwrap_or_default(),
                ),
            };

            text.push_str(&title);
            text.push(' ');
            text.push_str(&description);
            text.push(' ');
        }

        Ok(strip_markup(&text))
    }
}

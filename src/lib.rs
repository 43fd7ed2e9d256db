//! feedstack: RSS feeds and web pages in, an embedded document store out.
//!
//! The pipeline is a fixed linear chain: fetch URLs, convert the raw bytes
//! to plain-text documents, split them into word windows, attach embedding
//! vectors, and write them to a store that deduplicates on content-derived
//! ids. The structurally interesting piece is the converter layer: it
//! processes each source in its own recovery scope, so one unreadable file
//! or malformed feed is logged and skipped while the rest of the batch goes
//! through.
//!
//! # Example
//!
//! ```no_run
//! use feedstack::convert::{MetaSpec, RssConverter};
//! use feedstack::pipeline::{DocumentSplitter, EmbedStage, HashEmbedder, IndexPipeline};
//! use feedstack::store::{DuplicatePolicy, MemoryStore};
//!
//! # async fn example(sources: Vec<feedstack::source::Source>) -> anyhow::Result<()> {
//! let converted = RssConverter::new().convert(sources, MetaSpec::None)?;
//!
//! let pipeline = IndexPipeline::new(MemoryStore::new(), DuplicatePolicy::Skip)
//!     .add_stage(Box::new(DocumentSplitter::new(150, 50)?))
//!     .add_stage(Box::new(EmbedStage::new(HashEmbedder::new())));
//! let written = pipeline.run(converted.documents).await?;
//! println!("{} documents written", written);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod document;
pub mod fetch;
pub mod pipeline;
pub mod source;
pub mod store;

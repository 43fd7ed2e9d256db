//! The normalized document unit produced by converters and consumed by
//! downstream pipeline stages.
//!
//! A [`Document`] is plain text plus a metadata mapping. Metadata values are
//! restricted to a small closed set of scalars ([`MetaValue`]) so the merge
//! rule and on-disk representation stay unambiguous.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// A metadata value: one of a closed set of scalar types.
///
/// Serialized untagged, so `{"a": 1, "b": "x"}` round-trips through JSON
/// without wrapper objects. Variant order matters for deserialization:
/// booleans and integers must be tried before floats and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Str(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Str(s)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

/// Metadata mapping attached to sources and documents.
///
/// A `BTreeMap` so iteration order is deterministic, which keeps document
/// ids stable across runs.
pub type Meta = BTreeMap<String, MetaValue>;

/// Merge two metadata mappings. Keys in `overlay` win on collision.
///
/// Converters call this with the source's own metadata as `base` and the
/// caller-supplied metadata as `overlay`, so caller keys take precedence.
pub fn merge_meta(base: &Meta, overlay: &Meta) -> Meta {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// The unit flowing through the pipeline: plain text content plus metadata.
///
/// Created once by a converter and never mutated by it afterwards. The
/// splitter and embedder produce new documents rather than editing in place;
/// only the `embedding` field is filled in by the embedding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Content-derived identifier, stable across runs for identical inputs.
    pub id: String,
    /// Markup-stripped plain text. May be empty (a feed with zero entries
    /// still yields a document).
    pub content: String,
    /// Merged source + caller metadata.
    pub meta: Meta,
    /// Embedding vector, present after the embedding stage has run.
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a document from content and metadata.
    ///
    /// The id is a SHA-256 over the content and every metadata pair, so two
    /// documents with identical content and metadata get identical ids.
    /// Duplicate detection in the store keys on this.
    pub fn new(content: String, meta: Meta) -> Self {
        let id = compute_id(&content, &meta);
        Self {
            id,
            content,
            meta,
            embedding: None,
        }
    }
}

fn compute_id(content: &str, meta: &Meta) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    for (key, value) in meta {
        hasher.update(b"\x1f");
        hasher.update(key.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(value.to_string().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

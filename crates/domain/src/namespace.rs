//! Namespace listing, metadata, and schema wire types.
//!
//! These mirror the Driftvec API surface. The remote schema format is
//! treated defensively: every property beyond the type tag is
//! optional, and unknown properties are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single entry from the namespace listing.
///
/// The id is opaque; it may contain delimiter characters implying
/// hierarchy (see [`crate::tree`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceListItem {
    /// Opaque namespace identifier.
    pub id: String,
}

impl NamespaceListItem {
    /// Creates a list item from an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Response of `GET /v1/namespaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceListResponse {
    /// Namespaces on this page.
    #[serde(default)]
    pub namespaces: Vec<NamespaceListItem>,
    /// Cursor for the next page, when more remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// BM25 configuration attached to a full-text-search field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Analyzer language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Whether stemming is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemming: Option<bool>,
    /// Whether matching is case sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    /// BM25 k1 parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k1: Option<f64>,
    /// BM25 b parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
}

/// Schema entry for one field of a namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Type tag, e.g. `"string"`, `"int"`, `"vector"`, `"[]string"`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Whether the field can appear in filters. Absent means yes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,

    /// Whether the field is full-text indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text_search: Option<bool>,

    /// BM25 options, present on full-text fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm25: Option<Bm25Config>,

    /// Vector dimensionality, present on vector fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    /// Distance metric, present on vector fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_metric: Option<String>,
}

impl FieldSchema {
    /// Returns true for vector fields.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.kind == "vector" || self.dimensions.is_some()
    }

    /// Returns true for array-typed fields (`"[]string"` etc.).
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.kind.starts_with('[')
    }

    /// Returns true if the field may appear in filter expressions:
    /// not a vector, not an array, and not explicitly opted out.
    #[must_use]
    pub fn is_filterable(&self) -> bool {
        !self.is_vector() && !self.is_array() && self.filterable != Some(false)
    }

    /// Returns true if the field supports full-text search.
    #[must_use]
    pub fn has_full_text_search(&self) -> bool {
        self.full_text_search == Some(true)
    }
}

/// Namespace schema: field name to schema entry, ordered by name so
/// rendering and persisted JSON are deterministic.
pub type NamespaceSchema = BTreeMap<String, FieldSchema>;

/// Index freshness reported by the metadata endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    /// `"up-to-date"` or `"updating"`.
    #[serde(default)]
    pub status: String,
    /// Bytes written but not yet indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unindexed_bytes: Option<u64>,
}

impl IndexStatus {
    /// Returns true when the index has caught up with writes.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.status == "up-to-date"
    }
}

/// Encryption configuration of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncryptionInfo {
    /// Service-side encryption.
    Sse {
        /// Always true when present.
        sse: bool,
    },
    /// Customer-managed encryption key.
    Cmek {
        /// CMEK details.
        cmek: CmekInfo,
    },
}

/// Customer-managed key details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmekInfo {
    /// Name of the customer-managed key.
    pub key_name: String,
}

impl EncryptionInfo {
    /// Short display label for the encryption mode.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sse { .. } => "SSE",
            Self::Cmek { .. } => "CMEK",
        }
    }
}

/// Response of `GET /v1/namespaces/{id}/metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceMetadata {
    /// Namespace identifier.
    #[serde(default)]
    pub id: String,

    /// Field schema.
    #[serde(default)]
    pub schema: NamespaceSchema,

    /// Approximate logical storage size in bytes.
    #[serde(default)]
    pub approx_logical_bytes: u64,

    /// Approximate document count.
    #[serde(default)]
    pub approx_row_count: u64,

    /// Creation timestamp as reported by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last-update timestamp as reported by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Index freshness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexStatus>,

    /// Encryption configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionInfo>,
}

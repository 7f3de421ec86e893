//! Query request/response types for the document endpoint.
//!
//! The request mirrors the remote query surface exactly, including
//! its heterogeneous-array encodings: `rank_by` is `["id", "asc"]`,
//! `["vector", {..}]`, or `["title", "BM25", "query"]`; a filter is
//! `["field", "Op", value]` or `["And"|"Or", ...filters]`. Those
//! shapes do not fit derived serialization, so `RankBy` and `Filter`
//! implement `Serialize` by hand.

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document identifier: string or unsigned integer, stable and
/// sortable ascending. Used as the pagination sort key and as a
/// filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    /// Numeric id.
    Uint(u64),
    /// String id.
    String(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for DocumentId {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Comparison operator in a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Member of a list.
    In,
    /// Not a member of a list.
    NotIn,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Glob pattern match.
    Glob,
    /// Negated glob pattern match.
    NotGlob,
}

/// A filter expression: a single condition or a logical combination.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `["field", "Op", value]`
    Condition {
        /// Field name.
        field: String,
        /// Comparison operator.
        op: FilterOperator,
        /// Comparison value (scalar or list, per operator).
        value: serde_json::Value,
    },
    /// `["And", ...filters]`
    And(Vec<Filter>),
    /// `["Or", ...filters]`
    Or(Vec<Filter>),
}

impl Filter {
    /// Builds a single condition.
    pub fn condition(
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self::Condition {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Combines filters with `And`, flattening the trivial cases:
    /// zero filters yield `None`, one is returned as-is.
    #[must_use]
    pub fn and(mut filters: Vec<Self>) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self::And(filters)),
        }
    }

    /// The `id > after` bound used by cursor pagination.
    #[must_use]
    pub fn id_greater_than(after: &DocumentId) -> Self {
        let value = match after {
            DocumentId::Uint(n) => serde_json::Value::from(*n),
            DocumentId::String(s) => serde_json::Value::from(s.clone()),
        };
        Self::Condition {
            field: "id".to_string(),
            op: FilterOperator::Gt,
            value,
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Condition { field, op, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(field)?;
                seq.serialize_element(op)?;
                seq.serialize_element(value)?;
                seq.end()
            }
            Self::And(children) => serialize_logical(serializer, "And", children),
            Self::Or(children) => serialize_logical(serializer, "Or", children),
        }
    }
}

fn serialize_logical<S: Serializer>(
    serializer: S,
    tag: &str,
    children: &[Filter],
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(children.len() + 1))?;
    seq.serialize_element(tag)?;
    for child in children {
        seq.serialize_element(child)?;
    }
    seq.end()
}

/// Sort direction for attribute-based ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Vector ranking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRank {
    /// Query vector.
    pub vector: Vec<f32>,
    /// Distance metric override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_metric: Option<String>,
}

/// Ranking specification. Treated as opaque by the client beyond the
/// attribute form used for cursor pagination.
#[derive(Debug, Clone, PartialEq)]
pub enum RankBy {
    /// Order by an attribute: `["id", "asc"]`.
    Attribute {
        /// Attribute name.
        field: String,
        /// Sort direction.
        direction: SortDirection,
    },
    /// Rank by vector distance: `["vector", {..}]`.
    Vector(VectorRank),
    /// Rank by BM25 relevance: `["title", "BM25", "query"]`, with an
    /// optional trailing options object.
    Bm25 {
        /// Full-text field name.
        field: String,
        /// Search query.
        query: String,
        /// Treat the last term as a prefix.
        last_as_prefix: bool,
    },
}

impl RankBy {
    /// Ascending order over the given attribute.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::Attribute {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// The id-ascending ordering used by the document browser.
    #[must_use]
    pub fn id_ascending() -> Self {
        Self::ascending("id")
    }
}

#[derive(Serialize)]
struct Bm25Opts {
    last_as_prefix: bool,
}

impl Serialize for RankBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Attribute { field, direction } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(field)?;
                seq.serialize_element(direction)?;
                seq.end()
            }
            Self::Vector(rank) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("vector")?;
                seq.serialize_element(rank)?;
                seq.end()
            }
            Self::Bm25 {
                field,
                query,
                last_as_prefix,
            } => {
                let len = if *last_as_prefix { 4 } else { 3 };
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element(field)?;
                seq.serialize_element("BM25")?;
                seq.serialize_element(query)?;
                if *last_as_prefix {
                    seq.serialize_element(&Bm25Opts {
                        last_as_prefix: true,
                    })?;
                }
                seq.end()
            }
        }
    }
}

/// Attribute selection: everything, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeAttributes {
    /// Include all attributes (`true` on the wire).
    All,
    /// Include only the named attributes.
    Named(Vec<String>),
}

impl Serialize for IncludeAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_bool(true),
            Self::Named(names) => names.serialize(serializer),
        }
    }
}

/// Read consistency requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Strong consistency.
    Strong,
    /// Eventual consistency.
    Eventual,
}

/// A declarative query request, constructed fresh per page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Ranking specification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_by: Option<RankBy>,

    /// Row limit for attribute-ordered queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Result count for vector/BM25 queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Single filter expression (simple or logical).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filter>,

    /// Attribute selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_attributes: Option<IncludeAttributes>,

    /// Attributes to exclude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_attributes: Option<Vec<String>>,

    /// Whether to return vectors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_vectors: Option<bool>,

    /// Read consistency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<Consistency>,
}

/// A single result row. Attributes beyond the system fields are kept
/// as an open map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    /// Document id.
    pub id: DocumentId,

    /// Distance score, present on vector-ranked queries.
    #[serde(rename = "$dist", default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<f64>,

    /// Document vector, present when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,

    /// All remaining attributes.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Billing information attached to a query response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBilling {
    /// Logical bytes scanned.
    #[serde(default)]
    pub logical_bytes: u64,
    /// Rows returned.
    #[serde(default)]
    pub rows_returned: u64,
}

/// Performance information attached to a query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPerformance {
    /// `"hit"` or `"miss"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_status: Option<String>,
    /// Server-side execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_execution_ms: Option<f64>,
}

/// Response of `POST /v2/namespaces/{id}/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Result rows.
    #[serde(default)]
    pub rows: Vec<QueryRow>,

    /// Server-side cursor, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,

    /// Billing details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<QueryBilling>,

    /// Performance details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<QueryPerformance>,
}

impl QueryResponse {
    /// Id of the last row on this page, the boundary for the next
    /// cursor advance.
    #[must_use]
    pub fn last_id(&self) -> Option<&DocumentId> {
        self.rows.last().map(|row| &row.id)
    }
}

//! Schema-driven document filters and full-text search.
//!
//! Filter rows are edited as strings in the UI and compiled against
//! the namespace schema into typed filter expressions before a query
//! is issued. Vector and array fields never appear in filters; `id`
//! is always filterable even when absent from the schema.

use serde_json::Value;

use nimbus_domain::namespace::NamespaceSchema;
use nimbus_domain::query::{Filter, FilterOperator};

/// A field offered by the filter editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    /// Field name.
    pub name: String,
    /// Schema type tag, e.g. `"string"`, `"int"`.
    pub kind: String,
}

/// A user-edited filter row, values still raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    /// Field name.
    pub field: String,
    /// Comparison operator.
    pub op: FilterOperator,
    /// Raw value text; comma-separated for In/NotIn.
    pub value: String,
}

/// An active full-text search over a BM25-enabled field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullTextSearch {
    /// Full-text field name.
    pub field: String,
    /// Search query.
    pub query: String,
}

/// Errors compiling filter rows against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterBuildError {
    /// The field does not exist in the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The field exists but cannot be filtered on.
    #[error("field is not filterable: {0}")]
    NotFilterable(String),

    /// The operator does not apply to the field's type.
    #[error("operator {op:?} is not valid for field {field}")]
    InvalidOperator {
        /// Field name.
        field: String,
        /// Rejected operator.
        op: FilterOperator,
    },

    /// The value text does not parse as the field's type.
    #[error("invalid {kind} value for field {field}: {value:?}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Expected type tag.
        kind: String,
        /// Offending value text.
        value: String,
    },
}

/// Fields that may appear in filter expressions: every filterable,
/// non-vector, non-array schema field, with `id` prepended when the
/// schema does not list it.
#[must_use]
pub fn filterable_fields(schema: &NamespaceSchema) -> Vec<FilterField> {
    let mut fields: Vec<FilterField> = schema
        .iter()
        .filter(|(_, field)| field.is_filterable())
        .map(|(name, field)| FilterField {
            name: name.clone(),
            kind: field.kind.clone(),
        })
        .collect();

    if !fields.iter().any(|f| f.name == "id") {
        fields.insert(
            0,
            FilterField {
                name: "id".to_string(),
                kind: "string".to_string(),
            },
        );
    }
    fields
}

/// Fields that support full-text search.
#[must_use]
pub fn full_text_fields(schema: &NamespaceSchema) -> Vec<String> {
    schema
        .iter()
        .filter(|(_, field)| field.has_full_text_search())
        .map(|(name, _)| name.clone())
        .collect()
}

/// Operators available for a schema type tag.
#[must_use]
pub fn operators_for(kind: &str) -> &'static [FilterOperator] {
    use FilterOperator::{Eq, Glob, Gt, Gte, In, Lt, Lte, NotEq, NotGlob, NotIn};
    match kind {
        "int" | "uint" => &[Eq, NotEq, In, NotIn, Lt, Lte, Gt, Gte],
        "float" => &[Eq, NotEq, Lt, Lte, Gt, Gte],
        "bool" => &[Eq, NotEq],
        // Strings and anything unrecognized get the string set.
        _ => &[Eq, NotEq, In, NotIn, Glob, NotGlob],
    }
}

/// Compiles filter rows into typed filter expressions.
///
/// # Errors
///
/// Returns an error for unknown or non-filterable fields, operators
/// outside the field's set, or unparseable values.
pub fn compile_filter_rows(
    rows: &[FilterRow],
    schema: &NamespaceSchema,
) -> Result<Vec<Filter>, FilterBuildError> {
    rows.iter().map(|row| compile_row(row, schema)).collect()
}

fn compile_row(row: &FilterRow, schema: &NamespaceSchema) -> Result<Filter, FilterBuildError> {
    let kind = match schema.get(&row.field) {
        Some(field) if field.is_filterable() => field.kind.clone(),
        Some(_) => return Err(FilterBuildError::NotFilterable(row.field.clone())),
        // `id` is always filterable, as a string.
        None if row.field == "id" => "string".to_string(),
        None => return Err(FilterBuildError::UnknownField(row.field.clone())),
    };

    if !operators_for(&kind).contains(&row.op) {
        return Err(FilterBuildError::InvalidOperator {
            field: row.field.clone(),
            op: row.op,
        });
    }

    let value = match row.op {
        FilterOperator::In | FilterOperator::NotIn => Value::Array(
            row.value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| parse_scalar(part, &kind, &row.field, &row.value))
                .collect::<Result<_, _>>()?,
        ),
        _ => parse_scalar(row.value.trim(), &kind, &row.field, &row.value)?,
    };

    Ok(Filter::Condition {
        field: row.field.clone(),
        op: row.op,
        value,
    })
}

fn parse_scalar(
    text: &str,
    kind: &str,
    field: &str,
    raw: &str,
) -> Result<Value, FilterBuildError> {
    let invalid = || FilterBuildError::InvalidValue {
        field: field.to_string(),
        kind: kind.to_string(),
        value: raw.to_string(),
    };
    match kind {
        "int" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        "uint" => text
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        "float" => text
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        "bool" => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        _ => Ok(Value::from(text)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use nimbus_domain::namespace::FieldSchema;

    fn schema() -> NamespaceSchema {
        let mut schema = NamespaceSchema::new();
        schema.insert(
            "title".to_string(),
            FieldSchema {
                kind: "string".to_string(),
                full_text_search: Some(true),
                ..FieldSchema::default()
            },
        );
        schema.insert(
            "score".to_string(),
            FieldSchema {
                kind: "int".to_string(),
                ..FieldSchema::default()
            },
        );
        schema.insert(
            "internal".to_string(),
            FieldSchema {
                kind: "string".to_string(),
                filterable: Some(false),
                ..FieldSchema::default()
            },
        );
        schema.insert(
            "embedding".to_string(),
            FieldSchema {
                kind: "vector".to_string(),
                dimensions: Some(4),
                ..FieldSchema::default()
            },
        );
        schema
    }

    #[test]
    fn test_filterable_fields_prepends_id_and_drops_vectors() {
        let fields = filterable_fields(&schema());
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "score", "title"]);
    }

    #[test]
    fn test_full_text_fields() {
        assert_eq!(full_text_fields(&schema()), vec!["title".to_string()]);
    }

    #[test]
    fn test_compile_typed_values() {
        let rows = vec![
            FilterRow {
                field: "score".to_string(),
                op: FilterOperator::Gte,
                value: "10".to_string(),
            },
            FilterRow {
                field: "title".to_string(),
                op: FilterOperator::Eq,
                value: "hello".to_string(),
            },
        ];
        let filters = compile_filter_rows(&rows, &schema()).unwrap();
        assert_eq!(
            serde_json::to_value(&filters[0]).unwrap(),
            json!(["score", "Gte", 10])
        );
        assert_eq!(
            serde_json::to_value(&filters[1]).unwrap(),
            json!(["title", "Eq", "hello"])
        );
    }

    #[test]
    fn test_compile_in_list() {
        let rows = vec![FilterRow {
            field: "score".to_string(),
            op: FilterOperator::In,
            value: "1, 2, 3".to_string(),
        }];
        let filters = compile_filter_rows(&rows, &schema()).unwrap();
        assert_eq!(
            serde_json::to_value(&filters[0]).unwrap(),
            json!(["score", "In", [1, 2, 3]])
        );
    }

    #[test]
    fn test_compile_id_without_schema_entry() {
        let rows = vec![FilterRow {
            field: "id".to_string(),
            op: FilterOperator::Gt,
            value: "doc-10".to_string(),
        }];
        let filters = compile_filter_rows(&rows, &schema()).unwrap();
        assert_eq!(
            serde_json::to_value(&filters[0]).unwrap(),
            json!(["id", "Gt", "doc-10"])
        );
    }

    #[test]
    fn test_compile_rejects_bad_input() {
        let unknown = FilterRow {
            field: "nope".to_string(),
            op: FilterOperator::Eq,
            value: "x".to_string(),
        };
        assert!(matches!(
            compile_filter_rows(&[unknown], &schema()),
            Err(FilterBuildError::UnknownField(_))
        ));

        let not_filterable = FilterRow {
            field: "internal".to_string(),
            op: FilterOperator::Eq,
            value: "x".to_string(),
        };
        assert!(matches!(
            compile_filter_rows(&[not_filterable], &schema()),
            Err(FilterBuildError::NotFilterable(_))
        ));

        let bad_operator = FilterRow {
            field: "score".to_string(),
            op: FilterOperator::Glob,
            value: "1".to_string(),
        };
        assert!(matches!(
            compile_filter_rows(&[bad_operator], &schema()),
            Err(FilterBuildError::InvalidOperator { .. })
        ));

        let bad_value = FilterRow {
            field: "score".to_string(),
            op: FilterOperator::Eq,
            value: "ten".to_string(),
        };
        assert!(matches!(
            compile_filter_rows(&[bad_value], &schema()),
            Err(FilterBuildError::InvalidValue { .. })
        ));
    }
}

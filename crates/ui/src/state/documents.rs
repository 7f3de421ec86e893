//! Document page renderings: table, JSON, and card views as plain
//! data for the window shell.

use std::collections::BTreeSet;

use serde_json::Value;

use nimbus_domain::preferences::ViewMode;
use nimbus_domain::query::QueryRow;

/// A rendered document page in one of the three view modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentView {
    /// Tabular rendering.
    Table(TableView),
    /// Raw JSON rendering.
    Json(JsonView),
    /// Card grid rendering.
    Card(CardView),
}

/// Tabular rendering: one column per attribute key seen on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Attribute columns, sorted by name. System fields (`id`,
    /// `$dist`, vectors) are excluded and rendered separately.
    pub columns: Vec<String>,
    /// Whether a distance column applies.
    pub has_distance: bool,
    /// Row data.
    pub rows: Vec<TableRow>,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Document id.
    pub id: String,
    /// Formatted distance, when present.
    pub distance: Option<String>,
    /// Cell text per column, aligned with `TableView::columns`.
    pub cells: Vec<String>,
}

/// Raw JSON rendering of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonView {
    /// Pretty-printed document array with vector-like values
    /// collapsed to a placeholder.
    pub text: String,
}

/// Card grid rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    /// One card per document.
    pub cards: Vec<DocumentCard>,
}

/// One document card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCard {
    /// Document id.
    pub id: String,
    /// Formatted distance, when present.
    pub distance: Option<String>,
    /// Pretty-printed attributes, system fields excluded.
    pub body: String,
}

/// Renders a fetched page into the requested view mode.
#[must_use]
pub fn render_documents(rows: &[QueryRow], mode: ViewMode) -> DocumentView {
    match mode {
        ViewMode::Table => DocumentView::Table(render_table(rows)),
        ViewMode::Json => DocumentView::Json(render_json(rows)),
        ViewMode::Card => DocumentView::Card(render_cards(rows)),
    }
}

fn format_distance(dist: f64) -> String {
    format!("{dist:.4}")
}

fn render_table(rows: &[QueryRow]) -> TableView {
    let columns: Vec<String> = rows
        .iter()
        .flat_map(|row| row.attributes.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let has_distance = rows.first().is_some_and(|row| row.dist.is_some());

    let table_rows = rows
        .iter()
        .map(|row| TableRow {
            id: row.id.to_string(),
            distance: row.dist.map(format_distance),
            cells: columns
                .iter()
                .map(|column| cell_display(row.attributes.get(column)))
                .collect(),
        })
        .collect();

    TableView {
        columns,
        has_distance,
        rows: table_rows,
    }
}

/// Cell text for one attribute value.
fn cell_display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "—".to_string(),
        Some(Value::Array(items)) => format!("[{} items]", items.len()),
        Some(obj @ Value::Object(_)) => {
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        }
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn render_json(rows: &[QueryRow]) -> JsonView {
    let collapsed: Vec<Value> = rows
        .iter()
        .map(|row| {
            serde_json::to_value(row).map_or(Value::Null, |mut value| {
                if let Value::Object(entries) = &mut value {
                    for entry in entries.values_mut() {
                        if let Some(dimensions) = vector_dimensions(entry) {
                            *entry = Value::String(format!("[Vector: {dimensions} dimensions]"));
                        }
                    }
                }
                value
            })
        })
        .collect();

    let text = serde_json::to_string_pretty(&collapsed).unwrap_or_else(|_| "[]".to_string());
    JsonView { text }
}

/// Dimensionality of a vector-like value: a numeric array longer
/// than 10 entries.
fn vector_dimensions(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) if items.len() > 10 && items.iter().all(Value::is_number) => {
            Some(items.len())
        }
        _ => None,
    }
}

fn render_cards(rows: &[QueryRow]) -> CardView {
    let cards = rows
        .iter()
        .map(|row| DocumentCard {
            id: row.id.to_string(),
            distance: row.dist.map(format_distance),
            body: serde_json::to_string_pretty(&row.attributes)
                .unwrap_or_else(|_| "{}".to_string()),
        })
        .collect();
    CardView { cards }
}

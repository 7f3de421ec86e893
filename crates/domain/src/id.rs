//! ID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v7 as a string.
///
/// This is the standard ID format for all Nimbus entities. UUID v7
/// includes timestamp information and is sortable.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

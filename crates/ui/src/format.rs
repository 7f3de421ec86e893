//! Display formatting helpers.

use chrono::DateTime;

const BYTE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count with 1024-based units, two decimals.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", BYTE_UNITS[unit])
}

/// Formats a count with thousands separators.
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats an API timestamp for display; unparseable or missing
/// values render as a placeholder dash.
#[must_use]
pub fn format_timestamp(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(
            || "—".to_string(),
            |parsed| parsed.format("%b %-d, %Y %H:%M").to_string(),
        )
}

/// Truncates a string to `length` characters, appending an ellipsis
/// when anything was cut.
#[must_use]
pub fn truncate(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let cut: String = text.chars().take(length).collect();
    format!("{cut}...")
}

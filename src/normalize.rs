//! Tolerant numeric parsing and name normalization for distributor exports.

use std::sync::LazyLock;

use regex::Regex;

use crate::row::Row;

/// Glyphs stripped before parsing amounts.
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];

/// Converts a raw field into a finite number, returning `0.0` when nothing parses.
///
/// Commas, whitespace and currency glyphs are removed first, then the longest
/// leading decimal literal is parsed (`"12 streams"` yields `12`). Non-finite
/// results collapse to `0.0`.
///
/// ```
/// use royalty_dash::normalize::normalize_number;
///
/// assert_eq!(normalize_number("₹1,200.50"), 1200.5);
/// assert_eq!(normalize_number("N/A"), 0.0);
/// ```
pub fn normalize_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == ',' || CURRENCY_SYMBOLS.contains(c)))
        .collect();

    match numeric_prefix(&cleaned).parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// [`normalize_number`] for a field that may be missing altogether.
pub fn normalize_field(raw: Option<&str>) -> f64 {
    raw.map(normalize_number).unwrap_or(0.0)
}

/// Normalized value of `column` in `row`; `0.0` when the column is absent.
pub fn row_number(row: &Row, column: Option<&str>) -> f64 {
    normalize_field(column.and_then(|c| row.get(c)))
}

/// Leading decimal literal: optional sign, digits with an optional fraction
/// (or a bare fraction), optional exponent.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
});

static LOCATION_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_.\-]+").unwrap());

/// Longest prefix of `s` that forms a decimal literal, or `""`.
pub(crate) fn numeric_prefix(s: &str) -> &str {
    NUMERIC_PREFIX.find(s).map_or("", |m| m.as_str())
}

/// Display-normalizes a location for matching against geographic feature names.
///
/// Lowercases, collapses runs of `_`, `-`, `.` and whitespace into a single
/// space and trims. Never used as an aggregation key.
pub fn normalize_location_name(name: &str) -> String {
    LOCATION_SEPARATORS
        .replace_all(&name.to_lowercase(), " ")
        .trim()
        .to_string()
}

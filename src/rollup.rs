//! Categorical rollups: label -> total, with each label's share of the grand total.

use serde::Serialize;

use crate::group::{GroupTable, UNKNOWN_GROUP, pct};
use crate::normalize::normalize_field;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEntry {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}

/// Sums `value_column` per distinct `label_column` value.
///
/// Columns are looked up exactly as given. Blank or missing labels land in
/// `"Unknown"`. Entries come back in first-encounter order.
pub fn rollup(rows: &[Row], label_column: &str, value_column: &str) -> Vec<RollupEntry> {
    let sums = rows.iter().fold(GroupTable::<(String, f64)>::new(), |mut table, row| {
        let label = row.get_non_empty(label_column).unwrap_or(UNKNOWN_GROUP);
        table
            .entry_or_insert_with(label, |l| (l.to_string(), 0.0))
            .1 += normalize_field(row.get(value_column));
        table
    });

    let grand_total: f64 = sums.iter().map(|(_, value)| value).sum();

    sums.into_iter()
        .map(|(label, value)| RollupEntry {
            percent: pct(value, grand_total),
            label,
            value,
        })
        .collect()
}

/// Sorts by descending value (stable) and keeps at most `limit` entries.
pub fn top_n(mut entries: Vec<RollupEntry>, limit: Option<usize>) -> Vec<RollupEntry> {
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// The two series behind the dashboard's overview charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSeries {
    /// `total` summed per `language`.
    pub language_streams: Vec<RollupEntry>,
    /// `income` summed per `artist_name`.
    pub artist_income: Vec<RollupEntry>,
}

pub fn dashboard_series(rows: &[Row]) -> DashboardSeries {
    DashboardSeries {
        language_streams: rollup(rows, "language", "total"),
        artist_income: rollup(rows, "artist_name", "income"),
    }
}

//! Single-source aggregation: one distributor's rows grouped by a resolved key.
//!
//! Columns are resolved once against the first row's headers, then every row
//! is folded into a fresh [`GroupTable`]. The amount column is summed into the
//! group's stream total; the group's top song is the first row reaching the
//! highest secondary value.

use serde::Serialize;
use tracing::debug;

use crate::columns::{
    INCOME_CANDIDATES, ROYALTY_CANDIDATES, SONG_CANDIDATES, first_present, resolve_column,
};
use crate::group::{GroupTable, UNKNOWN_GROUP};
use crate::normalize::row_number;
use crate::row::Row;

/// Candidate lists for each logical field an aggregation reads.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<'a> {
    pub group: &'a [&'a str],
    /// Summed into `total_streams`.
    pub amount: &'a [&'a str],
    /// Picks the top song.
    pub secondary: &'a [&'a str],
    /// Summed into `total_income`.
    pub income: &'a [&'a str],
    pub royalty: &'a [&'a str],
    pub song: &'a [&'a str],
}

impl<'a> FieldSpec<'a> {
    pub fn new(group: &'a [&'a str], amount: &'a [&'a str], secondary: &'a [&'a str]) -> Self {
        Self {
            group,
            amount,
            secondary,
            income: INCOME_CANDIDATES,
            royalty: ROYALTY_CANDIDATES,
            song: SONG_CANDIDATES,
        }
    }
}

/// Actual header names picked for a [`FieldSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedColumns {
    pub group: Option<String>,
    pub amount: Option<String>,
    pub secondary: Option<String>,
    pub income: Option<String>,
    pub royalty: Option<String>,
    pub song: Option<String>,
}

impl ResolvedColumns {
    pub fn resolve(headers_of: &Row, spec: &FieldSpec<'_>) -> Self {
        let resolve = |candidates: &[&str]| resolve_column(headers_of.headers(), candidates);
        Self {
            group: resolve(spec.group),
            amount: resolve(spec.amount),
            secondary: resolve(spec.secondary),
            income: resolve(spec.income),
            royalty: resolve(spec.royalty),
            song: resolve(spec.song),
        }
    }
}

/// A row as it contributed to a group, with its normalized fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub song_name: String,
    pub income: f64,
    pub royalty: f64,
    /// Amount column value.
    pub streams: f64,
    /// Secondary column value, compared for the top song.
    pub rank: f64,
    pub row: Row,
}

impl SongRecord {
    pub fn from_row(row: &Row, columns: &ResolvedColumns) -> Self {
        let song_name = columns
            .song
            .as_deref()
            .and_then(|c| row.get(c))
            .unwrap_or_default()
            .to_string();

        Self {
            song_name,
            income: row_number(row, columns.income.as_deref()),
            royalty: row_number(row, columns.royalty.as_deref()),
            streams: row_number(row, columns.amount.as_deref()),
            rank: row_number(row, columns.secondary.as_deref()),
            row: row.clone(),
        }
    }
}

/// Running totals for one GroupKey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub key: String,
    pub total_income: f64,
    pub total_royalty: f64,
    pub total_streams: f64,
    pub song_count: usize,
    pub top_song: String,
    /// Highest secondary value seen, held by `top_song`.
    pub max_streams: f64,
    pub songs: Vec<SongRecord>,
}

impl GroupAggregate {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            total_income: 0.0,
            total_royalty: 0.0,
            total_streams: 0.0,
            song_count: 0,
            top_song: String::new(),
            max_streams: 0.0,
            songs: Vec::new(),
        }
    }

    /// Folds one song into the totals. The top song only changes on a strictly
    /// higher secondary value, so the earliest row wins ties.
    pub fn push(&mut self, song: SongRecord) {
        if self.songs.is_empty() || song.rank > self.max_streams {
            self.max_streams = song.rank;
            self.top_song = song.song_name.clone();
        }

        self.total_income += song.income;
        self.total_royalty += song.royalty;
        self.total_streams += song.streams;
        self.song_count += 1;
        self.songs.push(song);
    }
}

/// [`GroupAggregate`] without its song list, for flat exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub key: String,
    pub total_income: f64,
    pub total_royalty: f64,
    pub total_streams: f64,
    pub song_count: usize,
    pub top_song: String,
    pub max_streams: f64,
}

impl From<&GroupAggregate> for GroupRecord {
    fn from(g: &GroupAggregate) -> Self {
        Self {
            key: g.key.clone(),
            total_income: g.total_income,
            total_royalty: g.total_royalty,
            total_streams: g.total_streams,
            song_count: g.song_count,
            top_song: g.top_song.clone(),
            max_streams: g.max_streams,
        }
    }
}

/// GroupKey for `row`: the resolved column's value, else the first non-blank
/// fallback column, else [`UNKNOWN_GROUP`].
pub fn group_key(row: &Row, resolved: Option<&str>, fallbacks: &[&str]) -> String {
    resolved
        .and_then(|column| row.get_non_empty(column))
        .or_else(|| first_present(row, fallbacks))
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

/// Groups rows by the first matching grouping column, summing the amount
/// column into `total_streams` and income into `total_income`.
pub fn aggregate_by_group(
    rows: &[Row],
    group_candidates: &[&str],
    amount_candidates: &[&str],
    secondary_candidates: &[&str],
) -> GroupTable<GroupAggregate> {
    aggregate_with(
        rows,
        &FieldSpec::new(group_candidates, amount_candidates, secondary_candidates),
    )
}

/// [`aggregate_by_group`] with full control over every field's candidates.
pub fn aggregate_with(rows: &[Row], spec: &FieldSpec<'_>) -> GroupTable<GroupAggregate> {
    let Some(first) = rows.first() else {
        return GroupTable::new();
    };

    let columns = ResolvedColumns::resolve(first, spec);
    debug!(
        rows = rows.len(),
        group = ?columns.group,
        amount = ?columns.amount,
        secondary = ?columns.secondary,
        income = ?columns.income,
        "Resolved aggregation columns"
    );

    rows.iter().fold(GroupTable::new(), |mut table, row| {
        let key = group_key(row, columns.group.as_deref(), spec.group);
        table
            .entry_or_insert_with(&key, GroupAggregate::new)
            .push(SongRecord::from_row(row, &columns));
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{AMOUNT_CANDIDATES, NAME_CANDIDATES};
    use crate::normalize::normalize_number;

    const STREAMS: &[&str] = &["total", "streams"];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn song(language: &str, name: &str, total: &str, income: &str) -> Row {
        Row::from_pairs([
            ("language", language),
            ("song_name", name),
            ("total", total),
            ("income", income),
        ])
    }

    fn by_streams(rows: &[Row]) -> GroupTable<GroupAggregate> {
        aggregate_by_group(rows, NAME_CANDIDATES, STREAMS, STREAMS)
    }

    #[test]
    fn test_empty_rows_give_empty_table() {
        assert!(by_streams(&[]).is_empty());
    }

    #[test]
    fn test_groups_and_sums() {
        let rows = vec![
            song("Hindi", "Tum Hi Ho", "100", "50.5"),
            song("Hindi", "Kesariya", "50", "10"),
            song("Tamil", "Kolaveri", "30", "5"),
        ];
        let table = by_streams(&rows);

        assert_eq!(table.len(), 2);
        let hindi = table.get("Hindi").unwrap();
        assert_eq!(hindi.total_streams, 150.0);
        assert_eq!(hindi.total_income, 60.5);
        assert_eq!(hindi.song_count, 2);
        assert_eq!(hindi.songs.len(), hindi.song_count);
        assert_eq!(hindi.top_song, "Tum Hi Ho");

        let tamil = table.get("Tamil").unwrap();
        assert_eq!(tamil.total_streams, 30.0);
        assert_eq!(tamil.max_streams, 30.0);
    }

    #[test]
    fn test_top_song_tie_keeps_first() {
        let rows = vec![
            song("Hindi", "First", "100", "1"),
            song("Hindi", "Second", "100", "1"),
        ];
        assert_eq!(by_streams(&rows).get("Hindi").unwrap().top_song, "First");
    }

    #[test]
    fn test_top_song_moves_on_strict_improvement() {
        let rows = vec![
            song("Hindi", "Low", "10", "1"),
            song("Hindi", "High", "90", "1"),
            song("Hindi", "Mid", "50", "1"),
        ];
        let table = by_streams(&rows);
        let hindi = table.get("Hindi").unwrap();
        assert_eq!(hindi.top_song, "High");
        assert_eq!(hindi.max_streams, 90.0);
    }

    #[test]
    fn test_secondary_column_picks_top_song() {
        let rows = vec![
            song("Hindi", "Most Streamed", "900", "1"),
            song("Hindi", "Best Paid", "100", "80"),
        ];
        let table = aggregate_by_group(&rows, NAME_CANDIDATES, STREAMS, &["income"]);
        let hindi = table.get("Hindi").unwrap();
        assert_eq!(hindi.top_song, "Best Paid");
        assert_eq!(hindi.max_streams, 80.0);
        assert_eq!(hindi.total_streams, 1000.0);
        assert_eq!(hindi.total_income, 81.0);
    }

    #[test]
    fn test_missing_group_value_falls_back_to_unknown() {
        let rows = vec![
            Row::from_pairs([("language", ""), ("total", "7")]),
            Row::from_pairs([("language", "Hindi"), ("total", "3")]),
        ];
        let table = by_streams(&rows);
        assert_eq!(table.get("Unknown").unwrap().total_streams, 7.0);
        assert_eq!(table.get("Hindi").unwrap().total_streams, 3.0);
    }

    #[test]
    fn test_no_grouping_column_at_all() {
        let rows = vec![Row::from_pairs([("song_name", "x"), ("total", "4")])];
        let table = by_streams(&rows);
        let unknown = table.get("Unknown").unwrap();
        assert_eq!(unknown.total_streams, 4.0);
        assert_eq!(unknown.total_income, 0.0);
    }

    #[test]
    fn test_mixed_case_headers_resolve() {
        let rows = vec![Row::from_pairs([
            ("Language", "Punjabi"),
            ("Streams", "1,500"),
            ("Income", "₹20"),
        ])];
        let table = by_streams(&rows);
        let punjabi = table.get("Punjabi").unwrap();
        assert_eq!(punjabi.total_streams, 1500.0);
        assert_eq!(punjabi.total_income, 20.0);
    }

    #[test]
    fn test_amount_totals_are_conserved() {
        let rows = vec![
            song("Hindi", "a", "1,000", "12.5"),
            song("Tamil", "b", "N/A", "₹3"),
            song("", "c", "250.25", "N/A"),
            song("Hindi", "d", "-5", "50"),
        ];
        let direct = |column: &str| -> f64 {
            rows.iter()
                .map(|r| normalize_number(r.get(column).unwrap()))
                .sum()
        };

        // amount and secondary resolve to different columns either way round
        let by_total = aggregate_by_group(&rows, NAME_CANDIDATES, AMOUNT_CANDIDATES, &["income"]);
        let grouped: f64 = by_total.iter().map(|g| g.total_streams).sum();
        assert!(close(grouped, direct("total")));

        let by_income = aggregate_by_group(&rows, NAME_CANDIDATES, &["income"], &["total"]);
        let grouped: f64 = by_income.iter().map(|g| g.total_streams).sum();
        assert!(close(grouped, direct("income")));
    }

    #[test]
    fn test_song_records_keep_source_row() {
        let rows = vec![song("Hindi", "Tum Hi Ho", "100", "50.5")];
        let table = by_streams(&rows);
        let record = &table.get("Hindi").unwrap().songs[0];
        assert_eq!(record.song_name, "Tum Hi Ho");
        assert_eq!(record.income, 50.5);
        assert_eq!(record.streams, 100.0);
        assert_eq!(record.rank, 100.0);
        assert_eq!(record.row, rows[0]);

        let flat = GroupRecord::from(table.get("Hindi").unwrap());
        assert_eq!(flat.key, "Hindi");
        assert_eq!(flat.song_count, 1);
        assert_eq!(flat.top_song, "Tum Hi Ho");
    }
}

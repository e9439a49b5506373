//! Heuristic column-name resolution across inconsistent distributor headers.
//!
//! Each logical field (grouping dimension, amount, stream count, ...) has an
//! ordered list of candidate column names. [`resolve_column`] picks the first
//! candidate present in a header set, ignoring case, and hands back the header
//! exactly as it is spelled so that row lookups hit.
//!
//! Resolution happens once per aggregation call against the first row's
//! headers. Rows from one export are assumed to share a header set; a source
//! that mixes header variants across rows can silently miss data in the later
//! rows.

use crate::row::Row;

/// Grouping columns for language/artist breakdowns.
pub const NAME_CANDIDATES: &[&str] = &[
    "language",
    "lang",
    "language_name",
    "artist_name",
    "artist",
    "name",
];

/// Numeric amount columns.
pub const AMOUNT_CANDIDATES: &[&str] = &[
    "value", "count", "total", "streams", "amount", "qty", "quantity", "plays", "income",
];

/// Per-row fallbacks when a row lacks the resolved grouping column.
pub const GROUP_FALLBACKS: &[&str] = &["language", "artist_name", "artist"];

/// Per-row fallbacks when a row lacks the resolved amount column.
pub const AMOUNT_FALLBACKS: &[&str] = &["value", "total", "streams"];

pub const LOCATION_CANDIDATES: &[&str] = &["file_name", "fileName", "FileName", "location"];
pub const INCOME_CANDIDATES: &[&str] = &["income", "Income", "income_usd", "revenue"];
pub const ROYALTY_CANDIDATES: &[&str] = &["royality", "royalty", "Royality"];
pub const STREAM_CANDIDATES: &[&str] = &["total", "Total", "streams", "play_count"];
pub const SONG_CANDIDATES: &[&str] = &["song_name", "songName", "SongName", "title"];

/// Returns the header matching the earliest candidate, compared case-insensitively.
///
/// Candidate order decides the winner, not header order.
pub fn resolve_column<'a, H, C>(headers: H, candidates: &[C]) -> Option<String>
where
    H: IntoIterator<Item = &'a str>,
    C: AsRef<str>,
{
    let headers: Vec<(String, &str)> = headers
        .into_iter()
        .map(|h| (h.to_lowercase(), h))
        .collect();

    candidates.iter().find_map(|candidate| {
        let wanted = candidate.as_ref().to_lowercase();
        headers
            .iter()
            .find(|(lower, _)| *lower == wanted)
            .map(|(_, original)| original.to_string())
    })
}

/// Resolves against the header set of the first row, if any.
pub fn resolve_in_rows<C: AsRef<str>>(rows: &[Row], candidates: &[C]) -> Option<String> {
    rows.first()
        .and_then(|first| resolve_column(first.headers(), candidates))
}

/// First candidate column holding a non-blank value in this particular row.
pub fn first_present<'r, C: AsRef<str>>(row: &'r Row, candidates: &[C]) -> Option<&'r str> {
    candidates
        .iter()
        .find_map(|candidate| row.get_non_empty(candidate.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match_keeps_original_casing() {
        let headers = ["Song_Name", "LANGUAGE", "Total"];
        assert_eq!(
            resolve_column(headers, &["language"]),
            Some("LANGUAGE".to_string())
        );
    }

    #[test]
    fn test_candidate_order_wins_over_header_order() {
        let headers = ["B", "A"];
        assert_eq!(resolve_column(headers, &["a", "b"]), Some("A".to_string()));
        assert_eq!(resolve_column(headers, &["b", "a"]), Some("B".to_string()));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(resolve_column(["foo", "bar"], NAME_CANDIDATES), None);
        assert_eq!(resolve_column(Vec::<&str>::new(), NAME_CANDIDATES), None);
    }

    #[test]
    fn test_exact_match_only() {
        // "language_code" must not satisfy "language"
        assert_eq!(resolve_column(["language_code"], &["language"]), None);
    }

    #[test]
    fn test_resolve_in_rows_uses_first_row() {
        let rows = vec![
            Row::from_pairs([("artist", "A"), ("plays", "3")]),
            Row::from_pairs([("language", "Hindi"), ("plays", "4")]),
        ];
        assert_eq!(
            resolve_in_rows(&rows, NAME_CANDIDATES),
            Some("artist".to_string())
        );
        assert_eq!(resolve_in_rows(&[], NAME_CANDIDATES), None);
    }

    #[test]
    fn test_first_present_skips_blank_values() {
        let row = Row::from_pairs([("file_name", ""), ("location", "Mumbai")]);
        assert_eq!(first_present(&row, LOCATION_CANDIDATES), Some("Mumbai"));
        assert_eq!(first_present(&row, SONG_CANDIDATES), None);
    }
}

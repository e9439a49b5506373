//! Row-table helpers for the artist/album listings: search, sort, paging and
//! cell formatting.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::numeric_prefix;
use crate::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// Rows where any of `columns` contains `term`, ignoring case.
///
/// An empty term keeps every row.
pub fn filter_rows(rows: &[Row], columns: &[&str], term: &str) -> Vec<Row> {
    let term = term.to_lowercase();
    rows.iter()
        .filter(|row| {
            columns.iter().any(|column| {
                row.get(column)
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&term)
            })
        })
        .cloned()
        .collect()
}

/// Sort key for a cell: anything starting with a number sorts before text.
#[derive(Debug, Clone, Copy)]
enum CellKey<'a> {
    Num(f64),
    Text(&'a str),
}

impl<'a> CellKey<'a> {
    fn of(raw: &'a str) -> Self {
        match numeric_prefix(raw.trim()).parse::<f64>() {
            Ok(n) => CellKey::Num(n),
            Err(_) => CellKey::Text(raw),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellKey::Num(x), CellKey::Num(y)) => x.total_cmp(y),
            (CellKey::Num(_), CellKey::Text(_)) => Ordering::Less,
            (CellKey::Text(_), CellKey::Num(_)) => Ordering::Greater,
            (CellKey::Text(x), CellKey::Text(y)) => x.cmp(y),
        }
    }
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    CellKey::of(a).compare(&CellKey::of(b))
}

/// Stable sort on `key`. Numeric cells come first in numeric order, then text
/// cells in byte order; missing cells read as empty text.
pub fn sort_rows(rows: &mut [Row], key: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = compare_cells(a.get(key).unwrap_or_default(), b.get(key).unwrap_or_default());
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// 1-based page of `items`; page 0 is treated as page 1.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 {
        return &[];
    }
    let start = page.max(1).saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        len.div_ceil(per_page)
    }
}

/// Cleans a raw cell for display.
///
/// Strips one pair of surrounding quotes and brackets, then truncates (never
/// rounds) plain decimal numbers to three fractional digits. Anything else is
/// returned trimmed.
pub fn format_cell(raw: &str) -> String {
    let unquoted = strip_wrapping(raw, '"', '"');
    let cell = strip_wrapping(unquoted, '[', ']').trim();

    if !PLAIN_DECIMAL.is_match(&cell.replace(',', "")) {
        return cell.to_string();
    }

    match cell.split_once('.') {
        None => cell.to_string(),
        Some((int_part, frac)) => {
            let frac: String = frac.chars().take(3).collect();
            format!("{int_part}.{frac:0<3}")
        }
    }
}

fn strip_wrapping(s: &str, open: char, close: char) -> &str {
    let s = s.strip_prefix(open).unwrap_or(s);
    s.strip_suffix(close).unwrap_or(s)
}

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    fn artists() -> Vec<Row> {
        vec![
            Row::from_pairs([("artist_name", "Arijit Singh"), ("income", "10.5"), ("total", "900")]),
            Row::from_pairs([("artist_name", "Shreya Ghoshal"), ("income", "2"), ("total", "1200")]),
            Row::from_pairs([("artist_name", "anirudh"), ("income", "N/A"), ("total", "50")]),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let rows = artists();
        let hits = filter_rows(&rows, &["artist_name"], "SINGH");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get("artist_name"), Some("Arijit Singh"));

        assert_eq!(filter_rows(&rows, &["artist_name"], "").len(), 3);
        assert!(filter_rows(&rows, &["missing"], "a").is_empty());
    }

    #[test]
    fn test_sort_numeric_columns() {
        let mut rows = artists();
        sort_rows(&mut rows, "total", SortDirection::Descending);
        let totals: Vec<_> = rows.iter().map(|r| r.get("total").unwrap()).collect();
        assert_eq!(totals, vec!["1200", "900", "50"]);
    }

    #[test]
    fn test_sort_text_columns() {
        let mut rows = artists();
        sort_rows(&mut rows, "artist_name", SortDirection::Ascending);
        let names: Vec<_> = rows.iter().map(|r| r.get("artist_name").unwrap()).collect();
        // byte order puts capitals first
        assert_eq!(names, vec!["Arijit Singh", "Shreya Ghoshal", "anirudh"]);
    }

    #[test]
    fn test_sort_mixed_signed_and_text_cells() {
        let cells = ["-5", "+3", "+x", "-", "10", "+7", "-2", "+a", "N/A", "4"];
        let mut rows: Vec<Row> = cells
            .iter()
            .cycle()
            .take(400)
            .map(|c| Row::from_pairs([("total", *c)]))
            .collect();

        sort_rows(&mut rows, "total", SortDirection::Ascending);

        let sorted: Vec<_> = rows.iter().map(|r| r.get("total").unwrap()).collect();
        assert!(sorted.windows(2).all(|w| compare_cells(w[0], w[1]) != Ordering::Greater));

        let mut distinct = sorted.clone();
        distinct.dedup();
        assert_eq!(
            distinct,
            vec!["-5", "-2", "+3", "4", "+7", "10", "+a", "+x", "-", "N/A"]
        );
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=30).collect();
        assert_eq!(paginate(&items, 1, 13), &items[0..13]);
        assert_eq!(paginate(&items, 3, 13), &items[26..30]);
        assert!(paginate(&items, 4, 13).is_empty());
        assert_eq!(paginate(&items, 0, 13), &items[0..13]);
        assert!(paginate(&items, 1, 0).is_empty());
        assert_eq!(page_count(30, 13), 3);
        assert_eq!(page_count(0, 13), 0);
    }

    #[test]
    fn test_format_cell_truncates_decimals() {
        assert_eq!(format_cell("12.34567"), "12.345");
        assert_eq!(format_cell("12.3"), "12.300");
        assert_eq!(format_cell("-0.9999"), "-0.999");
        assert_eq!(format_cell("1,234.5678"), "1,234.567");
        assert_eq!(format_cell("42"), "42");
    }

    #[test]
    fn test_format_cell_strips_wrapping() {
        assert_eq!(format_cell("\"7.12345\""), "7.123");
        assert_eq!(format_cell("[Hindi]"), "Hindi");
        assert_eq!(format_cell("  Arijit  "), "Arijit");
        assert_eq!(format_cell("1.2.3"), "1.2.3");
        assert_eq!(format_cell(""), "");
    }
}

//! Naive CSV parser for distributor exports.
//!
//! The exports are plain comma-separated text: no quoting or escaping is
//! honoured. Blank lines are dropped, the first remaining line is the header.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};

use crate::row::Row;

/// Parses CSV text into rows keyed by the (trimmed) header names.
///
/// Short lines are padded with empty values; surplus values are dropped.
///
/// # Errors
///
/// Returns an error if the underlying reader fails on a record.
pub fn parse_csv(text: &str) -> Result<Vec<Row>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let cleaned = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(cleaned.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("failed to read CSV record {}", line + 1))?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or_default()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// [`parse_csv`] over raw bytes, which must be UTF-8.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Vec<Row>> {
    let text = std::str::from_utf8(bytes).context("CSV is not valid UTF-8")?;
    parse_csv(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_text_returns_no_rows() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("\n\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_header_only() {
        assert!(parse_csv("language,total\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_trims_and_keeps_header_order() {
        let rows = parse_csv(" language , total \r\nHindi , 100\r\n\r\nTamil,30\r\n").unwrap();

        assert_eq!(rows.len(), 2);
        let headers: Vec<_> = rows[0].headers().collect();
        assert_eq!(headers, vec!["language", "total"]);
        assert_eq!(rows[0].get("language"), Some("Hindi"));
        assert_eq!(rows[0].get("total"), Some("100"));
        assert_eq!(rows[1].get("language"), Some("Tamil"));
    }

    #[test]
    fn test_short_and_long_lines() {
        let rows = parse_csv("a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[0].get("c"), Some(""));
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1].get("c"), Some("3"));
    }

    #[test]
    fn test_quotes_are_not_special() {
        let rows = parse_csv("song,income\n\"Hello, World\",5\n").unwrap();
        assert_eq!(rows[0].get("song"), Some("\"Hello"));
        assert_eq!(rows[0].get("income"), Some("World\""));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let rows = parse_csv("\u{feff}language,total\nHindi,1\n").unwrap();
        assert_eq!(rows[0].get("language"), Some("Hindi"));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let result = parse_csv_bytes(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(result.is_err());
    }
}

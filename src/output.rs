//! Output formatting and persistence for aggregate records.
//!
//! Supports pretty-printing, JSON reports and CSV export.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::row::Row;
use csv::WriterBuilder;
use std::fmt::Debug;

/// JSON envelope around any aggregate payload.
#[derive(Debug, Serialize)]
pub struct Report<'a, T: Serialize> {
    pub kind: &'a str,
    pub generated_at: DateTime<Utc>,
    pub data: &'a T,
}

impl<'a, T: Serialize> Report<'a, T> {
    pub fn new(kind: &'a str, data: &'a T) -> Self {
        Self {
            kind,
            generated_at: Utc::now(),
            data,
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    info!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON inside a [`Report`] envelope.
pub fn print_json<T: Serialize>(kind: &str, value: &T) -> Result<()> {
    info!("{}", to_json(kind, value)?);
    Ok(())
}

pub fn to_json<T: Serialize>(kind: &str, value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Report::new(kind, value))?)
}

/// Writes records to a CSV file with a header row, replacing any existing file.
///
/// Records must serialize to flat structs (no nested sequences).
pub fn write_records<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    debug!(path, records = records.len(), "Writing CSV records");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create {path}"))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `columns` of each row as CSV, header first. Missing cells are empty.
pub fn write_rows(path: &str, columns: &[&str], rows: &[Row]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV rows");

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {path}"))?;

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| row.get(c).unwrap_or_default()))?;
    }
    writer.flush()?;

    Ok(())
}

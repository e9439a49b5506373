//! Transport for distributor exports: local files or HTTP(S) URLs.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::parser::parse_csv_bytes;
use crate::row::Row;

/// Whether `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// GETs `url`, failing on any non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid url {url}"))?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        bail!("failed to fetch {url}: {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Loads and parses one CSV export from a file path or URL.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Row>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "CSV bytes loaded, parsing");

    let rows = parse_csv_bytes(&bytes).with_context(|| format!("failed to parse {source}"))?;
    debug!(rows = rows.len(), "CSV parsed");
    Ok(rows)
}

//! Dashboard configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "jio_source": "public/jiosaavn-report.csv",
//!   "airtel_source": "https://reports.example.com/wynk-report.csv",
//!   "group_candidates": ["language", "artist_name"],
//!   "top_n": 8
//! }
//! ```
//! `ROYALTY_JIO_SOURCE`, `ROYALTY_AIRTEL_SOURCE` and `ROYALTY_LOCATION_SOURCE`
//! override the matching source fields.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::columns::{AMOUNT_CANDIDATES, NAME_CANDIDATES};
use crate::reconcile::ReconcileOptions;

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub jio_source: String,
    pub airtel_source: String,
    /// Falls back to the Airtel/Wynk export, which carries the location column.
    pub location_source: Option<String>,
    pub group_candidates: Vec<String>,
    pub amount_candidates: Vec<String>,
    pub vi_key: String,
    pub top_n: Option<usize>,
    pub fetch_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            jio_source: "jiosaavn-report.csv".to_string(),
            airtel_source: "wynk-report.csv".to_string(),
            location_source: None,
            group_candidates: owned(NAME_CANDIDATES),
            amount_candidates: owned(AMOUNT_CANDIDATES),
            vi_key: "vi".to_string(),
            top_n: None,
            fetch_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid dashboard config {path}"))?;
        Ok(config)
    }

    /// Like [`DashboardConfig::load`], but a missing file yields the defaults.
    /// Environment overrides are applied either way.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            debug!(path, "No config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `ROYALTY_*_SOURCE` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ROYALTY_JIO_SOURCE") {
            self.jio_source = v;
        }
        if let Some(v) = lookup("ROYALTY_AIRTEL_SOURCE") {
            self.airtel_source = v;
        }
        if let Some(v) = lookup("ROYALTY_LOCATION_SOURCE") {
            self.location_source = Some(v);
        }
    }

    pub fn location_source(&self) -> &str {
        self.location_source.as_deref().unwrap_or(&self.airtel_source)
    }

    /// Reconciliation options seeded from this config.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            vi_key: self.vi_key.clone(),
            group_candidates: self.group_candidates.clone(),
            jio_amount_candidates: self.amount_candidates.clone(),
            airtel_amount_candidates: self.amount_candidates.clone(),
            ..ReconcileOptions::default()
        }
    }
}

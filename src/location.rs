//! Per-location rollups for the city/map view.
//!
//! Location stats are ordinary [`GroupAggregate`]s keyed by the free-text
//! location column. For the choropleth, names are additionally display-normalized
//! into a separate lookup table; the aggregation key itself is never rewritten.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;

use crate::aggregate::{FieldSpec, GroupAggregate, aggregate_with};
use crate::columns::{
    INCOME_CANDIDATES, LOCATION_CANDIDATES, ROYALTY_CANDIDATES, SONG_CANDIDATES,
    STREAM_CANDIDATES,
};
use crate::normalize::normalize_location_name;
use crate::row::Row;

pub type LocationStats = GroupAggregate;

const LOCATION_FIELDS: FieldSpec<'static> = FieldSpec {
    group: LOCATION_CANDIDATES,
    amount: STREAM_CANDIDATES,
    secondary: STREAM_CANDIDATES,
    income: INCOME_CANDIDATES,
    royalty: ROYALTY_CANDIDATES,
    song: SONG_CANDIDATES,
};

/// Groups rows by location, in first-encounter order.
pub fn location_rollup(rows: &[Row]) -> Vec<LocationStats> {
    aggregate_with(rows, &LOCATION_FIELDS).into_vec()
}

/// Which location total feeds the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMetric {
    #[default]
    Income,
    Royalty,
    Streams,
}

impl LocationMetric {
    pub fn value_of(self, stats: &LocationStats) -> f64 {
        match self {
            LocationMetric::Income => stats.total_income,
            LocationMetric::Royalty => stats.total_royalty,
            LocationMetric::Streams => stats.total_streams,
        }
    }
}

impl FromStr for LocationMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" | "revenue" => Ok(LocationMetric::Income),
            "royalty" | "royality" => Ok(LocationMetric::Royalty),
            "streams" | "total" => Ok(LocationMetric::Streams),
            other => Err(format!("unknown location metric: {other}")),
        }
    }
}

/// Normalized location name -> summed metric, for matching map feature names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationValueMap {
    values: HashMap<String, f64>,
}

impl LocationValueMap {
    /// Locations whose names normalize to the same string are summed together.
    pub fn build(stats: &[LocationStats], metric: LocationMetric) -> Self {
        let mut values: HashMap<String, f64> = HashMap::new();
        for s in stats {
            *values.entry(normalize_location_name(&s.key)).or_default() += metric.value_of(s);
        }
        Self { values }
    }

    /// Value for an external feature name, `0.0` when nothing matches.
    pub fn value_for(&self, feature_name: &str) -> f64 {
        self.values
            .get(&normalize_location_name(feature_name))
            .copied()
            .unwrap_or(0.0)
    }

    /// Largest value, or `1.0` for an empty map.
    pub fn max_value(&self) -> f64 {
        self.values.values().copied().reduce(f64::max).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationShare {
    pub location: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLocation {
    pub location: String,
    pub total_income: f64,
}

/// Headline figures across all locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub total_revenue: f64,
    pub total_streams: f64,
    pub active_locations: usize,
    pub top_location: Option<TopLocation>,
    pub revenue_shares: Vec<LocationShare>,
}

impl LocationSummary {
    pub fn from_stats(stats: &[LocationStats]) -> Self {
        let total_revenue: f64 = stats.iter().map(|s| s.total_income).sum();
        let total_streams: f64 = stats.iter().map(|s| s.total_streams).sum();

        // A later location takes the crown on an income tie.
        let top_location = stats
            .iter()
            .reduce(|a, b| if a.total_income > b.total_income { a } else { b })
            .map(|s| TopLocation {
                location: s.key.clone(),
                total_income: s.total_income,
            });

        let revenue_shares = stats
            .iter()
            .map(|s| LocationShare {
                location: s.key.clone(),
                percent: if total_revenue > 0.0 {
                    s.total_income / total_revenue * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        Self {
            total_revenue,
            total_streams,
            active_locations: stats.len(),
            top_location,
            revenue_shares,
        }
    }
}

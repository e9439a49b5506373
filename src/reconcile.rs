//! Cross-distributor reconciliation.
//!
//! Rows from two exports (Jio and Airtel/Wynk) are folded into one shared
//! GroupKey space. Each group carries a total per distributor plus the share
//! of each distributor in the group's cross-source total. A third `vi`
//! total is picked up from whichever source happens to carry such a column;
//! contributions from both sources are summed.

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::group_key;
use crate::columns::{
    AMOUNT_CANDIDATES, AMOUNT_FALLBACKS, GROUP_FALLBACKS, NAME_CANDIDATES, resolve_column,
};
use crate::group::{GroupTable, pct};
use crate::normalize::normalize_field;
use crate::row::Row;

const DEFAULT_GROUP_KEY: &str = "language";
const DEFAULT_AMOUNT_KEY: &str = "value";
const DEFAULT_VI_KEY: &str = "vi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Distributor {
    Jio,
    Airtel,
    Vi,
}

/// One group's per-distributor totals and percentage shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledGroup {
    pub name: String,
    pub jio: f64,
    pub airtel: f64,
    pub vi: f64,
    pub jio_pct: f64,
    pub airtel_pct: f64,
    pub vi_pct: f64,
    /// Unfloored `jio + airtel + vi`.
    pub total: f64,
}

/// Percentages rounded for a stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub name: String,
    pub jio: f64,
    pub airtel: f64,
    pub vi: f64,
}

impl ReconciledGroup {
    fn from_totals(totals: Totals) -> Self {
        let total = totals.jio + totals.airtel + totals.vi;
        Self {
            jio_pct: pct(totals.jio, total),
            airtel_pct: pct(totals.airtel, total),
            vi_pct: pct(totals.vi, total),
            name: totals.name,
            jio: totals.jio,
            airtel: totals.airtel,
            vi: totals.vi,
            total,
        }
    }

    pub fn share_row(&self) -> ShareRow {
        ShareRow {
            name: self.name.clone(),
            jio: round2(self.jio_pct),
            airtel: round2(self.airtel_pct),
            vi: round2(self.vi_pct),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug)]
struct Totals {
    name: String,
    jio: f64,
    airtel: f64,
    vi: f64,
}

impl Totals {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            jio: 0.0,
            airtel: 0.0,
            vi: 0.0,
        }
    }

    fn add(&mut self, distributor: Distributor, value: f64) {
        match distributor {
            Distributor::Jio => self.jio += value,
            Distributor::Airtel => self.airtel += value,
            Distributor::Vi => self.vi += value,
        }
    }
}

/// Overrides and candidate lists for [`reconcile_with`].
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Explicit grouping column; skips resolution.
    pub group_by: Option<String>,
    /// Explicit amount column for the Jio rows.
    pub jio_key: Option<String>,
    /// Explicit amount column for the Airtel rows.
    pub airtel_key: Option<String>,
    /// Column carrying third-party (`vi`) amounts in either source.
    pub vi_key: String,
    pub group_candidates: Vec<String>,
    pub jio_amount_candidates: Vec<String>,
    pub airtel_amount_candidates: Vec<String>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            group_by: None,
            jio_key: None,
            airtel_key: None,
            vi_key: DEFAULT_VI_KEY.to_string(),
            group_candidates: owned(NAME_CANDIDATES),
            jio_amount_candidates: owned(AMOUNT_CANDIDATES),
            airtel_amount_candidates: owned(AMOUNT_CANDIDATES),
        }
    }
}

/// Column names actually used for a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileMeta {
    pub group_key: String,
    pub jio_num_key: String,
    pub airtel_num_key: String,
    pub vi_num_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub groups: Vec<ReconciledGroup>,
    pub meta: ReconcileMeta,
}

impl Reconciliation {
    pub fn share_rows(&self) -> Vec<ShareRow> {
        self.groups.iter().map(ReconciledGroup::share_row).collect()
    }
}

/// Merges two distributors' rows into groups sorted by descending cross-source total.
///
/// Groups with equal totals keep the order in which their keys were first seen.
pub fn reconcile(
    rows_a: &[Row],
    rows_b: &[Row],
    shared_group_candidates: &[&str],
    amount_candidates_a: &[&str],
    amount_candidates_b: &[&str],
) -> Vec<ReconciledGroup> {
    let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let options = ReconcileOptions {
        group_candidates: owned(shared_group_candidates),
        jio_amount_candidates: owned(amount_candidates_a),
        airtel_amount_candidates: owned(amount_candidates_b),
        ..ReconcileOptions::default()
    };
    reconcile_with(rows_a, rows_b, &options).groups
}

/// Full reconciliation with overrides, also reporting the resolved columns.
pub fn reconcile_with(
    rows_a: &[Row],
    rows_b: &[Row],
    options: &ReconcileOptions,
) -> Reconciliation {
    let headers_of = |rows: &[Row]| -> Vec<String> {
        rows.first()
            .map(|r| r.headers().map(str::to_string).collect())
            .unwrap_or_default()
    };
    let headers_a = headers_of(rows_a);
    let headers_b = headers_of(rows_b);

    let group_key_col = options
        .group_by
        .clone()
        .or_else(|| {
            resolve_column(
                headers_a.iter().chain(headers_b.iter()).map(String::as_str),
                options.group_candidates.as_slice(),
            )
        })
        .unwrap_or_else(|| {
            warn!(default = DEFAULT_GROUP_KEY, "No grouping column matched, using default");
            DEFAULT_GROUP_KEY.to_string()
        });

    let amount_key = |explicit: &Option<String>,
                      own: &[String],
                      other: &[String],
                      candidates: &[String]| {
        explicit
            .clone()
            .or_else(|| resolve_column(own.iter().map(String::as_str), candidates))
            .or_else(|| resolve_column(other.iter().map(String::as_str), candidates))
            .unwrap_or_else(|| DEFAULT_AMOUNT_KEY.to_string())
    };
    let jio_num_key = amount_key(
        &options.jio_key,
        &headers_a,
        &headers_b,
        &options.jio_amount_candidates,
    );
    let airtel_num_key = amount_key(
        &options.airtel_key,
        &headers_b,
        &headers_a,
        &options.airtel_amount_candidates,
    );

    let meta = ReconcileMeta {
        group_key: group_key_col,
        jio_num_key,
        airtel_num_key,
        vi_num_key: options.vi_key.clone(),
    };
    debug!(
        jio_rows = rows_a.len(),
        airtel_rows = rows_b.len(),
        group_key = %meta.group_key,
        jio_num_key = %meta.jio_num_key,
        airtel_num_key = %meta.airtel_num_key,
        "Reconciling distributor exports"
    );

    let table = fold_source(
        GroupTable::new(),
        rows_a,
        &meta,
        &meta.jio_num_key,
        Distributor::Jio,
        (Distributor::Airtel, "airtel"),
    );
    let table = fold_source(
        table,
        rows_b,
        &meta,
        &meta.airtel_num_key,
        Distributor::Airtel,
        (Distributor::Jio, "jio"),
    );

    let mut groups: Vec<ReconciledGroup> = table
        .into_iter()
        .map(ReconciledGroup::from_totals)
        .collect();
    // stable: ties stay in encounter order
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));

    Reconciliation { groups, meta }
}

/// Folds one source's rows into `table` under `own`, picking up the other
/// distributor's column and the vi column wherever the rows carry them.
fn fold_source(
    table: GroupTable<Totals>,
    rows: &[Row],
    meta: &ReconcileMeta,
    amount_key: &str,
    own: Distributor,
    (other, other_column): (Distributor, &str),
) -> GroupTable<Totals> {
    rows.iter().fold(table, |mut table, row| {
        let name = group_key(row, Some(meta.group_key.as_str()), GROUP_FALLBACKS);
        let amount = normalize_field(
            row.get(amount_key)
                .or_else(|| AMOUNT_FALLBACKS.iter().find_map(|c| row.get(c))),
        );

        let totals = table.entry_or_insert_with(&name, Totals::new);
        totals.add(own, amount);
        if let Some(vi) = row.get(&meta.vi_num_key) {
            totals.add(Distributor::Vi, normalize_field(Some(vi)));
        }
        if let Some(cross) = row.get(other_column) {
            totals.add(other, normalize_field(Some(cross)));
        }
        table
    })
}

//! Aggregation core for music-royalty CSV exports.
//!
//! Distributor reports (JioSaavn, Airtel/Wynk) arrive as loosely structured
//! CSV with inconsistent column names. This crate resolves those columns,
//! normalizes amounts and folds rows into per-language, per-artist and
//! per-location aggregates, including a cross-distributor reconciliation.
//! Aggregation never fails: malformed numbers count as zero and missing
//! grouping values land in `"Unknown"`.

pub mod aggregate;
pub mod columns;
pub mod config;
pub mod fetch;
pub mod group;
pub mod location;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod reconcile;
pub mod rollup;
pub mod row;
pub mod table;

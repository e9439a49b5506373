//! CLI entry point for the royalty dashboard aggregator.
//!
//! Loads distributor CSV exports from disk or HTTP and prints categorical
//! rollups, cross-distributor reconciliations, location stats and paged
//! report tables.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use royalty_dash::{
    aggregate::GroupRecord,
    config::DashboardConfig,
    fetch::{BasicClient, HttpClient, load_source},
    location::{LocationMetric, LocationStats, LocationSummary, LocationValueMap, location_rollup},
    output::{print_json, print_pretty, write_records, write_rows},
    reconcile::reconcile_with,
    rollup::{dashboard_series, rollup, top_n},
    row::Row,
    table::{SortDirection, filter_rows, format_cell, page_count, paginate, sort_rows},
};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "royalty_dash")]
#[command(about = "Aggregate music-royalty CSV exports", long_about = None)]
struct Cli {
    /// JSON config file (missing file = defaults)
    #[arg(short, long, global = true, default_value = "royalty_dash.json")]
    config: String,

    /// How to emit results
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// CSV file to write records to when --format csv
    #[arg(short, long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum one column per label with percentage shares
    Pie {
        /// Path or URL of the export (defaults to the Jio source)
        #[arg(short, long)]
        source: Option<String>,

        #[arg(long, default_value = "language")]
        label: String,

        #[arg(long, default_value = "total")]
        value: String,

        /// Keep only the N largest labels
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Language streams and artist income series
    Series {
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Reconcile Jio and Airtel/Wynk exports into per-group distributor shares
    Reconcile {
        #[arg(long)]
        jio: Option<String>,

        #[arg(long)]
        airtel: Option<String>,

        /// Grouping column, skipping candidate resolution
        #[arg(short, long)]
        group_by: Option<String>,

        #[arg(long)]
        jio_key: Option<String>,

        #[arg(long)]
        airtel_key: Option<String>,
    },
    /// Per-location income, royalty and streams
    Locations {
        /// Path or URL of the export (defaults to the location source)
        #[arg(short, long)]
        source: Option<String>,

        /// Total used for the map lookup table: income, royalty or streams
        #[arg(short, long, default_value = "income")]
        metric: LocationMetric,
    },
    /// Search, sort and page through raw report rows
    Table {
        #[arg(short, long)]
        source: Option<String>,

        #[arg(long, value_delimiter = ',', default_value = "artist_name,income,total")]
        columns: Vec<String>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        sort: Option<String>,

        #[arg(long, default_value_t = false)]
        desc: bool,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 13)]
        per_page: usize,
    },
}

#[derive(Debug, Serialize)]
struct LocationsView<'a> {
    metric: LocationMetric,
    summary: LocationSummary,
    locations: &'a [LocationStats],
    map_values: Vec<(&'a str, f64)>,
    map_max: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/royalty_dash.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("royalty_dash.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(&cli.config)?;
    let client = BasicClient::with_timeout(Duration::from_secs(config.fetch_timeout_secs))?;
    let sink = Sink {
        format: cli.format,
        output: cli.output,
    };

    match cli.command {
        Commands::Pie {
            source,
            label,
            value,
            top,
        } => {
            let source = source.unwrap_or_else(|| config.jio_source.clone());
            let rows = load(&client, &source).await?;
            let entries = top_n(rollup(&rows, &label, &value), top.or(config.top_n));

            info!(labels = entries.len(), %label, %value, "Rollup built");
            sink.emit("pie", &entries, &entries)?;
        }
        Commands::Series { source } => {
            let source = source.unwrap_or_else(|| config.jio_source.clone());
            let rows = load(&client, &source).await?;
            let series = dashboard_series(&rows);

            info!(
                languages = series.language_streams.len(),
                artists = series.artist_income.len(),
                "Dashboard series built"
            );
            sink.emit("series", &series, &series.language_streams)?;
        }
        Commands::Reconcile {
            jio,
            airtel,
            group_by,
            jio_key,
            airtel_key,
        } => {
            let jio = jio.unwrap_or_else(|| config.jio_source.clone());
            let airtel = airtel.unwrap_or_else(|| config.airtel_source.clone());
            let (rows_jio, rows_airtel) =
                tokio::try_join!(load(&client, &jio), load(&client, &airtel))?;

            let mut options = config.reconcile_options();
            options.group_by = group_by;
            options.jio_key = jio_key;
            options.airtel_key = airtel_key;

            let reconciliation = reconcile_with(&rows_jio, &rows_airtel, &options);
            info!(
                groups = reconciliation.groups.len(),
                group_key = %reconciliation.meta.group_key,
                "Reconciliation built"
            );
            sink.emit("reconcile", &reconciliation, &reconciliation.share_rows())?;
        }
        Commands::Locations { source, metric } => {
            let source = source.unwrap_or_else(|| config.location_source().to_string());
            let rows = load(&client, &source).await?;
            let stats = location_rollup(&rows);
            let values = LocationValueMap::build(&stats, metric);

            let view = LocationsView {
                metric,
                summary: LocationSummary::from_stats(&stats),
                locations: &stats,
                map_values: values.entries(),
                map_max: values.max_value(),
            };
            info!(
                locations = view.summary.active_locations,
                total_revenue = view.summary.total_revenue,
                "Location stats built"
            );
            let records: Vec<GroupRecord> = stats.iter().map(GroupRecord::from).collect();
            sink.emit("locations", &view, &records)?;
        }
        Commands::Table {
            source,
            columns,
            search,
            sort,
            desc,
            page,
            per_page,
        } => {
            let source = source.unwrap_or_else(|| config.jio_source.clone());
            let rows = load(&client, &source).await?;
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();

            let mut rows = filter_rows(&rows, &columns, search.as_deref().unwrap_or_default());
            if let Some(key) = sort.as_deref() {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                sort_rows(&mut rows, key, direction);
            }

            let visible: Vec<Row> = paginate(&rows, page, per_page)
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| (*c, format_cell(row.get(c).unwrap_or_default())))
                        .collect()
                })
                .collect();

            info!(
                matched = rows.len(),
                page,
                pages = page_count(rows.len(), per_page),
                "Table page built"
            );
            sink.emit_rows("table", &columns, &visible)?;
        }
    }

    Ok(())
}

/// Loads one export, reporting failures as a load error for the caller.
async fn load<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Row>> {
    load_source(client, source).await.inspect_err(|e| {
        error!(source, error = %e, "Could not load data");
    })
}

/// Where and how command results go.
struct Sink {
    format: OutputFormat,
    output: Option<String>,
}

impl Sink {
    fn csv_path(&self, kind: &str) -> String {
        self.output.clone().unwrap_or_else(|| format!("{kind}.csv"))
    }

    /// Emits `value` as pretty/JSON, or `records` as CSV.
    fn emit<T, R>(&self, kind: &str, value: &T, records: &[R]) -> Result<()>
    where
        T: Serialize + Debug,
        R: Serialize,
    {
        match self.format {
            OutputFormat::Pretty => print_pretty(value),
            OutputFormat::Json => print_json(kind, value)?,
            OutputFormat::Csv => {
                let path = self.csv_path(kind);
                write_records(&path, records)?;
                info!(%path, records = records.len(), "CSV written");
            }
        }
        Ok(())
    }

    fn emit_rows(&self, kind: &str, columns: &[&str], rows: &[Row]) -> Result<()> {
        match self.format {
            OutputFormat::Csv => {
                let path = self.csv_path(kind);
                write_rows(&path, columns, rows)?;
                info!(%path, rows = rows.len(), "CSV written");
                Ok(())
            }
            _ => self.emit(kind, &rows, &[] as &[Row]),
        }
    }
}

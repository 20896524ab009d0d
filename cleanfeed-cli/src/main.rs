//! CleanFeed CLI — clean a market-data file against an instrument catalog.
//!
//! Thin wrapper around `cleanfeed-core`: argument parsing, logging setup
//! (console stream plus an append-only log file), and file-path plumbing.
//! All cleaning semantics live in the library.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cleanfeed_core::{
    CleaningConfig, CsvTableSink, CsvTableSource, MarketDataCleaner, TableSink,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "cleanfeed",
    about = "Clean tabular market data against an instrument reference catalog"
)]
struct Cli {
    /// Market data CSV file.
    market: PathBuf,

    /// Instrument reference CSV file.
    reference: PathBuf,

    /// Where to write the cleaned table.
    #[arg(long, default_value = "cleaned_output.csv")]
    output: PathBuf,

    /// TOML file with the cleaning configuration. When given, the
    /// individual flags below are ignored.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Validate against inactive catalog entries too.
    #[arg(long, default_value_t = false)]
    include_inactive: bool,

    /// Log every dropped row and the reason.
    #[arg(long, default_value_t = false)]
    track_drops: bool,

    /// Repair "SYMBOL.EXCHANGE" composites when the exchange field is blank.
    #[arg(long, default_value_t = false)]
    fix_dot_symbols: bool,

    /// Also write the cleaning summary as JSON.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Append-only log file.
    #[arg(long, default_value = "cleanfeed.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_file)?;

    let config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => CleaningConfig {
            validate_active_only: !cli.include_inactive,
            track_dropped_rows: cli.track_drops,
            fix_dot_in_symbol: cli.fix_dot_symbols,
        },
    };

    info!("starting market data cleaning pipeline");

    let mut cleaner = MarketDataCleaner::new(config);
    cleaner.load_data(&CsvTableSource, &cli.market, &cli.reference)?;
    cleaner.clean()?;
    let summary = cleaner.summary()?;

    if let Some(path) = &cli.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
    }

    let cleaned = cleaner.clean_data()?;
    CsvTableSink.write_table(&cleaned, &cli.output)?;
    info!(path = %cli.output.display(), rows = cleaned.len(), "cleaned data saved");

    Ok(())
}

/// Console stream at the configured filter level plus an append-only log
/// file. The returned guard flushes the file writer on drop.
fn init_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

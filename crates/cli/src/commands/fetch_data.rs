//! Fetch-data CLI command.
//!
//! Downloads candles for one symbol from the chart API and writes them in the
//! CSV layout read by `snapshot --csv-dir`.

use anyhow::{bail, Context, Result};
use clap::Args;
use flowvalue_core::{CandleSource, Timeframe};
use flowvalue_data::{ChartClient, CsvStorage};
use std::path::PathBuf;

/// Arguments for the fetch-data command.
#[derive(Args, Debug, Clone)]
pub struct FetchDataArgs {
    /// Symbol to fetch (e.g., "^GSPC", "1306.T", "USDJPY=X")
    #[arg(long)]
    pub symbol: String,

    /// Timeframe: D, W or M
    #[arg(long, default_value = "D")]
    pub timeframe: String,

    /// Output CSV file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Config file path for the chart API settings
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Runs the fetch-data command.
///
/// # Errors
/// Returns an error if the timeframe is invalid, the fetch fails, nothing is
/// returned, or the file cannot be written.
pub async fn run_fetch_data(args: FetchDataArgs) -> Result<()> {
    let timeframe: Timeframe = args.timeframe.parse()?;
    let config = super::load_config(args.config.as_deref())?;

    tracing::info!("Fetching {} candles for {}", timeframe, args.symbol);

    let client = ChartClient::from_config(&config.source);
    let candles = client
        .fetch_candles(&args.symbol, timeframe)
        .await
        .with_context(|| format!("Failed to fetch {} ({timeframe})", args.symbol))?;

    if candles.is_empty() {
        tracing::warn!("No candle data returned. Symbol may not exist.");
        bail!("No data fetched for {} {timeframe}", args.symbol);
    }

    tracing::info!(
        "Fetched {} candles, writing to {}",
        candles.len(),
        args.output.display()
    );

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    CsvStorage::write_candles(&args.output, &candles)?;

    println!(
        "Wrote {} candles for {} to {} (use file name {} for --csv-dir)",
        candles.len(),
        args.symbol,
        args.output.display(),
        CsvStorage::file_name(&args.symbol, timeframe)
    );
    Ok(())
}

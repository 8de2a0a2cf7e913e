//! Snapshot CLI command.
//!
//! Fetches candles for the configured universe, optionally adds synthetic
//! sector indices, and prints the Flow/Value snapshot as a table or JSON.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use flowvalue_core::CandleSource;
use flowvalue_data::{build_overrides, CachedCandleSource, ChartClient, CsvCandleSource, SectorHistory};
use flowvalue_signals::{SnapshotEngine, SnapshotItem, SnapshotMeta, SnapshotTrails};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Output format for snapshot results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Arguments for the snapshot command.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Config file path (defaults to config/Config.toml + env + config/Config.json)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Number of monthly trail samples before the present
    #[arg(long)]
    pub trails: Option<usize>,

    /// Sector history JSON to add as synthetic sector indices
    #[arg(long)]
    pub sectors: Option<PathBuf>,

    /// Read candles from CSV files in this directory instead of the chart API
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
}

/// Runs the snapshot command.
///
/// # Errors
/// Returns an error if configuration or the sector file cannot be loaded, or
/// if the parameters are invalid.
pub async fn run_snapshot(args: SnapshotArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;

    let source: Arc<dyn CandleSource> = match &args.csv_dir {
        Some(dir) => {
            tracing::info!("Reading candles from {}", dir.display());
            Arc::new(CsvCandleSource::new(dir.clone()))
        }
        None => Arc::new(CachedCandleSource::from_config(
            ChartClient::from_config(&config.source),
            &config.source,
        )),
    };
    let engine = SnapshotEngine::from_config(source, &config);

    let mut universe = config.universe.clone();
    let mut overrides = HashMap::new();
    if let Some(path) = &args.sectors {
        let history = SectorHistory::load(path)
            .with_context(|| format!("Failed to load sectors from {}", path.display()))?;
        let built = build_overrides(&history);
        universe.extend(built.assets);
        overrides = built.overrides;
    }

    if args.trails.is_none() && args.sectors.is_none() {
        let snapshot = engine.compute_snapshot(&universe).await?;
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            OutputFormat::Table => print!("{}", format_items(&snapshot.items, None)),
        }
        return Ok(());
    }

    let months_back = args.trails.unwrap_or(config.trails.months_back);
    let result = engine
        .compute_snapshot_with_trails(&universe, months_back, &overrides)
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => {
            print!("{}", format_items(&result.items, Some(&result.meta)));
            if args.trails.is_some() {
                print!("{}", format_trails(&result.items, &result.trails));
            }
        }
    }

    Ok(())
}

fn fmt_score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}"))
}

fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn fmt_int<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders items as a fixed-width table, sorted by composite rank.
#[must_use]
pub fn format_items(items: &[SnapshotItem], meta: Option<&SnapshotMeta>) -> String {
    let mut sorted: Vec<&SnapshotItem> = items.iter().collect();
    sorted.sort_by_key(|i| i.a_rank.unwrap_or(usize::MAX));

    let mut lines = vec![
        "=".repeat(112),
        "FLOW / VALUE SNAPSHOT".to_string(),
        "=".repeat(112),
        format!(
            "{:<5} {:<10} {:<28} {:<7} {:>12} {:>7} {:>7} {:>7} {:>5} {:>5} {:<4} {:>9}",
            "RANK", "ID", "NAME", "CLS", "PRICE(USD)", "F", "V", "A", "F%", "V%", "QUAD", "DLEN/WLEN"
        ),
        "-".repeat(112),
    ];

    for item in sorted {
        let counts = meta
            .and_then(|m| m.get(&item.id))
            .map_or_else(|| "-".to_string(), |c| format!("{}/{}", c.daily, c.weekly));
        let name: String = item.name.chars().take(28).collect();
        lines.push(format!(
            "{:<5} {:<10} {:<28} {:<7} {:>12} {:>7} {:>7} {:>7} {:>5} {:>5} {:<4} {:>9}",
            fmt_int(item.a_rank),
            item.id,
            name,
            item.cls,
            fmt_price(item.last_price),
            fmt_score(item.flow),
            fmt_score(item.value),
            fmt_score(item.composite),
            fmt_int(item.f_pctl),
            fmt_int(item.v_pctl),
            item.quadrant,
            counts,
        ));
    }
    lines.push("=".repeat(112));

    super::join_lines(&lines)
}

/// Renders each asset's trail as `date F/V` pairs, oldest first.
#[must_use]
pub fn format_trails(items: &[SnapshotItem], trails: &SnapshotTrails) -> String {
    let mut lines = vec!["TRAILS (F / V):".to_string(), "-".repeat(60)];

    for item in items {
        let Some(points) = trails.get(&item.id) else {
            continue;
        };
        let path: Vec<String> = points
            .iter()
            .map(|p| {
                let date = chrono::DateTime::from_timestamp(p.t, 0)
                    .map_or_else(|| p.t.to_string(), |d| d.format("%Y-%m-%d").to_string());
                format!("{date} {}/{}", fmt_score(p.flow), fmt_score(p.value))
            })
            .collect();
        lines.push(format!("  {:<10}: {}", item.id, path.join("  ")));
    }

    super::join_lines(&lines)
}

use clap::{Parser, Subcommand};

mod commands;

use commands::{FetchDataArgs, SnapshotArgs, UniverseArgs};

#[derive(Parser)]
#[command(name = "flowvalue")]
#[command(about = "Cross-sectional Flow/Value market regime snapshots", long_about = None)]
struct Cli {
    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a Flow/Value snapshot for the configured universe
    Snapshot(SnapshotArgs),
    /// Fetch candles for one symbol and write them to CSV
    FetchData(FetchDataArgs),
    /// List the configured universe
    Universe(UniverseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output, logs go to stderr or the log file
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    match cli.command {
        Commands::Snapshot(args) => {
            commands::run_snapshot(args).await?;
        }
        Commands::FetchData(args) => {
            commands::run_fetch_data(args).await?;
        }
        Commands::Universe(args) => {
            commands::run_universe(&args)?;
        }
    }

    Ok(())
}

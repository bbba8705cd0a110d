//! BandBreak CLI — run replays and inspect data feeds.
//!
//! Commands:
//! - `run` — replay a strategy from a TOML config over a CSV feed
//! - `inspect` — validate a CSV feed and print its shape

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bandbreak_replay::{load_band_bars, run_replay, save_report, ReplayConfig};

#[derive(Parser)]
#[command(
    name = "bandbreak",
    about = "BandBreak CLI — band break-in strategy replay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a strategy over a CSV feed of bars with band values.
    Run {
        /// Path to a TOML config file (strategy, instrument, session).
        #[arg(long)]
        config: PathBuf,

        /// Path to the CSV feed (timestamp,open,high,low,close,band_top,band_bottom).
        #[arg(long)]
        data: PathBuf,

        /// Write the full report as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a CSV feed and print its shape.
    Inspect {
        /// Path to the CSV feed.
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            data,
            output,
        } => cmd_run(&config, &data, output.as_deref()),
        Commands::Inspect { data } => cmd_inspect(&data),
    }
}

fn cmd_run(
    config_path: &std::path::Path,
    data_path: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let config_text = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading config {}", config_path.display()))?;
    let config: ReplayConfig =
        toml::from_str(&config_text).with_context(|| "parsing replay config")?;

    let bars = load_band_bars(data_path)
        .with_context(|| format!("loading feed {}", data_path.display()))?;

    let report = run_replay(&config, bars)?;
    println!("{}", report.summary());

    if let Some(path) = output {
        save_report(&report, path)
            .with_context(|| format!("writing report {}", path.display()))?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

fn cmd_inspect(data_path: &std::path::Path) -> Result<()> {
    let bars = load_band_bars(data_path)
        .with_context(|| format!("loading feed {}", data_path.display()))?;
    let first = bars.first().expect("validated feed is non-empty");
    let last = bars.last().expect("validated feed is non-empty");
    println!(
        "{}: {} bars, {} .. {}",
        data_path.display(),
        bars.len(),
        first.timestamp,
        last.timestamp
    );
    Ok(())
}

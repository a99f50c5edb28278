mod config;
mod verify;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::PsoConfig;
use premier_indicators::{Indicator, PremierStochasticOscillator};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "pso")]
#[command(about = "Premier Stochastic Oscillator: compute over CSV bars and check against reference data")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional TOML config file
    #[arg(short, long, env = "PSO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the oscillator for every bar in a CSV file
    Compute {
        /// Path to CSV data file
        #[arg(short, long)]
        data: PathBuf,

        /// Stochastic lookback period (overrides config)
        #[arg(short, long)]
        period: Option<usize>,

        /// Emit one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Compare computed values against a reference column in the same CSV
    Verify {
        /// Path to CSV file with bar columns and a reference column
        #[arg(short, long)]
        data: PathBuf,

        /// Reference column name (overrides config)
        #[arg(long)]
        column: Option<String>,

        /// Stochastic lookback period (overrides config)
        #[arg(short, long)]
        period: Option<usize>,

        /// Maximum accepted absolute difference (overrides config)
        #[arg(short, long)]
        tolerance: Option<f64>,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Serialize)]
struct ComputedRow {
    timestamp: String,
    close: Decimal,
    value: Decimal,
    ready: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PsoConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Compute { data, period, json } => {
            if let Some(period) = period {
                config.oscillator.period = period;
            }
            config.validate()?;
            run_compute(&data, &config, json)?;
        }
        Commands::Verify {
            data,
            column,
            period,
            tolerance,
        } => {
            if let Some(period) = period {
                config.oscillator.period = period;
            }
            if let Some(column) = column {
                config.verify.column = column;
            }
            if let Some(tolerance) = tolerance {
                config.verify.tolerance = tolerance;
            }
            config.validate()?;
            run_verify(&data, &config)?;
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn run_compute(data_path: &Path, config: &PsoConfig, json: bool) -> Result<()> {
    let period = config.oscillator.period;
    tracing::info!(data = %data_path.display(), period, "Computing oscillator");

    let bars = premier_data::load_bars_from_csv(data_path)
        .with_context(|| format!("Failed to load bars from {}", data_path.display()))?;
    if bars.is_empty() {
        anyhow::bail!("No bars loaded from CSV file");
    }

    let mut pso = PremierStochasticOscillator::new(period);
    let mut ready_rows = 0usize;

    for bar in &bars {
        pso.next(bar);
        let row = ComputedRow {
            timestamp: bar.timestamp.to_rfc3339(),
            close: bar.close,
            value: pso.current().value,
            ready: pso.is_ready(),
        };
        if row.ready {
            ready_rows += 1;
        }

        if json {
            println!("{}", serde_json::to_string(&row)?);
        } else if row.ready {
            println!("{}  close={}  {}={:.6}", row.timestamp, row.close, pso.name(), row.value);
        } else {
            println!("{}  close={}  {}=warming up", row.timestamp, row.close, pso.name());
        }
    }

    tracing::info!(bars = bars.len(), ready = ready_rows, "Done");
    Ok(())
}

fn run_verify(data_path: &Path, config: &PsoConfig) -> Result<()> {
    let column = &config.verify.column;
    let tolerance = config.verify.tolerance;
    tracing::info!(
        data = %data_path.display(),
        period = config.oscillator.period,
        column = %column,
        tolerance,
        "Verifying against reference"
    );

    let rows = premier_data::load_reference_series(data_path, column)
        .with_context(|| format!("Failed to load reference data from {}", data_path.display()))?;
    let report = verify::verify_series(&rows, config.oscillator.period, tolerance);

    let sep = "=".repeat(60);
    println!("{sep}");
    println!("  REFERENCE CHECK");
    println!("{sep}");
    println!("  Rows:            {}", report.rows);
    println!("  Compared:        {}", report.compared);
    println!("  Max deviation:   {:.8}", report.max_deviation);
    println!("  Tolerance:       {}", tolerance);
    println!("  Mismatches:      {}", report.mismatches.len());
    for m in report.mismatches.iter().take(10) {
        println!("    {}  expected={}  actual={}", m.timestamp.to_rfc3339(), m.expected, m.actual);
    }
    println!("{sep}");

    if report.compared == 0 {
        anyhow::bail!("No rows had both a ready value and a reference value in column '{column}'");
    }
    if !report.passed() {
        anyhow::bail!(
            "{} of {} rows differ from '{}' by more than {}",
            report.mismatches.len(),
            report.compared,
            column,
            tolerance
        );
    }
    Ok(())
}

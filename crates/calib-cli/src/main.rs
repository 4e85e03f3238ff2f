mod config;
mod report;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::report::{covariance_report, inverse_code};

#[derive(Parser)]
#[command(
    name = "calib",
    version,
    about = "Offline IMU calibration helpers that print C source"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print accelerometer and gyroscope noise covariance as C arrays
    Covariance {
        /// Recorded samples (CSV: label,values...)
        input: Option<PathBuf>,

        /// Leading rows per sensor to discard
        #[arg(short, long)]
        warmup: Option<usize>,

        /// Also print readable matrices to stderr
        #[arg(short, long)]
        summary: bool,
    },

    /// Print closed-form inverse of a general square matrix as C statements
    Inverse {
        /// Matrix dimension
        #[arg(short, long)]
        dimension: Option<usize>,

        /// Check the formulas against a numeric inverse before printing
        #[arg(long)]
        check: bool,
    },

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Commands::Covariance {
            input,
            warmup,
            summary,
        } => cmd_covariance(&cfg, input, warmup, summary),
        Commands::Inverse { dimension, check } => cmd_inverse(&cfg, dimension, check),
        Commands::Config => cmd_config(&cfg),
    }
}

fn cmd_covariance(
    cfg: &Config,
    input: Option<PathBuf>,
    warmup: Option<usize>,
    summary: bool,
) -> Result<()> {
    let path = input.unwrap_or_else(|| cfg.covariance.input.clone());
    let warmup = warmup.unwrap_or(cfg.covariance.warmup);

    let report = covariance_report(&path, warmup, &cfg.covariance)?;
    if summary {
        eprint!("{}", report.summary());
    }
    emit(&report.to_c(&cfg.covariance))
}

fn cmd_inverse(cfg: &Config, dimension: Option<usize>, check: bool) -> Result<()> {
    let dim = dimension.unwrap_or(cfg.inverse.dimension);
    let code = inverse_code(dim, &cfg.inverse.names(), check)?;
    emit(&code)
}

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[covariance]");
    println!("  input = {}", cfg.covariance.input.display());
    println!("  warmup = {}", cfg.covariance.warmup);
    println!("  accel_label = {}", cfg.covariance.accel_label);
    println!("  gyro_label = {}", cfg.covariance.gyro_label);
    println!("  accel_name = {}", cfg.covariance.accel_name);
    println!("  gyro_name = {}", cfg.covariance.gyro_name);
    println!();
    println!("[inverse]");
    println!("  dimension = {}", cfg.inverse.dimension);
    println!("  input_name = {}", cfg.inverse.input_name);
    println!("  output_name = {}", cfg.inverse.output_name);
    println!("  det_name = {}", cfg.inverse.det_name);
    Ok(())
}

/// Write generated code to stdout in one piece.
fn emit(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("writing to stdout")
}

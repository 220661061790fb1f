//! cup-cli: Command-line interface for cup volume detection and tipover
//! simulation.
//!
//! This tool provides access to cup-scan and cup-tipover functionality from
//! the command line, suitable for scripting and batch analysis of scans.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=cup_scan=info` - Load and detection summaries
//! - `RUST_LOG=cup_scan=debug` - Fit failures and intermediate values
//! - `RUST_LOG=cup_scan::timing=info` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Detect the interior of a scan in centimeters
//! cup detect mug.ply --seed 42 --unit-scale 0.01
//!
//! # How far can a 70% full mug tilt?
//! RUST_LOG=cup_scan=info cup sweep mug.ply --fill 0.7 --unit-scale 0.01
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod config;
mod output;

use commands::{detect, info, simulate, sweep};

/// cup - Detect a cup's interior from a point cloud and simulate tipping it.
///
/// Fits a cylinder to the cup interior, then computes center of mass,
/// critical tipover angle, and spill for a given fill level and tilt.
#[derive(Parser)]
#[command(name = "cup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML file with detection and physics parameters
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Detection overrides shared by every command that fits a cylinder.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectArgs {
    /// Seed for RANSAC sampling (reproducible results)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of RANSAC iterations
    #[arg(long)]
    pub iterations: Option<usize>,

    /// RANSAC inlier distance, in scan units
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Use the thin-walled preset (paper and plastic cups)
    #[arg(long)]
    pub thin_walled: bool,
}

/// Cylinder adjustments and masses shared by `simulate` and `sweep`.
#[derive(Args, Debug, Clone)]
pub struct PhysicsArgs {
    /// Fill level from 0 (empty) to 1 (full)
    #[arg(long, default_value = "0.5")]
    pub fill: f64,

    /// Empty cup mass in kg
    #[arg(long, conflicts_with = "estimate_mass")]
    pub cup_mass: Option<f64>,

    /// Estimate the cup mass from a 5 mm ceramic wall
    #[arg(long)]
    pub estimate_mass: bool,

    /// Liquid density in kg/m³
    #[arg(long)]
    pub density: Option<f64>,

    /// Move the detected cylinder by x,y,z scan units
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    pub offset: Option<[f64; 3]>,

    /// Multiply the detected radius and height
    #[arg(long)]
    pub scale: Option<f64>,

    /// Length of one scan unit in meters (0.01 for centimeters)
    #[arg(long, default_value = "1.0")]
    pub unit_scale: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Display point cloud statistics
    Info {
        /// Input point cloud (PLY or XYZ)
        input: PathBuf,
    },

    /// Detect the cup interior cylinder
    Detect {
        /// Input point cloud (PLY or XYZ)
        input: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Length of one scan unit in meters; also reports volume in mL
        #[arg(long)]
        unit_scale: Option<f64>,
    },

    /// Compute the physics state for one fill level and tilt
    Simulate {
        /// Input point cloud (PLY or XYZ)
        input: PathBuf,

        /// Tilt angle in degrees
        #[arg(long, default_value = "0.0")]
        tilt: f64,

        #[command(flatten)]
        detect: DetectArgs,

        #[command(flatten)]
        physics: PhysicsArgs,
    },

    /// Sweep the tilt from upright to horizontal
    Sweep {
        /// Input point cloud (PLY or XYZ)
        input: PathBuf,

        /// Number of tilt steps between 0° and 90°
        #[arg(long, default_value = "18")]
        steps: usize,

        #[command(flatten)]
        detect: DetectArgs,

        #[command(flatten)]
        physics: PhysicsArgs,
    },
}

/// Parse `x,y,z` into an offset vector.
fn parse_offset(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got {:?}", s));
    };
    let parse = |v: &str| {
        v.parse::<f64>()
            .map_err(|e| format!("invalid offset component {:?}: {}", v, e))
    };
    Ok([parse(x)?, parse(y)?, parse(z)?])
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // Check RUST_LOG first, then fall back to -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "cup_scan=info,cup_tipover=info",
            2 => "cup_scan=debug,cup_tipover=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

/// The scan error behind `e`, whether raised directly or wrapped by the
/// tipover crate.
pub(crate) fn scan_error(e: &anyhow::Error) -> Option<&cup_scan::ScanError> {
    match e.downcast_ref::<cup_tipover::TipoverError>() {
        Some(cup_tipover::TipoverError::Scan(scan_err)) => Some(scan_err),
        Some(_) => None,
        None => e.downcast_ref::<cup_scan::ScanError>(),
    }
}

fn report_error(e: &anyhow::Error) {
    if let Some(scan_err) = scan_error(e) {
        eprintln!("{}: {}", "Error".red().bold(), scan_err);
        eprintln!("  {}: {}", "Code".cyan(), scan_err.code());
        eprintln!(
            "  {}: {}",
            "Suggestion".green(),
            scan_err.recovery_suggestion()
        );
        if let Some(path) = scan_err.path() {
            eprintln!("  {}: {}", "File".yellow(), path.display());
        }
    } else if let Some(tip_err) = e.downcast_ref::<cup_tipover::TipoverError>() {
        eprintln!("{}: {}", "Error".red().bold(), tip_err);
        eprintln!("  {}: {}", "Code".cyan(), tip_err.code());
        eprintln!(
            "  {}: {}",
            "Suggestion".green(),
            tip_err.recovery_suggestion()
        );
    } else {
        eprintln!("{}: {}", "Error".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {}: {}", "Caused by".yellow(), cause);
        }
    }
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = config::AnalysisConfig::load(cli.config.as_deref()).and_then(|config| {
        match &cli.command {
            Commands::Info { input } => info::run(input, &cli),
            Commands::Detect {
                input,
                detect,
                unit_scale,
            } => detect::run(input, detect, *unit_scale, &config, &cli),
            Commands::Simulate {
                input,
                tilt,
                detect,
                physics,
            } => simulate::run(input, *tilt, detect, physics, &config, &cli),
            Commands::Sweep {
                input,
                steps,
                detect,
                physics,
            } => sweep::run(input, *steps, detect, physics, &config, &cli),
        }
    });

    if let Err(e) = &result {
        if !cli.quiet {
            report_error(e);
        }
        std::process::exit(1);
    }

    Ok(())
}

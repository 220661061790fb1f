//! cup sweep command - tilt the cup from upright to horizontal.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use cup_tipover::{SweepSummary, volume_to_ml};
use serde::Serialize;

use super::detect::load_and_detect;
use super::simulate::{CylinderMeters, adjusted_cylinder, configured_builder, cup_mass};
use crate::config::AnalysisConfig;
use crate::{Cli, DetectArgs, OutputFormat, PhysicsArgs, output};

#[derive(Serialize)]
struct SweepRow {
    tilt_degrees: f64,
    center_of_mass: [f64; 3],
    is_stable: bool,
    stability_margin: f64,
    poured_ml: f64,
}

#[derive(Serialize)]
struct SweepResult {
    input: String,
    cylinder: CylinderMeters,
    cup_mass: f64,
    fill_level: f64,
    liquid_ml: f64,
    critical_tipover_degrees: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_unstable_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_spill_degrees: Option<f64>,
    max_poured_ml: f64,
    states: Vec<SweepRow>,
}

pub fn run(
    input: &Path,
    steps: usize,
    detect_args: &DetectArgs,
    args: &PhysicsArgs,
    config: &AnalysisConfig,
    cli: &Cli,
) -> Result<()> {
    let detection = config.detection_params(detect_args);
    let physics = config.physics_params(args);

    let cup = load_and_detect(input, &detection)?;
    let cylinder = adjusted_cylinder(&cup, args);

    output::info(
        &format!("Sweeping tilt 0° → 90° in {} steps...", steps),
        cli.format,
        cli.quiet,
    );
    let states = configured_builder(&cylinder, &physics, args).sweep(steps)?;
    let summary = SweepSummary::from_states(&states)
        .ok_or_else(|| anyhow::anyhow!("Sweep produced no states"))?;

    let report = SweepResult {
        input: input.display().to_string(),
        cylinder: CylinderMeters::from(&cylinder),
        cup_mass: cup_mass(&cylinder, &physics, args),
        fill_level: states[0].fill_level,
        liquid_ml: volume_to_ml(states[0].liquid_volume, 1.0),
        critical_tipover_degrees: summary.critical_tipover_angle.to_degrees(),
        first_unstable_degrees: summary.first_unstable_tilt.map(f64::to_degrees),
        first_spill_degrees: summary.first_spill_tilt.map(f64::to_degrees),
        max_poured_ml: volume_to_ml(summary.max_volume_poured, 1.0),
        states: states
            .iter()
            .map(|s| SweepRow {
                tilt_degrees: s.tilt_degrees(),
                center_of_mass: [s.center_of_mass.x, s.center_of_mass.y, s.center_of_mass.z],
                is_stable: s.is_stable,
                stability_margin: s.stability_margin,
                poured_ml: volume_to_ml(s.volume_poured, 1.0),
            })
            .collect(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Tilt Sweep".bold().underline());
                println!(
                    "  {}: {:.0}% ({:.1} mL), cup {:.3} kg",
                    "Fill".cyan(),
                    report.fill_level * 100.0,
                    report.liquid_ml,
                    report.cup_mass
                );
                println!();
                println!(
                    "  {:>8}  {:>10}  {:>10}  {}",
                    "tilt °".bold(),
                    "margin °".bold(),
                    "poured mL".bold(),
                    "stable".bold()
                );
                for row in &report.states {
                    let stable = if row.is_stable {
                        "yes".green()
                    } else {
                        "no".red()
                    };
                    println!(
                        "  {:>8.1}  {:>10.1}  {:>10.1}  {}",
                        row.tilt_degrees, row.stability_margin, row.poured_ml, stable
                    );
                }
                println!();

                println!(
                    "  {}: {:.1}°",
                    "Critical angle".cyan(),
                    report.critical_tipover_degrees
                );
                match report.first_unstable_degrees {
                    Some(deg) => println!("  {}: {:.1}°", "Tips over at".cyan(), deg),
                    None => println!("  {}: never", "Tips over at".cyan()),
                }
                match report.first_spill_degrees {
                    Some(deg) => println!(
                        "  {}: {:.1}° (up to {:.1} mL)",
                        "Spills from".cyan(),
                        deg,
                        report.max_poured_ml
                    ),
                    None => println!("  {}: never", "Spills from".cyan()),
                }
            }
        }
    }

    Ok(())
}

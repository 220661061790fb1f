//! cup simulate command - physics state for one fill level and tilt.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use cup_tipover::{
    CylinderParams, DEFAULT_CUP_DENSITY, DEFAULT_WALL_THICKNESS, PhysicsParams, ScannedCup,
    SimulationBuilder, estimate_cup_mass, liquid_surface_when_tilted, volume_to_ml,
};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::debug;

use super::detect::load_and_detect;
use crate::config::AnalysisConfig;
use crate::{Cli, DetectArgs, OutputFormat, PhysicsArgs, output};

#[derive(Serialize)]
pub(crate) struct CylinderMeters {
    pub center: [f64; 3],
    pub radius: f64,
    pub height: f64,
}

impl From<&CylinderParams> for CylinderMeters {
    fn from(c: &CylinderParams) -> Self {
        Self {
            center: [c.center.x, c.center.y, c.center.z],
            radius: c.radius,
            height: c.height,
        }
    }
}

#[derive(Serialize)]
struct SurfaceInfo {
    high_side: f64,
    low_side: f64,
    spilling: bool,
}

#[derive(Serialize)]
struct SimulateResult {
    input: String,
    cylinder: CylinderMeters,
    cup_mass: f64,
    liquid_density: f64,
    fill_level: f64,
    tilt_degrees: f64,
    center_of_mass: [f64; 3],
    critical_tipover_degrees: f64,
    liquid_volume: f64,
    liquid_ml: f64,
    volume_poured: f64,
    poured_ml: f64,
    is_stable: bool,
    stability_margin: f64,
    surface: SurfaceInfo,
}

/// The detected cylinder with manual adjustments applied, in meters.
///
/// The offset and scale are applied in scan units before conversion.
pub(crate) fn adjusted_cylinder(cup: &ScannedCup, args: &PhysicsArgs) -> CylinderParams {
    let mut cylinder = cup.cylinder;
    if let Some([x, y, z]) = args.offset {
        cylinder = cylinder.translated(&Vector3::new(x, y, z));
    }
    if let Some(scale) = args.scale {
        cylinder = cylinder.scaled(scale);
    }
    let cylinder = cylinder.converted(args.unit_scale);
    debug!(
        radius = cylinder.radius,
        height = cylinder.height,
        "Cylinder in meters"
    );
    cylinder
}

/// Cup mass from the flags: estimated from the walls, or the merged param.
pub(crate) fn cup_mass(
    cylinder: &CylinderParams,
    physics: &PhysicsParams,
    args: &PhysicsArgs,
) -> f64 {
    if args.estimate_mass {
        estimate_cup_mass(
            cylinder.radius,
            cylinder.height,
            DEFAULT_WALL_THICKNESS,
            DEFAULT_CUP_DENSITY,
        )
    } else {
        physics.cup_mass
    }
}

/// Builder configured from the merged physics params and flags.
pub(crate) fn configured_builder<'a>(
    cylinder: &'a CylinderParams,
    physics: &PhysicsParams,
    args: &PhysicsArgs,
) -> SimulationBuilder<'a> {
    SimulationBuilder::new(cylinder)
        .params(physics)
        .cup_mass(cup_mass(cylinder, physics, args))
        .fill_level(args.fill)
}

pub fn run(
    input: &Path,
    tilt_degrees: f64,
    detect_args: &DetectArgs,
    args: &PhysicsArgs,
    config: &AnalysisConfig,
    cli: &Cli,
) -> Result<()> {
    let detection = config.detection_params(detect_args);
    let physics = config.physics_params(args);

    let cup = load_and_detect(input, &detection)?;
    let cylinder = adjusted_cylinder(&cup, args);

    let state = configured_builder(&cylinder, &physics, args)
        .tilt_degrees(tilt_degrees)
        .build()?;
    let surface = liquid_surface_when_tilted(state.tilt_angle, &cylinder, state.fill_level);

    let com = state.center_of_mass;
    let report = SimulateResult {
        input: input.display().to_string(),
        cylinder: CylinderMeters::from(&cylinder),
        cup_mass: cup_mass(&cylinder, &physics, args),
        liquid_density: physics.liquid_density,
        fill_level: state.fill_level,
        tilt_degrees: state.tilt_degrees(),
        center_of_mass: [com.x, com.y, com.z],
        critical_tipover_degrees: state.critical_tipover_degrees(),
        liquid_volume: state.liquid_volume,
        liquid_ml: volume_to_ml(state.liquid_volume, 1.0),
        volume_poured: state.volume_poured,
        poured_ml: volume_to_ml(state.volume_poured, 1.0),
        is_stable: state.is_stable,
        stability_margin: state.stability_margin,
        surface: SurfaceInfo {
            high_side: surface.high_side,
            low_side: surface.low_side,
            spilling: surface.spilling,
        },
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Tipover Simulation".bold().underline());
                println!(
                    "  {}: r {:.4} m, h {:.4} m",
                    "Cylinder".cyan(),
                    report.cylinder.radius,
                    report.cylinder.height
                );
                println!(
                    "  {}: {:.0}% at {:.1}°",
                    "Fill / tilt".cyan(),
                    report.fill_level * 100.0,
                    report.tilt_degrees
                );
                println!("  {}: {:.3} kg", "Cup mass".cyan(), report.cup_mass);
                println!("  {}: {:.1} mL", "Liquid".cyan(), report.liquid_ml);
                println!(
                    "  {}: ({:.4}, {:.4}, {:.4})",
                    "Center of mass".cyan(),
                    com.x,
                    com.y,
                    com.z
                );
                println!(
                    "  {}: {:.1}°",
                    "Critical angle".cyan(),
                    report.critical_tipover_degrees
                );
                println!(
                    "  {}: {:.4} / {:.4} m above base",
                    "Surface high / low".cyan(),
                    report.surface.high_side,
                    report.surface.low_side
                );

                if report.is_stable {
                    output::success(
                        &format!("Stable, {:.1}° of margin", report.stability_margin),
                        cli.format,
                        cli.quiet,
                    );
                } else {
                    println!(
                        "{} Tips over ({:.1}° past critical)",
                        "✗".red().bold(),
                        -report.stability_margin
                    );
                }
                if report.poured_ml > 0.0 {
                    output::warning(
                        &format!("Pours about {:.1} mL", report.poured_ml),
                        cli.format,
                        cli.quiet,
                    );
                }
            }
        }
    }

    Ok(())
}

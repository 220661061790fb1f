//! cup detect command - find the cup interior cylinder.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use cup_scan::{DetectionParams, VolumeDetectionResult};
use cup_tipover::{ScannedCup, volume_to_ml};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::{Cli, DetectArgs, OutputFormat, output};

#[derive(Serialize)]
pub(crate) struct CylinderInfo {
    pub center: [f64; 3],
    pub radius: f64,
    pub height: f64,
    pub axis: [f64; 3],
    pub confidence: f64,
}

#[derive(Serialize)]
struct DetectResult {
    input: String,
    points: usize,
    orientation: String,
    cylinder: CylinderInfo,
    rim_height: f64,
    base_height: f64,
    interior_volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    interior_ml: Option<f64>,
}

impl From<&VolumeDetectionResult> for CylinderInfo {
    fn from(result: &VolumeDetectionResult) -> Self {
        let c = &result.cylinder;
        Self {
            center: [c.center.x, c.center.y, c.center.z],
            radius: c.radius,
            height: c.height,
            axis: [c.axis.x, c.axis.y, c.axis.z],
            confidence: c.confidence,
        }
    }
}

/// Load `input` and run detection. Absence of a cup surfaces as a wrapped
/// `ScanError::DetectionUnavailable`.
pub(crate) fn load_and_detect(input: &Path, params: &DetectionParams) -> Result<ScannedCup> {
    ScannedCup::load(input, params)
        .with_context(|| format!("Failed to detect a cup in {:?}", input))
}

pub fn run(
    input: &Path,
    args: &DetectArgs,
    unit_scale: Option<f64>,
    config: &AnalysisConfig,
    cli: &Cli,
) -> Result<()> {
    let params = config.detection_params(args);

    output::info(
        &format!("Detecting cup interior in {}...", input.display()),
        cli.format,
        cli.quiet,
    );
    let cup = load_and_detect(input, &params)?;
    let (points, result) = (cup.point_count, cup.detection);

    let report = DetectResult {
        input: input.display().to_string(),
        points,
        orientation: result.orientation.as_str().to_string(),
        cylinder: CylinderInfo::from(&result),
        rim_height: result.rim_height,
        base_height: result.base_height,
        interior_volume: result.interior_volume,
        interior_ml: unit_scale.map(|s| volume_to_ml(result.interior_volume, s)),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Found {} cup from {} points", report.orientation, points),
                    cli.format,
                    cli.quiet,
                );
                let c = &report.cylinder;
                println!(
                    "  {}: ({:.3}, {:.3}, {:.3})",
                    "Base center".cyan(),
                    c.center[0],
                    c.center[1],
                    c.center[2]
                );
                println!("  {}: {:.3}", "Radius".cyan(), c.radius);
                println!("  {}: {:.3}", "Height".cyan(), c.height);
                println!(
                    "  {}: {:.3} → {:.3}",
                    "Base → rim".cyan(),
                    report.base_height,
                    report.rim_height
                );
                println!("  {}: {:.2}", "Confidence".cyan(), c.confidence);
                match report.interior_ml {
                    Some(ml) => println!(
                        "  {}: {:.3} ({:.1} mL)",
                        "Interior volume".cyan(),
                        report.interior_volume,
                        ml
                    ),
                    None => println!(
                        "  {}: {:.3}",
                        "Interior volume".cyan(),
                        report.interior_volume
                    ),
                }
                if c.confidence < 0.5 {
                    output::warning(
                        "Low confidence fit; the scan may not show a clear cylinder",
                        cli.format,
                        cli.quiet,
                    );
                }
            }
        }
    }

    Ok(())
}

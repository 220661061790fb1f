//! cup info command - display point cloud statistics.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use cup_scan::tracing_ext::log_cloud_stats;
use cup_scan::{LoadedCloud, PointCloud};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct CloudInfo {
    path: String,
    format: String,
    points: usize,
    points_read: usize,
    dropped_non_finite: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    centroid: Option<[f64; 3]>,
    has_normals: bool,
    has_colors: bool,
}

#[derive(Serialize)]
pub(crate) struct BoundsInfo {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub dimensions: [f64; 3],
}

impl From<&cup_scan::Bounds> for BoundsInfo {
    fn from(b: &cup_scan::Bounds) -> Self {
        let dims = b.extent();
        Self {
            min: [b.min.x, b.min.y, b.min.z],
            max: [b.max.x, b.max.y, b.max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    }
}

impl CloudInfo {
    fn new(input: &Path, loaded: &LoadedCloud) -> Self {
        let cloud = &loaded.cloud;
        Self {
            path: input.display().to_string(),
            format: loaded.report.format.as_str().to_string(),
            points: cloud.len(),
            points_read: loaded.report.points_read,
            dropped_non_finite: loaded.report.dropped_non_finite,
            bounds: cloud.bounds().as_ref().map(BoundsInfo::from),
            centroid: cloud.centroid().map(|c| [c.x, c.y, c.z]),
            has_normals: cloud.has_normals(),
            has_colors: cloud.has_colors(),
        }
    }

    fn render_text(&self) -> String {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        let triple = |v: &[f64; 3]| format!("({:.3}, {:.3}, {:.3})", v[0], v[1], v[2]);

        let mut out = String::new();
        let _ = writeln!(out, "{}", "Point Cloud Information".bold().underline());
        let _ = writeln!(out, "  {}: {}", "File".cyan(), self.path);
        let _ = writeln!(out, "  {}: {}", "Format".cyan(), self.format);
        let _ = writeln!(out, "  {}: {}", "Points".cyan(), self.points);
        if self.dropped_non_finite > 0 {
            let _ = writeln!(
                out,
                "  {}: {} of {} (non-finite)",
                "Dropped".yellow(),
                self.dropped_non_finite,
                self.points_read
            );
        }

        if let Some(ref b) = self.bounds {
            let _ = writeln!(
                out,
                "  {}: {:.3} x {:.3} x {:.3}",
                "Dimensions".cyan(),
                b.dimensions[0],
                b.dimensions[1],
                b.dimensions[2]
            );
            let _ = writeln!(out, "  {}: {}", "Min bounds".cyan(), triple(&b.min));
            let _ = writeln!(out, "  {}: {}", "Max bounds".cyan(), triple(&b.max));
        }
        if let Some(ref c) = self.centroid {
            let _ = writeln!(out, "  {}: {}", "Centroid".cyan(), triple(c));
        }

        let _ = writeln!(out, "  {}: {}", "Has normals".cyan(), yes_no(self.has_normals));
        let _ = writeln!(out, "  {}: {}", "Has colors".cyan(), yes_no(self.has_colors));
        out
    }
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let loaded = PointCloud::load(input)
        .with_context(|| format!("Failed to load point cloud from {:?}", input))?;
    log_cloud_stats(&loaded.cloud, "info");

    let info = CloudInfo::new(input, &loaded);

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                print!("{}", info.render_text());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_report_lists_centroid() {
        let mut file = tempfile::NamedTempFile::with_suffix(".xyz").unwrap();
        writeln!(file, "0 0 0\n2 4 6\nnan 1 1").unwrap();
        file.flush().unwrap();

        let loaded = PointCloud::load(file.path()).unwrap();
        let info = CloudInfo::new(file.path(), &loaded);
        assert_eq!(info.centroid, Some([1.0, 2.0, 3.0]));

        let text = info.render_text();
        assert!(text.contains("Centroid"));
        assert!(text.contains("(1.000, 2.000, 3.000)"));
        assert!(text.contains("1 of 3 (non-finite)"));
        assert!(text.contains("(2.000, 4.000, 6.000)"));
    }
}

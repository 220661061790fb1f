//! End-to-end integration tests for cup-scan.
//!
//! These tests exercise the path from file -> point cloud -> detection on
//! synthetic cups, to ensure ingestion and the fitters work together.

use approx::assert_relative_eq;
use cup_scan::{
    Bounds, DetectionParams, Orientation, PointCloud, ScanError, detect_orientation,
    detect_volume_with,
};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{PI, TAU};
use std::io::Write;
use tempfile::NamedTempFile;

const RADIUS: f64 = 3.0;
const HEIGHT: f64 = 12.0;

/// A mug in centimeters: open wall, closed base, and a handle on the +X side.
fn create_mug(seed: u64) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::new();

    // Wall: 48 rings offset from band edges
    let rings = 48;
    for j in 0..rings {
        let y = (j as f64 + 0.5) * HEIGHT / rings as f64;
        for i in 0..36 {
            let t = TAU * i as f64 / 36.0;
            let r = RADIUS + rng.gen_range(-0.01..0.01);
            points.push(Point3::new(
                r * t.cos(),
                y + rng.gen_range(-0.005..0.005),
                r * t.sin(),
            ));
        }
    }

    // Base disc
    for ring in 1..=3 {
        let r = RADIUS * ring as f64 / 4.0;
        for i in 0..36 {
            let t = TAU * i as f64 / 36.0;
            points.push(Point3::new(r * t.cos(), 0.0, r * t.sin()));
        }
    }

    // Handle, low on the side
    for _ in 0..60 {
        points.push(Point3::new(
            rng.gen_range(3.5..5.0),
            rng.gen_range(2.0..6.0),
            rng.gen_range(-0.3..0.3),
        ));
    }

    points
}

fn write_ply(points: &[Point3<f64>]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".ply").unwrap();
    writeln!(file, "ply").unwrap();
    writeln!(file, "format ascii 1.0").unwrap();
    writeln!(file, "element vertex {}", points.len()).unwrap();
    writeln!(file, "property double x").unwrap();
    writeln!(file, "property double y").unwrap();
    writeln!(file, "property double z").unwrap();
    writeln!(file, "end_header").unwrap();
    for p in points {
        writeln!(file, "{} {} {}", p.x, p.y, p.z).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_detect_synthetic_mug() {
    let points = create_mug(1);
    let bounds = Bounds::from_points(&points).unwrap();
    let params = DetectionParams::default();
    let mut rng = StdRng::seed_from_u64(42);

    let result = detect_volume_with(&points, &bounds, &params, &mut rng).unwrap();

    assert!(result.orientation.is_vertical());
    assert!(matches!(
        result.orientation,
        Orientation::Upright | Orientation::Inverted
    ));

    // Normal path: interior is the shrunken rim circle down to the base
    assert_relative_eq!(result.cylinder.radius, 0.85 * RADIUS, epsilon = 0.02);
    assert_relative_eq!(result.cylinder.confidence, 0.8);
    assert_relative_eq!(result.base_height, bounds.min.y);
    assert_relative_eq!(result.cylinder.center.x, 0.0, epsilon = 0.02);
    assert_relative_eq!(result.cylinder.center.z, 0.0, epsilon = 0.02);
    assert_relative_eq!(result.cylinder.center.y, bounds.min.y);

    // Rim sits at the center of the top band
    let band = bounds.vertical_extent() / 20.0;
    assert_relative_eq!(result.rim_height, bounds.min.y + 19.5 * band, epsilon = 1e-9);

    let expected_volume =
        PI * result.cylinder.radius.powi(2) * (result.rim_height - result.base_height);
    assert_relative_eq!(result.interior_volume, expected_volume, epsilon = 1e-9);
    assert_relative_eq!(result.cylinder.height, result.rim_height - result.base_height);
}

#[test]
fn test_detection_is_reproducible_with_seed() {
    let points = create_mug(2);
    let bounds = Bounds::from_points(&points).unwrap();
    let params = DetectionParams::default();

    let a = detect_volume_with(&points, &bounds, &params, &mut StdRng::seed_from_u64(9));
    let b = detect_volume_with(&points, &bounds, &params, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

#[test]
fn test_thin_walled_preset_widens_interior() {
    let points = create_mug(3);
    let bounds = Bounds::from_points(&points).unwrap();

    let ceramic = detect_volume_with(
        &points,
        &bounds,
        &DetectionParams::default(),
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();
    let paper = detect_volume_with(
        &points,
        &bounds,
        &DetectionParams::thin_walled(),
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();

    assert!(paper.cylinder.radius > ceramic.cylinder.radius);
    assert!(paper.interior_volume > ceramic.interior_volume);
}

#[test]
fn test_sideways_mug() {
    // Lay the mug along X
    let points: Vec<_> = create_mug(4)
        .into_iter()
        .map(|p| Point3::new(p.y, p.x, p.z))
        .collect();
    let params = DetectionParams::default();

    let estimate = detect_orientation(&points, &params).unwrap();
    assert_eq!(estimate.orientation, Orientation::Sideways);
    assert!(estimate.axis.x.abs() > 0.9);

    let bounds = Bounds::from_points(&points).unwrap();
    if let Some(result) =
        detect_volume_with(&points, &bounds, &params, &mut StdRng::seed_from_u64(6))
    {
        assert_eq!(result.orientation, Orientation::Sideways);
        assert!(result.interior_volume >= 0.0);
    }
}

#[test]
fn test_load_ply_and_detect() {
    let points = create_mug(7);
    let file = write_ply(&points);

    let loaded = PointCloud::load(file.path()).unwrap();
    assert_eq!(loaded.report.points_read, points.len());
    assert_eq!(loaded.report.dropped_non_finite, 0);
    assert_eq!(loaded.cloud.len(), points.len());

    let positions = loaded.cloud.positions();
    let bounds = loaded.cloud.bounds().unwrap();
    let result = detect_volume_with(
        &positions,
        &bounds,
        &DetectionParams::default(),
        &mut StdRng::seed_from_u64(8),
    )
    .unwrap();
    assert_relative_eq!(result.cylinder.radius, 0.85 * RADIUS, epsilon = 0.02);
}

#[test]
fn test_load_sparse_xyz_is_not_enough_for_detection() {
    let mut file = NamedTempFile::with_suffix(".xyz").unwrap();
    for i in 0..50 {
        let t = TAU * i as f64 / 50.0;
        writeln!(file, "{} {} {}", t.cos(), i as f64 * 0.01, t.sin()).unwrap();
    }
    file.flush().unwrap();

    let loaded = PointCloud::load(file.path()).unwrap();
    let positions = loaded.cloud.positions();
    let bounds = loaded.cloud.bounds().unwrap();
    let params = DetectionParams::default();

    let result = detect_volume_with(&positions, &bounds, &params, &mut StdRng::seed_from_u64(1));
    assert!(result.is_none());

    // What a caller reports when detection is unavailable
    let err = ScanError::detection_unavailable(positions.len(), params.min_points);
    assert_eq!(err.code().as_str(), "SCAN-3001");
}

#[test]
fn test_non_ply_content_is_parse_error() {
    let mut file = NamedTempFile::with_suffix(".ply").unwrap();
    file.write_all(b"solid cube\nfacet normal 0 0 1\nendsolid cube\n").unwrap();
    file.flush().unwrap();

    let err = PointCloud::load(file.path()).unwrap_err();
    assert!(matches!(err, ScanError::ParseError { .. }));
}

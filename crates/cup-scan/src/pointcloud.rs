//! Point cloud container and file ingestion.
//!
//! Scanned cups arrive as unstructured point clouds. This module reads them
//! from PLY (ASCII or binary, with optional normals and colors) and plain XYZ
//! text, drops any point with a non-finite coordinate, and exposes the flat
//! position array plus axis-aligned bounds that the fitters consume.
//!
//! # Example
//!
//! ```ignore
//! use cup_scan::PointCloud;
//!
//! let loaded = PointCloud::load("mug.ply")?;
//! println!("{} points ({} dropped)", loaded.cloud.len(), loaded.report.dropped_non_finite);
//!
//! let positions = loaded.cloud.positions();
//! let bounds = loaded.cloud.bounds().expect("loaded clouds are never empty");
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use ply_rs::ply::Property;
use tracing::{debug, info, warn};

use crate::error::{ScanError, ScanResult};

/// RGB color attached to a scanned point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PointColor {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A point in the cloud with optional attributes.
#[derive(Debug, Clone)]
pub struct CloudPoint {
    /// 3D position.
    pub position: Point3<f64>,

    /// Normal vector from the scanner, if recorded.
    pub normal: Option<Vector3<f64>>,

    /// Point color (RGB).
    pub color: Option<PointColor>,
}

impl CloudPoint {
    /// Create a point with only position.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            color: None,
        }
    }

    /// Create a point from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a point with position and normal.
    #[inline]
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            color: None,
        }
    }

    /// True when every coordinate of the position is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    pub center: Point3<f64>,
}

impl Bounds {
    /// Compute bounds over a slice of positions. `None` for an empty slice.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        Self::enclosing(points.iter().copied())
    }

    /// Bounds enclosing every position yielded. `None` when nothing is yielded.
    pub fn enclosing(positions: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        });
        Some(Self::new(min, max))
    }

    /// Build bounds from corners; the center is their midpoint.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min,
            max,
            center: nalgebra::center(&min, &max),
        }
    }

    /// Size along each axis.
    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Size along the vertical (+Y) axis.
    #[inline]
    pub fn vertical_extent(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// A collection of 3D points with optional attributes.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// The points in the cloud.
    pub points: Vec<CloudPoint>,
}

impl PointCloud {
    /// Create a new empty point cloud.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a list of positions.
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        Self {
            points: positions.iter().map(|&p| CloudPoint::new(p)).collect(),
        }
    }

    /// Number of points in the cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check if all points have normals.
    pub fn has_normals(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.normal.is_some())
    }

    /// Check if any points have colors.
    pub fn has_colors(&self) -> bool {
        self.points.iter().any(|p| p.color.is_some())
    }

    /// Flat copy of the positions, in input order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Compute the axis-aligned bounding box.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.points.iter().map(|p| p.position))
    }

    /// Compute the centroid of the point cloud.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }

        let sum: Vector3<f64> = self
            .points
            .iter()
            .map(|p| p.position.coords)
            .fold(Vector3::zeros(), |acc, v| acc + v);

        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Add a point to the cloud.
    #[inline]
    pub fn push(&mut self, point: CloudPoint) {
        self.points.push(point);
    }

    /// Add a point from coordinates.
    #[inline]
    pub fn push_coords(&mut self, x: f64, y: f64, z: f64) {
        self.points.push(CloudPoint::from_coords(x, y, z));
    }

    /// Remove points with a non-finite coordinate. Returns how many were dropped.
    pub fn retain_finite(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(CloudPoint::is_finite);
        before - self.points.len()
    }

    /// Load a point cloud from file, auto-detecting format.
    ///
    /// Non-finite points are dropped and counted in the report. A file that
    /// yields no finite points is an [`ScanError::EmptyCloud`] error.
    pub fn load(path: impl AsRef<Path>) -> ScanResult<LoadedCloud> {
        let path = path.as_ref();
        let format = PointCloudFormat::from_path(path).ok_or_else(|| {
            ScanError::unsupported_format(
                path.extension().and_then(|e| e.to_str()).map(String::from),
            )
        })?;

        info!("Loading point cloud from {:?} (format: {:?})", path, format);

        let mut cloud = match format {
            PointCloudFormat::Ply => load_ply(path)?,
            PointCloudFormat::Xyz => load_xyz(path)?,
        };

        let points_read = cloud.len();
        let dropped_non_finite = cloud.retain_finite();
        if dropped_non_finite > 0 {
            warn!(
                dropped = dropped_non_finite,
                read = points_read,
                "Dropped points with non-finite coordinates"
            );
        }

        if cloud.is_empty() {
            return Err(ScanError::empty_cloud(format!(
                "{} points read, none with finite coordinates",
                points_read
            )));
        }

        info!(
            "Loaded {} points (has_normals: {}, has_colors: {})",
            cloud.len(),
            cloud.has_normals(),
            cloud.has_colors()
        );

        Ok(LoadedCloud {
            cloud,
            report: LoadReport {
                format,
                points_read,
                dropped_non_finite,
            },
        })
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded cloud together with what happened while loading it.
#[derive(Debug, Clone)]
pub struct LoadedCloud {
    pub cloud: PointCloud,
    pub report: LoadReport,
}

/// Ingestion statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Detected file format.
    pub format: PointCloudFormat,
    /// Points present in the file, before filtering.
    pub points_read: usize,
    /// Points removed because a coordinate was NaN or infinite.
    pub dropped_non_finite: usize,
}

// ============================================================================
// File formats
// ============================================================================

/// Supported point cloud file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    /// PLY (Stanford Polygon File Format)
    Ply,
    /// XYZ (simple ASCII x y z [nx ny nz] [r g b] format)
    Xyz,
}

impl PointCloudFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "ply" => Some(PointCloudFormat::Ply),
                "xyz" | "txt" | "asc" | "pts" => Some(PointCloudFormat::Xyz),
                _ => None,
            })
    }

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PointCloudFormat::Ply => "ply",
            PointCloudFormat::Xyz => "xyz",
        }
    }
}

/// Load point cloud from PLY file.
fn load_ply(path: &Path) -> ScanResult<PointCloud> {
    use ply_rs::parser::Parser;

    let file = File::open(path).map_err(|e| ScanError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<ply_rs::ply::DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| ScanError::parse_error(path, format!("PLY parse error: {:?}", e)))?;

    let Some(vertices) = ply.payload.get("vertex") else {
        debug!("PLY file has no vertex element");
        return Ok(PointCloud::new());
    };

    let mut cloud = PointCloud::with_capacity(vertices.len());

    for (index, vertex_element) in vertices.iter().enumerate() {
        let coord = |name: &str| {
            get_ply_float(vertex_element.get(name)).ok_or_else(|| {
                ScanError::parse_error(
                    path,
                    format!("vertex {} has missing or invalid '{}' property", index, name),
                )
            })
        };
        let mut point = CloudPoint::from_coords(coord("x")?, coord("y")?, coord("z")?);

        if let (Some(nx), Some(ny), Some(nz)) = (
            get_ply_float(vertex_element.get("nx")),
            get_ply_float(vertex_element.get("ny")),
            get_ply_float(vertex_element.get("nz")),
        ) {
            point.normal = Some(Vector3::new(nx, ny, nz));
        }

        if let (Some(r), Some(g), Some(b)) = (
            get_ply_u8(vertex_element.get("red")),
            get_ply_u8(vertex_element.get("green")),
            get_ply_u8(vertex_element.get("blue")),
        ) {
            point.color = Some(PointColor::new(r, g, b));
        }

        cloud.push(point);
    }

    Ok(cloud)
}

fn get_ply_float(prop: Option<&Property>) -> Option<f64> {
    match prop? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_ply_u8(prop: Option<&Property>) -> Option<u8> {
    match prop? {
        Property::UChar(v) => Some(*v),
        Property::Char(v) => Some(*v as u8),
        Property::UShort(v) => Some((*v).min(255) as u8),
        Property::Short(v) => Some((*v).clamp(0, 255) as u8),
        Property::UInt(v) => Some((*v).min(255) as u8),
        Property::Int(v) => Some((*v).clamp(0, 255) as u8),
        Property::Float(v) => Some((v * 255.0).clamp(0.0, 255.0) as u8),
        Property::Double(v) => Some((v * 255.0).clamp(0.0, 255.0) as u8),
        _ => None,
    }
}

/// Load point cloud from XYZ file (simple ASCII format).
fn load_xyz(path: &Path) -> ScanResult<PointCloud> {
    let file = File::open(path).map_err(|e| ScanError::io_read(path, e))?;
    let reader = BufReader::new(file);

    let mut cloud = PointCloud::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ScanError::io_read(path, e))?;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            warn!("Skipping invalid line {} in XYZ file", line_num + 1);
            continue;
        }

        let coord = |i: usize, axis: &str| {
            parts[i].parse::<f64>().map_err(|_| {
                ScanError::parse_error(
                    path,
                    format!("Invalid {} coordinate on line {}", axis, line_num + 1),
                )
            })
        };
        let mut point = CloudPoint::from_coords(coord(0, "x")?, coord(1, "y")?, coord(2, "z")?);

        // x y z nx ny nz [r g b]; an all-integer triple after xyz is a color
        if parts.len() >= 6
            && parts[3..6].iter().any(|s| s.contains('.') || s.contains('e'))
            && let (Ok(nx), Ok(ny), Ok(nz)) = (
                parts[3].parse::<f64>(),
                parts[4].parse::<f64>(),
                parts[5].parse::<f64>(),
            )
        {
            point.normal = Some(Vector3::new(nx, ny, nz));
        }

        let color_start = if point.normal.is_some() { 6 } else { 3 };
        if parts.len() >= color_start + 3
            && let (Ok(r), Ok(g), Ok(b)) = (
                parts[color_start].parse::<u8>(),
                parts[color_start + 1].parse::<u8>(),
                parts[color_start + 2].parse::<u8>(),
            )
        {
            point.color = Some(PointColor::new(r, g, b));
        }

        cloud.push(point);
    }

    Ok(cloud)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_cloud_point_creation() {
        let p = CloudPoint::from_coords(1.0, 2.0, 3.0);
        assert!(approx_eq(p.position.x, 1.0));
        assert!(approx_eq(p.position.y, 2.0));
        assert!(approx_eq(p.position.z, 3.0));
        assert!(p.normal.is_none());
        assert!(p.color.is_none());
        assert!(p.is_finite());
    }

    #[test]
    fn test_cloud_point_non_finite() {
        assert!(!CloudPoint::from_coords(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!CloudPoint::from_coords(0.0, f64::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn test_point_cloud_new() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert!(cloud.bounds().is_none());
        assert!(cloud.centroid().is_none());
    }

    #[test]
    fn test_point_cloud_bounds() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        cloud.push_coords(10.0, 5.0, 3.0);
        cloud.push_coords(-2.0, 8.0, 1.0);

        let bounds = cloud.bounds().unwrap();
        assert!(approx_eq(bounds.min.x, -2.0));
        assert!(approx_eq(bounds.min.y, 0.0));
        assert!(approx_eq(bounds.min.z, 0.0));
        assert!(approx_eq(bounds.max.x, 10.0));
        assert!(approx_eq(bounds.max.y, 8.0));
        assert!(approx_eq(bounds.max.z, 3.0));
        assert!(approx_eq(bounds.center.x, 4.0));
        assert!(approx_eq(bounds.vertical_extent(), 8.0));

        assert_eq!(Bounds::from_points(&cloud.positions()), Some(bounds));
        assert!(PointCloud::new().bounds().is_none());
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_point_cloud_centroid() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        cloud.push_coords(2.0, 0.0, 0.0);
        cloud.push_coords(1.0, 2.0, 0.0);

        let centroid = cloud.centroid().unwrap();
        assert!(approx_eq(centroid.x, 1.0));
        assert!(approx_eq(centroid.y, 2.0 / 3.0));
        assert!(approx_eq(centroid.z, 0.0));
    }

    #[test]
    fn test_point_cloud_has_normals() {
        let mut cloud = PointCloud::new();
        cloud.push(CloudPoint::from_coords(0.0, 0.0, 0.0));
        assert!(!cloud.has_normals());

        let mut cloud2 = PointCloud::new();
        cloud2.push(CloudPoint::with_normal(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ));
        assert!(cloud2.has_normals());
    }

    #[test]
    fn test_retain_finite() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        cloud.push_coords(f64::NAN, 1.0, 1.0);
        cloud.push_coords(1.0, f64::NEG_INFINITY, 1.0);
        cloud.push_coords(2.0, 2.0, 2.0);

        assert_eq!(cloud.retain_finite(), 2);
        assert_eq!(cloud.len(), 2);
        assert!(approx_eq(cloud.points[1].position.x, 2.0));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            PointCloudFormat::from_path(Path::new("cup.PLY")),
            Some(PointCloudFormat::Ply)
        );
        assert_eq!(
            PointCloudFormat::from_path(Path::new("cup.pts")),
            Some(PointCloudFormat::Xyz)
        );
        assert_eq!(PointCloudFormat::from_path(Path::new("cup.stl")), None);
        assert_eq!(PointCloudFormat::from_path(Path::new("cup")), None);
    }

    #[test]
    fn test_load_unsupported_format() {
        let err = PointCloud::load("mug.stl").unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PointCloud::load("/nonexistent/dir/mug.ply").unwrap_err();
        assert!(matches!(err, ScanError::IoRead { .. }));
    }

    #[test]
    fn test_load_ascii_ply_with_colors() {
        let file = write_temp(
            ".ply",
            "ply\n\
             format ascii 1.0\n\
             element vertex 3\n\
             property float x\n\
             property float y\n\
             property float z\n\
             property uchar red\n\
             property uchar green\n\
             property uchar blue\n\
             end_header\n\
             0 0 0 255 0 0\n\
             1 0 0 0 255 0\n\
             0 1 0.5 0 0 255\n",
        );

        let loaded = PointCloud::load(file.path()).unwrap();
        assert_eq!(loaded.report.format, PointCloudFormat::Ply);
        assert_eq!(loaded.report.points_read, 3);
        assert_eq!(loaded.report.dropped_non_finite, 0);
        assert_eq!(loaded.cloud.len(), 3);
        assert!(loaded.cloud.has_colors());
        assert!(!loaded.cloud.has_normals());
        assert_eq!(loaded.cloud.points[2].color, Some(PointColor::new(0, 0, 255)));
        assert!(approx_eq(loaded.cloud.points[2].position.z, 0.5));
    }

    #[test]
    fn test_load_xyz_drops_non_finite() {
        let file = write_temp(
            ".xyz",
            "# cup scan\n\
             0 0 0\n\
             1 2 3\n\
             nan 1 1\n\
             4 inf 4\n\
             5 5 5\n",
        );

        let loaded = PointCloud::load(file.path()).unwrap();
        assert_eq!(loaded.report.points_read, 5);
        assert_eq!(loaded.report.dropped_non_finite, 2);
        assert_eq!(loaded.cloud.len(), 3);
        assert!(loaded.cloud.points.iter().all(CloudPoint::is_finite));
    }

    #[test]
    fn test_load_xyz_normals_and_colors() {
        let file = write_temp(
            ".xyz",
            "0 0 0 0.0 1.0 0.0 10 20 30\n\
             1 1 1 200 100 50\n",
        );

        let loaded = PointCloud::load(file.path()).unwrap();
        let first = &loaded.cloud.points[0];
        assert!(approx_eq(first.normal.unwrap().y, 1.0));
        assert_eq!(first.color, Some(PointColor::new(10, 20, 30)));

        let second = &loaded.cloud.points[1];
        assert!(second.normal.is_none());
        assert_eq!(second.color, Some(PointColor::new(200, 100, 50)));
    }

    #[test]
    fn test_load_xyz_invalid_coordinate() {
        let file = write_temp(".xyz", "0 0 0\n1 abc 2\n");
        let err = PointCloud::load(file.path()).unwrap_err();
        match err {
            ScanError::ParseError { details, .. } => {
                assert!(details.contains("line 2"));
                assert!(details.contains('y'));
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_all_non_finite_is_empty_error() {
        let file = write_temp(".xyz", "nan nan nan\n");
        let err = PointCloud::load(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::EmptyCloud { .. }));
    }
}

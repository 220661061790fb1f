//! Cup orientation and interior volume detection.
//!
//! Detection runs in one synchronous pass over a borrowed point slice:
//!
//! 1. **Orientation**: dominant eigenvector of the position covariance by power
//!    iteration. Close enough to vertical and the cup is upright or inverted;
//!    otherwise it is lying on its side.
//! 2. **Rim height**: the vertical extent is sliced into equal bands and the
//!    topmost band that is reasonably dense is taken as the rim.
//! 3. **Rim circle**: points near the rim height are projected onto the
//!    horizontal plane and fitted with RANSAC.
//! 4. **Interior**: the rim radius is shrunk by a wall ratio and extended down
//!    to the bottom of the bounds. If no rim circle can be fitted, a full
//!    cylinder fit over all points is used instead.
//!
//! Every heuristic constant lives in [`DetectionParams`].
//!
//! # Example
//!
//! ```no_run
//! use cup_scan::{Bounds, detect_volume};
//! use nalgebra::Point3;
//!
//! let points: Vec<Point3<f64>> = Vec::new(); // from a scan
//! if let Some(bounds) = Bounds::from_points(&points)
//!     && let Some(result) = detect_volume(&points, &bounds)
//! {
//!     println!("{:?}: {:.1} cm³", result.orientation, result.interior_volume);
//! }
//! ```

use nalgebra::{Matrix3, Point2, Point3, Vector3};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::circle::{RansacParams, fit_circle_ransac_with_rng};
use crate::cylinder::{CylinderFit, fit_cylinder_with_rng};
use crate::pointcloud::Bounds;
use crate::tracing_ext::OperationTimer;

/// How the cup sits relative to the vertical (+Y) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    Upright,
    Inverted,
    Sideways,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Upright => "upright",
            Orientation::Inverted => "inverted",
            Orientation::Sideways => "sideways",
        }
    }

    /// True for upright and inverted cups.
    pub fn is_vertical(&self) -> bool {
        !matches!(self, Orientation::Sideways)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of orientation analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationEstimate {
    pub orientation: Orientation,
    /// Working axis: exactly `+Y` for vertical cups, the eigenvector otherwise.
    pub axis: Vector3<f64>,
    /// Dominant eigenvector before snapping.
    pub principal_axis: Vector3<f64>,
}

/// The detected cup interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeDetectionResult {
    pub cylinder: CylinderFit,
    pub rim_height: f64,
    pub base_height: f64,
    /// Interior volume in cubic scan units. Never negative.
    pub interior_volume: f64,
    pub orientation: Orientation,
}

/// Heuristic constants for volume detection.
///
/// # Example
///
/// ```
/// use cup_scan::DetectionParams;
///
/// // Thinner walls than a ceramic mug
/// let params = DetectionParams {
///     wall_ratio: 0.95,
///     ..Default::default()
/// };
/// assert_eq!(params.min_points, 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionParams {
    /// Fewer points than this and detection is unavailable.
    ///
    /// Default: `100`
    pub min_points: usize,

    /// Fixed number of power-iteration steps for the principal axis.
    ///
    /// Default: `50`
    pub power_iterations: usize,

    /// `|dot(axis, +Y)|` above this classifies the cup as vertical.
    ///
    /// Default: `0.7`
    pub vertical_alignment: f64,

    /// Number of equal-height bands for rim density analysis.
    ///
    /// Default: `20`
    pub rim_bands: usize,

    /// A band qualifies as the rim when its count exceeds this fraction of
    /// the densest band.
    ///
    /// Default: `0.3`
    pub rim_density_ratio: f64,

    /// Thickness of the slab gathered around the rim for circle fitting, as a
    /// fraction of the vertical extent.
    ///
    /// Default: `0.1`
    pub rim_band_fraction: f64,

    /// Interior radius as a fraction of the rim radius. Models wall thickness;
    /// `0.85` suits ceramic mugs.
    ///
    /// Default: `0.85`
    pub wall_ratio: f64,

    /// Confidence reported for rim-based detections.
    ///
    /// Default: `0.8`
    pub rim_confidence: f64,

    /// Height floor for rim-based detections.
    ///
    /// Default: `0.01`
    pub min_height: f64,

    /// RANSAC settings for the rim circle and the fallback cylinder.
    pub ransac: RansacParams,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_points: 100,
            power_iterations: 50,
            vertical_alignment: 0.7,
            rim_bands: 20,
            rim_density_ratio: 0.3,
            rim_band_fraction: 0.1,
            wall_ratio: 0.85,
            rim_confidence: 0.8,
            min_height: 0.01,
            ransac: RansacParams::default(),
        }
    }
}

impl DetectionParams {
    /// Params for paper and thin plastic cups, whose walls are a much smaller
    /// share of the rim radius.
    pub fn thin_walled() -> Self {
        Self {
            wall_ratio: 0.92,
            ..Default::default()
        }
    }
}

/// Detect the cup interior with default params and the generator described
/// by `DetectionParams::default().ransac`.
pub fn detect_volume(points: &[Point3<f64>], bounds: &Bounds) -> Option<VolumeDetectionResult> {
    let params = DetectionParams::default();
    let mut rng = params.ransac.rng();
    detect_volume_with(points, bounds, &params, &mut rng)
}

/// Detect the cup interior.
///
/// Returns `None` with fewer than `params.min_points` points, or when both the
/// rim circle and the fallback cylinder fit fail.
pub fn detect_volume_with<R: Rng + ?Sized>(
    points: &[Point3<f64>],
    bounds: &Bounds,
    params: &DetectionParams,
    rng: &mut R,
) -> Option<VolumeDetectionResult> {
    let _timer = OperationTimer::with_context("detect_volume", points.len());

    if points.len() < params.min_points {
        debug!(
            points = points.len(),
            required = params.min_points,
            "Too few points for volume detection"
        );
        return None;
    }

    let estimate = detect_orientation(points, params)?;
    let rim_height = detect_rim_height(points, bounds, params);

    let half_slab = 0.5 * params.rim_band_fraction * bounds.vertical_extent();
    let rim_points: Vec<Point2<f64>> = points
        .iter()
        .filter(|p| within_band(p.y, rim_height, half_slab))
        .map(|p| Point2::new(p.x, p.z))
        .collect();
    debug!(rim_height, rim_points = rim_points.len(), "Rim slab");

    let result = match fit_circle_ransac_with_rng(&rim_points, &params.ransac, rng) {
        Some(rim) => {
            let radius = params.wall_ratio * rim.radius;
            let base_height = bounds.min.y;
            let height = (rim_height - base_height).max(params.min_height);
            let interior_volume = (std::f64::consts::PI * radius * radius * height).max(0.0);

            VolumeDetectionResult {
                cylinder: CylinderFit {
                    center: Point3::new(rim.center.x, base_height, rim.center.y),
                    radius,
                    height,
                    axis: estimate.axis,
                    confidence: params.rim_confidence,
                },
                rim_height,
                base_height,
                interior_volume,
                orientation: estimate.orientation,
            }
        }
        None => {
            warn!("Rim circle fit failed, falling back to full cylinder fit");
            let Some(cylinder) = fit_cylinder_with_rng(points, &Vector3::y(), &params.ransac, rng)
            else {
                debug!("Fallback cylinder fit failed");
                return None;
            };

            VolumeDetectionResult {
                cylinder,
                rim_height: cylinder.center.y + cylinder.height,
                base_height: cylinder.center.y,
                interior_volume: cylinder.volume(),
                orientation: estimate.orientation,
            }
        }
    };

    info!(
        orientation = %result.orientation,
        radius = format!("{:.4}", result.cylinder.radius),
        height = format!("{:.4}", result.cylinder.height),
        volume = format!("{:.4}", result.interior_volume),
        "Volume detected"
    );
    Some(result)
}

/// Dominant eigenvector of the position covariance.
///
/// Runs `iterations` fixed power-iteration steps from `(1, 0, 0)`, normalizing
/// each step. If the product vanishes the current vector is kept. Returns
/// `None` for an empty slice.
pub fn principal_axis(points: &[Point3<f64>], iterations: usize) -> Option<Vector3<f64>> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let mean = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords)
        / n;

    let covariance = points.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p.coords - mean;
        acc + d * d.transpose()
    }) / n;

    let mut v = Vector3::x();
    for _ in 0..iterations {
        match (covariance * v).try_normalize(f64::MIN_POSITIVE) {
            Some(next) => v = next,
            None => break,
        }
    }
    Some(v)
}

/// Classify the cup orientation from its principal axis.
pub fn detect_orientation(
    points: &[Point3<f64>],
    params: &DetectionParams,
) -> Option<OrientationEstimate> {
    let principal = principal_axis(points, params.power_iterations)?;
    let alignment = principal.dot(&Vector3::y());

    let (orientation, axis) = if alignment.abs() > params.vertical_alignment {
        let orientation = if principal.y > 0.0 {
            Orientation::Upright
        } else {
            Orientation::Inverted
        };
        (orientation, Vector3::y())
    } else {
        (Orientation::Sideways, principal)
    };

    debug!(
        ?orientation,
        alignment,
        px = principal.x,
        py = principal.y,
        pz = principal.z,
        "Orientation"
    );
    Some(OrientationEstimate {
        orientation,
        axis,
        principal_axis: principal,
    })
}

/// Height of the rim: the center of the topmost band whose point count
/// exceeds `rim_density_ratio` of the densest band. Defaults to the top of
/// the bounds.
pub fn detect_rim_height(points: &[Point3<f64>], bounds: &Bounds, params: &DetectionParams) -> f64 {
    let bands = params.rim_bands;
    let thickness = bounds.vertical_extent() / bands as f64;
    let half = thickness / 2.0;

    let centers: Vec<f64> = (0..bands)
        .map(|i| bounds.min.y + (i as f64 + 0.5) * thickness)
        .collect();
    let counts: Vec<usize> = centers
        .iter()
        .map(|&c| points.iter().filter(|p| within_band(p.y, c, half)).count())
        .collect();

    let max_density = counts.iter().copied().max().unwrap_or(0);
    let threshold = params.rim_density_ratio * max_density as f64;

    let rim = centers
        .iter()
        .zip(&counts)
        .rev()
        .find(|&(_, &count)| count as f64 > threshold)
        .map(|(&center, _)| center)
        .unwrap_or(bounds.max.y);

    debug!(max_density, threshold, rim, "Rim density analysis");
    rim
}

/// Band membership. Strict except for a zero-thickness band, which holds
/// every point at its height.
#[inline]
fn within_band(y: f64, center: f64, half: f64) -> bool {
    let d = (y - center).abs();
    if half > 0.0 { d < half } else { d <= half }
}

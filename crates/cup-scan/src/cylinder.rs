//! Cylinder fitting along a known axis.
//!
//! Points are projected onto the plane orthogonal to the axis, a circle is
//! fitted there with RANSAC, and the axial extent gives the height. For the
//! vertical axis the projection simply drops Y, so plane coordinates are
//! `(x, z)`.

use nalgebra::{Point2, Point3, Vector3};
use rand::Rng;
use tracing::debug;

use crate::circle::{RansacParams, fit_circle_ransac_with_rng};

/// Minimum number of points for a cylinder fit.
pub const MIN_CYLINDER_POINTS: usize = 10;

/// A cylinder fitted to scan points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderFit {
    /// Center of the base disc.
    pub center: Point3<f64>,
    pub radius: f64,
    pub height: f64,
    /// Unit axis from base towards the top.
    pub axis: Vector3<f64>,
    /// Fit quality in `[0, 1]`. Informational only.
    pub confidence: f64,
}

impl CylinderFit {
    /// Enclosed volume, `π r² h`.
    pub fn volume(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius * self.height
    }

    /// Center of the top disc.
    pub fn top_center(&self) -> Point3<f64> {
        self.center + self.axis * self.height
    }
}

/// Orthonormal frame of the plane orthogonal to an axis.
///
/// For `axis = +Y` the frame is `(X, Z)`, so projecting drops the Y
/// coordinate.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    pub axis: Vector3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
}

impl PlaneFrame {
    /// Build a frame for `axis`. `None` if the axis has no usable direction.
    pub fn new(axis: &Vector3<f64>) -> Option<Self> {
        let axis = axis.try_normalize(f64::EPSILON)?;
        let helper = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let u = (helper - axis * helper.dot(&axis)).normalize();
        let v = u.cross(&axis);
        Some(Self { axis, u, v })
    }

    /// Plane coordinates of `p`.
    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        Point2::new(p.coords.dot(&self.u), p.coords.dot(&self.v))
    }

    /// Coordinate of `p` along the axis.
    #[inline]
    pub fn axial(&self, p: &Point3<f64>) -> f64 {
        p.coords.dot(&self.axis)
    }

    /// Inverse of [`project`](Self::project) plus [`axial`](Self::axial).
    #[inline]
    pub fn lift(&self, q: &Point2<f64>, axial: f64) -> Point3<f64> {
        Point3::from(self.u * q.x + self.v * q.y + self.axis * axial)
    }
}

/// Fit a cylinder along `axis` using the generator described by `params.seed`.
pub fn fit_cylinder(
    points: &[Point3<f64>],
    axis: &Vector3<f64>,
    params: &RansacParams,
) -> Option<CylinderFit> {
    let mut rng = params.rng();
    fit_cylinder_with_rng(points, axis, params, &mut rng)
}

/// Fit a cylinder along the vertical (+Y) axis.
pub fn fit_vertical_cylinder(points: &[Point3<f64>], params: &RansacParams) -> Option<CylinderFit> {
    fit_cylinder(points, &Vector3::y(), params)
}

/// Fit a cylinder along `axis`, drawing RANSAC samples from `rng`.
///
/// Requires at least [`MIN_CYLINDER_POINTS`] points. The base center is the
/// fitted circle center at the lowest axial coordinate. Confidence is
/// `max(0, 1 - mean|d - r| / r)` over all points, where `d` is the planar
/// distance to the center.
pub fn fit_cylinder_with_rng<R: Rng + ?Sized>(
    points: &[Point3<f64>],
    axis: &Vector3<f64>,
    params: &RansacParams,
    rng: &mut R,
) -> Option<CylinderFit> {
    if points.len() < MIN_CYLINDER_POINTS {
        debug!(
            points = points.len(),
            required = MIN_CYLINDER_POINTS,
            "Too few points for cylinder fit"
        );
        return None;
    }

    let Some(frame) = PlaneFrame::new(axis) else {
        debug!("Cylinder axis has zero length");
        return None;
    };

    let projected: Vec<Point2<f64>> = points.iter().map(|p| frame.project(p)).collect();
    let circle = fit_circle_ransac_with_rng(&projected, params, rng)?;

    let (min_axial, max_axial) = points
        .iter()
        .map(|p| frame.axial(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        });
    let height = max_axial - min_axial;
    if height <= 0.0 {
        debug!(height, "Cylinder has no axial extent");
        return None;
    }

    let mean_residual = projected
        .iter()
        .map(|q| circle.residual(q).abs())
        .sum::<f64>()
        / projected.len() as f64;
    let confidence = (1.0 - mean_residual / circle.radius).clamp(0.0, 1.0);

    let fit = CylinderFit {
        center: frame.lift(&circle.center, min_axial),
        radius: circle.radius,
        height,
        axis: frame.axis,
        confidence,
    };
    debug!(
        radius = fit.radius,
        height = fit.height,
        confidence = fit.confidence,
        "Cylinder fit"
    );
    Some(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn shell(radius: f64, height: f64, angles: usize, rings: usize) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(angles * (rings + 1));
        for ring in 0..=rings {
            let y = height * ring as f64 / rings as f64;
            for i in 0..angles {
                let t = TAU * i as f64 / angles as f64;
                points.push(Point3::new(radius * t.cos(), y, radius * t.sin()));
            }
        }
        points
    }

    #[test]
    fn test_vertical_shell() {
        let points = shell(1.0, 2.0, 36, 20);
        let fit = fit_vertical_cylinder(&points, &RansacParams::seeded(42)).unwrap();
        assert_relative_eq!(fit.height, 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.radius, 1.0, epsilon = 1e-3);
        assert!(fit.confidence > 0.9);
        assert_relative_eq!(fit.center.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.center.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(fit.center.z, 0.0, epsilon = 1e-3);
        assert_relative_eq!(fit.axis, Vector3::y());
    }

    #[test]
    fn test_offset_shell_base_center() {
        let points: Vec<_> = shell(0.5, 1.0, 24, 10)
            .into_iter()
            .map(|p| p + Vector3::new(3.0, -1.0, 2.0))
            .collect();
        let fit = fit_vertical_cylinder(&points, &RansacParams::seeded(5)).unwrap();
        assert_relative_eq!(fit.center.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(fit.center.y, -1.0, epsilon = 1e-9);
        assert_relative_eq!(fit.center.z, 2.0, epsilon = 1e-6);
        assert_relative_eq!(fit.top_center().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_axis() {
        // Shell lying along X
        let points: Vec<_> = shell(1.0, 4.0, 36, 10)
            .into_iter()
            .map(|p| Point3::new(p.y, p.x, p.z))
            .collect();
        let fit = fit_cylinder(&points, &Vector3::x(), &RansacParams::seeded(9)).unwrap();
        assert_relative_eq!(fit.height, 4.0, epsilon = 1e-9);
        assert_relative_eq!(fit.radius, 1.0, epsilon = 1e-6);
        assert_relative_eq!(fit.center.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fit.volume(), std::f64::consts::PI * 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_too_few_points() {
        let points = shell(1.0, 1.0, 3, 2); // 9 points
        assert_eq!(points.len(), 9);
        assert!(fit_vertical_cylinder(&points, &RansacParams::seeded(1)).is_none());
    }

    #[test]
    fn test_flat_ring_has_no_height() {
        let points: Vec<_> = (0..36)
            .map(|i| {
                let t = TAU * i as f64 / 36.0;
                Point3::new(t.cos(), 0.5, t.sin())
            })
            .collect();
        assert!(fit_vertical_cylinder(&points, &RansacParams::seeded(1)).is_none());
    }

    #[test]
    fn test_zero_axis_rejected() {
        let points = shell(1.0, 1.0, 12, 4);
        assert!(fit_cylinder(&points, &Vector3::zeros(), &RansacParams::seeded(1)).is_none());
    }

    #[test]
    fn test_plane_frame_vertical_drops_y() {
        let frame = PlaneFrame::new(&Vector3::y()).unwrap();
        let p = Point3::new(1.5, 7.0, -2.5);
        let q = frame.project(&p);
        assert_relative_eq!(q.x, 1.5);
        assert_relative_eq!(q.y, -2.5);
        assert_relative_eq!(frame.axial(&p), 7.0);
        assert_relative_eq!(frame.lift(&q, 7.0), p);
    }

    #[test]
    fn test_noisy_shell_confidence_degrades() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        let points: Vec<_> = shell(1.0, 2.0, 36, 20)
            .into_iter()
            .map(|p| {
                let s = 1.0 + rng.gen_range(-0.2..0.2);
                Point3::new(p.x * s, p.y, p.z * s)
            })
            .collect();
        let params = RansacParams {
            inlier_threshold: 0.2,
            ..RansacParams::seeded(3)
        };
        let fit = fit_vertical_cylinder(&points, &params).unwrap();
        assert!(fit.confidence < 0.99);
        assert!(fit.confidence > 0.7);
    }
}

//! Planar circle fitting.
//!
//! Two fitters over 2D point sets:
//!
//! - [`fit_circle_algebraic`]: Kåsa least squares, deterministic, exact on
//!   noise-free data but pulled off by outliers.
//! - [`fit_circle_ransac`]: repeated minimal three-point fits scored by inlier
//!   count, followed by an algebraic refit on the winner's inliers. Handles,
//!   broken rim segments and stray scan points fall outside the consensus set.
//!
//! Both return `None` rather than erroring when the data cannot support a
//! circle (too few points, collinear input, non-finite radius).

use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Determinant magnitude below which the normal equations are treated as singular.
pub const SINGULAR_DET_EPSILON: f64 = 1e-10;

/// A fitted circle in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle2D {
    pub center: Point2<f64>,
    /// Always finite and strictly positive.
    pub radius: f64,
}

impl Circle2D {
    /// Signed radial residual: positive outside the circle, negative inside.
    #[inline]
    pub fn residual(&self, point: &Point2<f64>) -> f64 {
        nalgebra::distance(point, &self.center) - self.radius
    }

    /// Number of points whose absolute residual is below `threshold`.
    pub fn count_inliers(&self, points: &[Point2<f64>], threshold: f64) -> usize {
        points
            .iter()
            .filter(|p| self.residual(p).abs() < threshold)
            .count()
    }
}

/// RANSAC settings for circle fitting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RansacParams {
    /// Number of minimal-sample trials. Bounds the cost at
    /// `O(iterations * points)`.
    ///
    /// Default: `200`
    pub iterations: usize,

    /// Maximum absolute radial residual for a point to count as an inlier,
    /// in scan units.
    ///
    /// Default: `0.05`
    pub inlier_threshold: f64,

    /// Seed for a reproducible generator. `None` seeds from OS entropy.
    ///
    /// Default: `None`
    pub seed: Option<u64>,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            iterations: 200,
            inlier_threshold: 0.05,
            seed: None,
        }
    }
}

impl RansacParams {
    /// Default settings with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Build the generator these params describe.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Fit a circle by algebraic (Kåsa) least squares.
///
/// Solves `x² + y² = 2ax + 2by + c` for `(a, b, c)` via the 3×3 normal
/// equations and Cramer's rule, then `r = sqrt(c + a² + b²)`.
///
/// Returns `None` for fewer than 3 points, a singular system, or a radius
/// that is not finite and positive.
pub fn fit_circle_algebraic(points: &[Point2<f64>]) -> Option<Circle2D> {
    let n = points.len();
    if n < 3 {
        debug!(points = n, "Circle fit needs at least 3 points");
        return None;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xxx = 0.0;
    let mut sum_yyy = 0.0;
    let mut sum_xxy = 0.0;
    let mut sum_xyy = 0.0;

    for p in points {
        let (x, y) = (p.x, p.y);
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_yy += y * y;
        sum_xy += x * y;
        sum_xxx += x * x * x;
        sum_yyy += y * y * y;
        sum_xxy += x * x * y;
        sum_xyy += x * y * y;
    }

    let ata = [
        [4.0 * sum_xx, 4.0 * sum_xy, 2.0 * sum_x],
        [4.0 * sum_xy, 4.0 * sum_yy, 2.0 * sum_y],
        [2.0 * sum_x, 2.0 * sum_y, n as f64],
    ];
    let atz = [
        2.0 * (sum_xxx + sum_xyy),
        2.0 * (sum_xxy + sum_yyy),
        sum_xx + sum_yy,
    ];

    let det = det3(&ata);
    if det.abs() < SINGULAR_DET_EPSILON {
        debug!(det, "Circle fit system is singular (collinear or coincident points)");
        return None;
    }

    let a = det3(&with_column(&ata, 0, &atz)) / det;
    let b = det3(&with_column(&ata, 1, &atz)) / det;
    let c = det3(&with_column(&ata, 2, &atz)) / det;

    let radius = (c + a * a + b * b).sqrt();
    if !radius.is_finite() || radius <= 0.0 {
        debug!(radius, "Circle fit produced a degenerate radius");
        return None;
    }

    Some(Circle2D {
        center: Point2::new(a, b),
        radius,
    })
}

/// Fit a circle robustly with RANSAC, using the generator described by
/// `params.seed`.
pub fn fit_circle_ransac(points: &[Point2<f64>], params: &RansacParams) -> Option<Circle2D> {
    let mut rng = params.rng();
    fit_circle_ransac_with_rng(points, params, &mut rng)
}

/// Fit a circle robustly with RANSAC, drawing samples from `rng`.
///
/// Each trial draws three distinct indices uniformly (a repeated index is
/// redrawn), fits them algebraically and counts inliers. Only a strictly
/// larger inlier count replaces the current best. The winner is then refit
/// on all of its inliers; the refit is used when it succeeds.
pub fn fit_circle_ransac_with_rng<R: Rng + ?Sized>(
    points: &[Point2<f64>],
    params: &RansacParams,
    rng: &mut R,
) -> Option<Circle2D> {
    let n = points.len();
    if n < 3 {
        debug!(points = n, "RANSAC circle fit needs at least 3 points");
        return None;
    }

    let mut best: Option<(Circle2D, usize)> = None;

    for trial in 0..params.iterations {
        let [i, j, k] = sample_distinct(rng, n);
        let Some(candidate) = fit_circle_algebraic(&[points[i], points[j], points[k]]) else {
            continue;
        };

        let inliers = candidate.count_inliers(points, params.inlier_threshold);
        trace!(trial, inliers, radius = candidate.radius, "RANSAC trial");

        if best.is_none_or(|(_, count)| inliers > count) {
            best = Some((candidate, inliers));
        }
    }

    let Some((winner, inlier_count)) = best else {
        debug!(
            iterations = params.iterations,
            "No RANSAC trial produced a circle"
        );
        return None;
    };

    let inliers: Vec<Point2<f64>> = points
        .iter()
        .filter(|p| winner.residual(p).abs() < params.inlier_threshold)
        .copied()
        .collect();

    let refined = fit_circle_algebraic(&inliers).unwrap_or(winner);
    debug!(
        inliers = inlier_count,
        total = n,
        cx = refined.center.x,
        cy = refined.center.y,
        radius = refined.radius,
        "RANSAC circle fit"
    );
    Some(refined)
}

/// Draw three distinct indices from `0..n` by rejection. Requires `n >= 3`.
fn sample_distinct<R: Rng + ?Sized>(rng: &mut R, n: usize) -> [usize; 3] {
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n);
    while j == i {
        j = rng.gen_range(0..n);
    }
    let mut k = rng.gen_range(0..n);
    while k == i || k == j {
        k = rng.gen_range(0..n);
    }
    [i, j, k]
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Copy of `m` with column `col` replaced by `v` (Cramer's rule numerator).
fn with_column(m: &[[f64; 3]; 3], col: usize, v: &[f64; 3]) -> [[f64; 3]; 3] {
    let mut out = *m;
    for (row, value) in out.iter_mut().zip(v) {
        row[col] = *value;
    }
    out
}

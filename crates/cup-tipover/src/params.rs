//! Cylinder parameters handed to the physics engine.
//!
//! [`CylinderParams`] is a by-value copy of the geometry of a detected
//! [`CylinderFit`]. Manual corrections produce new values, so the original
//! detection is always available for reset.

use cup_scan::CylinderFit;
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{TipoverError, TipoverResult};

/// Smallest radius or height accepted by the physics engine.
pub const MIN_DIMENSION: f64 = 0.01;

/// The cylinder geometry physics needs: a base center, radius, and height.
///
/// The cylinder axis is always world +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    /// Center of the base disc.
    pub center: Point3<f64>,
    pub radius: f64,
    pub height: f64,
}

impl CylinderParams {
    pub fn new(center: Point3<f64>, radius: f64, height: f64) -> Self {
        Self {
            center,
            radius,
            height,
        }
    }

    /// Cylinder standing on the origin.
    pub fn at_origin(radius: f64, height: f64) -> Self {
        Self::new(Point3::origin(), radius, height)
    }

    /// Copy moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }

    /// Copy with radius and height multiplied by `factor`. The base center
    /// stays put.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            radius: self.radius * factor,
            height: self.height * factor,
            ..*self
        }
    }

    /// Copy with every length multiplied by `unit_scale`, base center
    /// included. Converts a scan-unit cylinder to meters.
    pub fn converted(&self, unit_scale: f64) -> Self {
        Self {
            center: Point3::from(self.center.coords * unit_scale),
            radius: self.radius * unit_scale,
            height: self.height * unit_scale,
        }
    }

    pub fn with_radius(&self, radius: f64) -> Self {
        Self { radius, ..*self }
    }

    pub fn with_height(&self, height: f64) -> Self {
        Self { height, ..*self }
    }

    /// Full enclosed volume, `π r² h`.
    pub fn volume(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius * self.height
    }

    /// Reject non-finite values and non-positive dimensions.
    pub fn validate(&self) -> TipoverResult<()> {
        if let Some(bad) = self.center.coords.iter().copied().find(|c| !c.is_finite()) {
            return Err(TipoverError::invalid_param(
                "center",
                bad,
                "base center must be finite",
            ));
        }
        for (name, value) in [("radius", self.radius), ("height", self.height)] {
            if !value.is_finite() {
                return Err(TipoverError::invalid_param(name, value, "must be finite"));
            }
            if value <= 0.0 {
                return Err(TipoverError::invalid_param(
                    name,
                    value,
                    "must be strictly positive",
                ));
            }
        }
        Ok(())
    }

    /// Copy with radius and height floored at [`MIN_DIMENSION`]. Non-finite
    /// dimensions are replaced by the floor.
    pub fn clamped(&self) -> Self {
        let floor = |v: f64| {
            if v.is_finite() {
                v.max(MIN_DIMENSION)
            } else {
                MIN_DIMENSION
            }
        };
        let clamped = Self {
            radius: floor(self.radius),
            height: floor(self.height),
            ..*self
        };
        if clamped != *self {
            debug!(
                radius = self.radius,
                height = self.height,
                "Clamped cylinder dimensions to {}",
                MIN_DIMENSION
            );
        }
        clamped
    }
}

impl From<&CylinderFit> for CylinderParams {
    fn from(fit: &CylinderFit) -> Self {
        Self::new(fit.center, fit.radius, fit.height)
    }
}

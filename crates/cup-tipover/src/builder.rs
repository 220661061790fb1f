//! Fluent builder API for tipover simulation.
//!
//! [`SimulationBuilder`] collects fill level, tilt, and mass settings, then
//! validates the cylinder before running the physics. It can also sweep the
//! tilt from upright to horizontal.
//!
//! # Example
//!
//! ```
//! use cup_tipover::{CylinderParams, SimulationBuilder};
//!
//! let cylinder = CylinderParams::at_origin(0.04, 0.1);
//!
//! let state = SimulationBuilder::new(&cylinder)
//!     .fill_level(0.65)
//!     .tilt_degrees(10.0)
//!     .estimated_cup_mass(0.005, 2400.0)
//!     .build()
//!     .unwrap();
//!
//! assert!(state.is_stable);
//! ```

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::error::{TipoverError, TipoverResult};
use crate::params::CylinderParams;
use crate::physics::{PhysicsParams, PhysicsState, calculate_physics_state};
use crate::units::estimate_cup_mass;

/// Fluent builder for a physics snapshot or a tilt sweep.
///
/// Defaults: empty cup, upright, masses from [`PhysicsParams::default`].
#[derive(Debug, Clone)]
pub struct SimulationBuilder<'a> {
    cylinder: &'a CylinderParams,
    fill_level: f64,
    tilt_angle: f64,
    cup_mass: f64,
    liquid_density: f64,
}

impl<'a> SimulationBuilder<'a> {
    pub fn new(cylinder: &'a CylinderParams) -> Self {
        let defaults = PhysicsParams::default();
        Self {
            cylinder,
            fill_level: 0.0,
            tilt_angle: 0.0,
            cup_mass: defaults.cup_mass,
            liquid_density: defaults.liquid_density,
        }
    }

    // =========================================================================
    // Liquid and Pose
    // =========================================================================

    /// Set the fill fraction. Values outside `[0, 1]` are clamped at build.
    pub fn fill_level(mut self, fill: f64) -> Self {
        self.fill_level = fill;
        self
    }

    /// Set the tilt in radians. Values outside `[0, π/2]` are clamped at build.
    pub fn tilt_angle(mut self, radians: f64) -> Self {
        self.tilt_angle = radians;
        self
    }

    /// Set the tilt in degrees.
    pub fn tilt_degrees(mut self, degrees: f64) -> Self {
        self.tilt_angle = degrees.to_radians();
        self
    }

    // =========================================================================
    // Masses
    // =========================================================================

    /// Set the empty cup mass in kilograms.
    pub fn cup_mass(mut self, mass: f64) -> Self {
        self.cup_mass = mass;
        self
    }

    /// Derive the cup mass from its walls, treating the cylinder radius as
    /// the outer radius.
    pub fn estimated_cup_mass(mut self, wall_thickness: f64, density: f64) -> Self {
        self.cup_mass = estimate_cup_mass(
            self.cylinder.radius,
            self.cylinder.height,
            wall_thickness,
            density,
        );
        self
    }

    /// Set the liquid density in kg/m³.
    pub fn liquid_density(mut self, density: f64) -> Self {
        self.liquid_density = density;
        self
    }

    /// Take cup mass and liquid density from `params`.
    pub fn params(mut self, params: &PhysicsParams) -> Self {
        self.cup_mass = params.cup_mass;
        self.liquid_density = params.liquid_density;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Compute the physics state for the configured pose.
    ///
    /// # Errors
    ///
    /// Returns [`TipoverError::InvalidParams`] if the cylinder has a
    /// non-positive or non-finite dimension, or a setting is NaN.
    pub fn build(&self) -> TipoverResult<PhysicsState> {
        self.validate()?;
        if self.tilt_angle.is_nan() {
            return Err(TipoverError::invalid_param(
                "tilt_angle",
                self.tilt_angle,
                "must be a number",
            ));
        }
        Ok(self.state_at(self.tilt_angle))
    }

    /// Evaluate `steps + 1` tilts evenly spaced from 0 to 90° inclusive for
    /// the configured fill level. The configured tilt is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TipoverError::InvalidParams`] for an invalid cylinder or
    /// zero steps.
    pub fn sweep(&self, steps: usize) -> TipoverResult<Vec<PhysicsState>> {
        self.validate()?;
        if steps == 0 {
            return Err(TipoverError::invalid_param(
                "steps",
                0.0,
                "a sweep needs at least one step",
            ));
        }

        let states: Vec<_> = (0..=steps)
            .map(|i| self.state_at(FRAC_PI_2 * i as f64 / steps as f64))
            .collect();

        debug!(
            steps,
            fill = self.fill_level,
            critical_deg = states[0].critical_tipover_degrees(),
            "Tilt sweep complete"
        );
        Ok(states)
    }

    fn validate(&self) -> TipoverResult<()> {
        self.cylinder.validate()?;
        for (name, value) in [
            ("fill_level", self.fill_level),
            ("cup_mass", self.cup_mass),
            ("liquid_density", self.liquid_density),
        ] {
            if value.is_nan() {
                return Err(TipoverError::invalid_param(name, value, "must be a number"));
            }
        }
        Ok(())
    }

    fn state_at(&self, tilt_angle: f64) -> PhysicsState {
        calculate_physics_state(
            self.cylinder,
            self.fill_level,
            tilt_angle,
            self.cup_mass,
            self.liquid_density,
        )
    }
}

/// Key tilts found in a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSummary {
    /// Critical tipover angle in radians. Constant across a sweep.
    pub critical_tipover_angle: f64,
    /// First sampled tilt, in radians, at which the cup is unstable.
    pub first_unstable_tilt: Option<f64>,
    /// First sampled tilt, in radians, at which liquid pours.
    pub first_spill_tilt: Option<f64>,
    pub max_volume_poured: f64,
}

impl SweepSummary {
    /// Summarize a sweep. Returns `None` for an empty slice.
    pub fn from_states(states: &[PhysicsState]) -> Option<Self> {
        let first = states.first()?;
        Some(Self {
            critical_tipover_angle: first.critical_tipover_angle,
            first_unstable_tilt: states.iter().find(|s| !s.is_stable).map(|s| s.tilt_angle),
            first_spill_tilt: states
                .iter()
                .find(|s| s.volume_poured > 0.0)
                .map(|s| s.tilt_angle),
            max_volume_poured: states.iter().map(|s| s.volume_poured).fold(0.0, f64::max),
        })
    }
}

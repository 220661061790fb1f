//! Closed-form physics of a tilted, partially filled cylindrical cup.
//!
//! Every function here is pure: the same inputs always produce the same
//! outputs and nothing is cached between calls. Tilting happens about a base
//! edge, the cup axis is world +Y, and angles are in radians unless a name
//! says otherwise.
//!
//! The spill model in [`volume_poured`] is a wedge approximation, not an
//! exact integral of the liquid above a tilted rim plane.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Point3, Vector3};
use tracing::trace;

use crate::params::CylinderParams;

/// Mass and density inputs for [`calculate_physics_state`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsParams {
    /// Empty cup mass in kilograms.
    pub cup_mass: f64,
    /// Liquid density in kg/m³. Water is 1000.
    pub liquid_density: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            cup_mass: 0.3,
            liquid_density: 1000.0,
        }
    }
}

/// Snapshot of the cup and liquid for one fill level and tilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    /// Fill fraction in `[0, 1]`.
    pub fill_level: f64,
    /// Tilt in `[0, π/2]` radians.
    pub tilt_angle: f64,
    pub center_of_mass: Point3<f64>,
    /// Tilt at which the center of mass passes over the base edge, radians.
    pub critical_tipover_angle: f64,
    pub liquid_volume: f64,
    pub volume_poured: f64,
    pub is_stable: bool,
    /// `critical_tipover_angle - tilt_angle` in degrees. Negative once the
    /// cup is past the tipping point.
    pub stability_margin: f64,
}

impl PhysicsState {
    pub fn tilt_degrees(&self) -> f64 {
        self.tilt_angle.to_degrees()
    }

    pub fn critical_tipover_degrees(&self) -> f64 {
        self.critical_tipover_angle.to_degrees()
    }
}

/// Liquid surface heights above the base, measured at the high and low side
/// of a tilted cup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidSurface {
    pub high_side: f64,
    pub low_side: f64,
    pub spilling: bool,
}

/// Volume of liquid at `fill_level`, `π r² (h · fill)`.
pub fn liquid_volume(cylinder: &CylinderParams, fill_level: f64) -> f64 {
    PI * cylinder.radius * cylinder.radius * (cylinder.height * fill_level)
}

/// Centroid of the upright liquid column, on the axis at half its height.
pub fn liquid_centroid(cylinder: &CylinderParams, fill_level: f64) -> Point3<f64> {
    cylinder.center + Vector3::y() * (cylinder.height * fill_level / 2.0)
}

/// Mass-weighted center of the cup and its liquid.
///
/// Returns `cup_centroid` when the total mass is not positive.
pub fn center_of_mass(
    cup_mass: f64,
    cup_centroid: &Point3<f64>,
    liquid_volume: f64,
    liquid_density: f64,
    liquid_centroid: &Point3<f64>,
) -> Point3<f64> {
    let liquid_mass = liquid_volume * liquid_density;
    let total = cup_mass + liquid_mass;
    if total <= 0.0 {
        return *cup_centroid;
    }
    Point3::from((cup_centroid.coords * cup_mass + liquid_centroid.coords * liquid_mass) / total)
}

/// Tilt angle at which `center_of_mass` sits directly above the base edge.
///
/// A center of mass at or below the base never tips by this test (`π/2`).
/// One already outside the base radius tips at any angle (`0`).
pub fn critical_tipover_angle(
    center_of_mass: &Point3<f64>,
    base_radius: f64,
    base_center: &Point3<f64>,
) -> f64 {
    let dx = center_of_mass.x - base_center.x;
    let dz = center_of_mass.z - base_center.z;
    let horizontal = (dx * dx + dz * dz).sqrt();
    let vertical = center_of_mass.y - base_center.y;

    if vertical <= 0.0 {
        return FRAC_PI_2;
    }
    let effective_radius = base_radius - horizontal;
    if effective_radius <= 0.0 {
        return 0.0;
    }
    effective_radius.atan2(vertical)
}

/// Approximate liquid volume poured over the low side of the rim.
///
/// Zero when upright. Otherwise the liquid height above the rim is
/// `lh·cos(tilt) − (h − lh)·tan(tilt)`, capped by the low-side rim drop
/// `2·r·sin(tilt)`, and the spill is that height times `r²·sin(tilt)`.
pub fn volume_poured(tilt_angle: f64, cylinder: &CylinderParams, fill_level: f64) -> f64 {
    if tilt_angle <= 0.0 {
        return 0.0;
    }
    let r = cylinder.radius;
    let h = cylinder.height;
    let liquid_height = h * fill_level;

    let rim_drop_on_low_side = 2.0 * r * tilt_angle.sin();
    let liquid_height_above_rim =
        liquid_height * tilt_angle.cos() - (h - liquid_height) * tilt_angle.tan();
    if liquid_height_above_rim <= 0.0 {
        return 0.0;
    }

    let spill_height = liquid_height_above_rim.min(rim_drop_on_low_side);
    (spill_height * r * r * tilt_angle.sin()).max(0.0)
}

/// Liquid surface heights when the cup is tilted, assuming the surface
/// pivots about the upright fill line.
pub fn liquid_surface_when_tilted(
    tilt_angle: f64,
    cylinder: &CylinderParams,
    fill_level: f64,
) -> LiquidSurface {
    let h = cylinder.height;
    let liquid_height = h * fill_level;
    let height_change = cylinder.radius * tilt_angle.tan();

    let raised = liquid_height + height_change;
    let lowered = liquid_height - height_change;

    LiquidSurface {
        high_side: raised.min(h),
        low_side: lowered.max(0.0),
        spilling: (raised > h && lowered < h) || lowered <= 0.0,
    }
}

/// Full physics snapshot for one fill level and tilt.
///
/// `fill_level` is clamped to `[0, 1]` and `tilt_angle` to `[0, π/2]`. The
/// empty cup's centroid is on the axis at half its height, and stability is
/// judged against the cylinder's own base center and radius.
pub fn calculate_physics_state(
    cylinder: &CylinderParams,
    fill_level: f64,
    tilt_angle: f64,
    cup_mass: f64,
    liquid_density: f64,
) -> PhysicsState {
    let fill_level = fill_level.clamp(0.0, 1.0);
    let tilt_angle = tilt_angle.clamp(0.0, FRAC_PI_2);

    let cup_centroid = cylinder.center + Vector3::y() * (cylinder.height / 2.0);
    let volume = liquid_volume(cylinder, fill_level);
    let liquid_center = liquid_centroid(cylinder, fill_level);
    let com = center_of_mass(
        cup_mass,
        &cup_centroid,
        volume,
        liquid_density,
        &liquid_center,
    );

    let critical = critical_tipover_angle(&com, cylinder.radius, &cylinder.center);
    let poured = volume_poured(tilt_angle, cylinder, fill_level);

    let state = PhysicsState {
        fill_level,
        tilt_angle,
        center_of_mass: com,
        critical_tipover_angle: critical,
        liquid_volume: volume,
        volume_poured: poured,
        is_stable: tilt_angle < critical,
        stability_margin: (critical - tilt_angle).to_degrees(),
    };

    trace!(
        fill = fill_level,
        tilt_deg = tilt_angle.to_degrees(),
        critical_deg = critical.to_degrees(),
        volume,
        poured,
        "Physics state"
    );

    state
}

/// [`calculate_physics_state`] with masses taken from `params`.
pub fn calculate_physics_state_with(
    cylinder: &CylinderParams,
    fill_level: f64,
    tilt_angle: f64,
    params: &PhysicsParams,
) -> PhysicsState {
    calculate_physics_state(
        cylinder,
        fill_level,
        tilt_angle,
        params.cup_mass,
        params.liquid_density,
    )
}

//! Unit conversions and the cup mass model.

use std::f64::consts::PI;

/// Default wall thickness for [`estimate_cup_mass`], in meters.
pub const DEFAULT_WALL_THICKNESS: f64 = 0.005;

/// Default material density for [`estimate_cup_mass`], ceramic in kg/m³.
pub const DEFAULT_CUP_DENSITY: f64 = 2400.0;

/// Convert a volume in scan units to milliliters.
///
/// `unit_scale` is the length of one scan unit in meters, so a scan in
/// centimeters uses `0.01` and a scan in meters uses `1.0`.
pub fn volume_to_ml(volume: f64, unit_scale: f64) -> f64 {
    volume * 1e6 * unit_scale.powi(3)
}

/// Mass of a cup modeled as a thin cylindrical shell plus a solid base disc.
pub fn estimate_cup_mass(outer_radius: f64, height: f64, wall_thickness: f64, density: f64) -> f64 {
    let inner_radius = outer_radius - wall_thickness;
    let shell_volume = PI * (outer_radius * outer_radius - inner_radius * inner_radius) * height;
    let base_volume = PI * outer_radius * outer_radius * wall_thickness;
    (shell_volume + base_volume) * density
}

/// [`estimate_cup_mass`] for a 5 mm ceramic wall.
pub fn estimate_cup_mass_default(outer_radius: f64, height: f64) -> f64 {
    estimate_cup_mass(
        outer_radius,
        height,
        DEFAULT_WALL_THICKNESS,
        DEFAULT_CUP_DENSITY,
    )
}

//! Closed-form tipover and spill physics for a partially filled cup.
//!
//! This crate takes the interior cylinder found by `cup_scan` and answers
//! what happens as the cup is filled and tilted:
//!
//! - **Center of mass**: Cup and liquid, mass weighted
//! - **Critical tipover angle**: Tilt at which the center of mass passes the base edge
//! - **Spill**: Wedge approximation of the volume poured over the rim
//! - **Builder API**: Fluent configuration and tilt sweeps
//!
//! The physics assumes SI units (meters, kilograms). Use
//! [`CylinderParams::converted`] to bring a scan in other units to meters and
//! [`volume_to_ml`] to report volumes.
//!
//! # Quick Start
//!
//! ```
//! use cup_tipover::{CylinderParams, SimulationBuilder, estimate_cup_mass_default};
//!
//! let cylinder = CylinderParams::at_origin(0.04, 0.1);
//!
//! let state = SimulationBuilder::new(&cylinder)
//!     .fill_level(0.65)
//!     .cup_mass(estimate_cup_mass_default(0.04, 0.1))
//!     .build()
//!     .unwrap();
//!
//! assert!(state.is_stable);
//! assert!((state.liquid_volume - 3.267e-4).abs() < 1e-6);
//! ```
//!
//! # From a Detection
//!
//! ```no_run
//! use cup_scan::{PointCloud, detect_volume};
//! use cup_tipover::{CylinderParams, SimulationBuilder, SweepSummary};
//!
//! let loaded = PointCloud::load("mug.ply").unwrap();
//! let bounds = loaded.cloud.bounds().unwrap();
//! let result = detect_volume(&loaded.cloud.positions(), &bounds).unwrap();
//!
//! // Scan is in centimeters
//! let cylinder = CylinderParams::from(&result.cylinder).converted(0.01);
//! let states = SimulationBuilder::new(&cylinder)
//!     .fill_level(0.8)
//!     .sweep(90)
//!     .unwrap();
//! let summary = SweepSummary::from_states(&states).unwrap();
//! println!("tips over at {:.1}°", summary.critical_tipover_angle.to_degrees());
//! ```
//!
//! # Low-Level API
//!
//! Every quantity is also available as a pure function:
//!
//! ```
//! use cup_tipover::{CylinderParams, liquid_surface_when_tilted, volume_poured};
//!
//! let cylinder = CylinderParams::at_origin(0.04, 0.1);
//! assert_eq!(volume_poured(0.0, &cylinder, 1.0), 0.0);
//!
//! let surface = liquid_surface_when_tilted(0.3, &cylinder, 0.95);
//! assert!(surface.spilling);
//! ```

mod builder;
mod error;
mod params;
mod physics;
mod scan;
mod units;

pub use error::{TipoverError, TipoverErrorCode, TipoverRecoverySuggestion, TipoverResult};

// Builder API (recommended)
pub use builder::{SimulationBuilder, SweepSummary};

// Cylinder parameters
pub use params::{CylinderParams, MIN_DIMENSION};

// Physics
pub use physics::{
    LiquidSurface, PhysicsParams, PhysicsState, calculate_physics_state,
    calculate_physics_state_with, center_of_mass, critical_tipover_angle, liquid_centroid,
    liquid_surface_when_tilted, liquid_volume, volume_poured,
};

// Scans
pub use scan::ScannedCup;

// Units
pub use units::{
    DEFAULT_CUP_DENSITY, DEFAULT_WALL_THICKNESS, estimate_cup_mass, estimate_cup_mass_default,
    volume_to_ml,
};

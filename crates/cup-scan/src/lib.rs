//! Point-cloud ingestion and cup geometry detection.
//!
//! This crate turns a scanned cup into a cylinder describing its interior. It
//! provides:
//!
//! - **Ingestion**: Load PLY and XYZ point clouds, dropping non-finite points
//! - **Circle fitting**: Algebraic least squares and RANSAC over 2D points
//! - **Cylinder fitting**: Project onto the plane orthogonal to an axis and fit
//! - **Volume detection**: Orientation by PCA, rim by height density, interior
//!   cylinder from the rim circle
//!
//! # Units and Scale
//!
//! **The library is unit-agnostic.** Distances come out in the units of the
//! scan. The default RANSAC inlier threshold (`0.05`) and height floor (`0.01`)
//! suit scans in centimeters; for scans in meters or millimeters adjust
//! [`RansacParams::inlier_threshold`] and [`DetectionParams::min_height`].
//!
//! # Coordinate System
//!
//! +Y is up. A cup standing on a table has its axis along +Y and its rim at
//! the largest Y. Horizontal plane coordinates are `(x, z)`.
//!
//! # Quick Start
//!
//! ```no_run
//! use cup_scan::{DetectionParams, PointCloud, detect_volume_with};
//!
//! let loaded = PointCloud::load("mug.ply").unwrap();
//! let points = loaded.cloud.positions();
//! let bounds = loaded.cloud.bounds().unwrap();
//!
//! let params = DetectionParams::default();
//! let mut rng = params.ransac.rng();
//! match detect_volume_with(&points, &bounds, &params, &mut rng) {
//!     Some(result) => println!(
//!         "{} cup, radius {:.2}, interior volume {:.1}",
//!         result.orientation, result.cylinder.radius, result.interior_volume
//!     ),
//!     None => println!("Not enough signal to find the cup interior"),
//! }
//! ```
//!
//! # Reproducibility
//!
//! RANSAC is the only randomized step. Set [`RansacParams::seed`] or pass your
//! own generator to the `*_with_rng` / `detect_volume_with` entry points:
//!
//! ```
//! use cup_scan::{RansacParams, fit_circle_ransac};
//! use nalgebra::Point2;
//!
//! let points: Vec<_> = (0..12)
//!     .map(|i| {
//!         let t = std::f64::consts::TAU * i as f64 / 12.0;
//!         Point2::new(t.cos(), t.sin())
//!     })
//!     .collect();
//! let params = RansacParams::seeded(42);
//! let a = fit_circle_ransac(&points, &params).unwrap();
//! let b = fit_circle_ransac(&points, &params).unwrap();
//! assert_eq!(a, b);
//! ```
//!
//! # Error Handling
//!
//! The fitters report "not enough signal" as `None`. Ingestion returns
//! `ScanResult<T>`, which is `Result<T, ScanError>`.
//!
//! ```
//! use cup_scan::{PointCloud, ScanError};
//!
//! match PointCloud::load("nonexistent.ply") {
//!     Ok(_) => println!("Loaded successfully"),
//!     Err(ScanError::IoRead { path, source }) => {
//!         println!("Failed to read {:?}: {}", path, source);
//!     }
//!     Err(e) => println!("Other error: {} ({})", e, e.code()),
//! }
//! ```
//!
//! # Supported Formats
//!
//! | Format | Extension | Normals | Colors | Notes |
//! |--------|-----------|---------|--------|-------|
//! | PLY    | `.ply`    | ✓       | ✓      | ASCII & binary, `vertex` element |
//! | XYZ    | `.xyz`, `.txt`, `.asc`, `.pts` | ✓ | ✓ | `x y z [nx ny nz] [r g b]`, `#` comments |

mod error;
pub mod tracing_ext;

pub mod circle;
pub mod cylinder;
pub mod detect;
pub mod pointcloud;

pub use error::{RecoverySuggestion, ScanError, ScanErrorCode, ScanResult};

pub use circle::{
    Circle2D, RansacParams, fit_circle_algebraic, fit_circle_ransac, fit_circle_ransac_with_rng,
};
pub use cylinder::{
    CylinderFit, MIN_CYLINDER_POINTS, PlaneFrame, fit_cylinder, fit_cylinder_with_rng,
    fit_vertical_cylinder,
};
pub use detect::{
    DetectionParams, Orientation, OrientationEstimate, VolumeDetectionResult, detect_orientation,
    detect_rim_height, detect_volume, detect_volume_with, principal_axis,
};
pub use pointcloud::{
    Bounds, CloudPoint, LoadReport, LoadedCloud, PointCloud, PointCloudFormat, PointColor,
};

//! Analysis configuration loaded from TOML.
//!
//! Every field is optional in the file; missing values take the library
//! defaults. Command-line flags override file values.
//!
//! ```toml
//! [detection]
//! wall_ratio = 0.9
//! rim_bands = 24
//!
//! [detection.ransac]
//! iterations = 500
//! seed = 7
//!
//! [physics]
//! cup_mass = 0.25
//! liquid_density = 1030.0
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use cup_scan::DetectionParams;
use cup_tipover::PhysicsParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DetectArgs, PhysicsArgs};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detection: DetectionParams,
    pub physics: PhysicsParams,
}

impl AnalysisConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config in {:?}", path))?;
        debug!(?path, "Loaded analysis config");
        Ok(config)
    }

    /// Detection params with command-line overrides applied.
    pub fn detection_params(&self, args: &DetectArgs) -> DetectionParams {
        let mut params = self.detection.clone();
        if args.thin_walled {
            params.wall_ratio = DetectionParams::thin_walled().wall_ratio;
        }
        if let Some(seed) = args.seed {
            params.ransac.seed = Some(seed);
        }
        if let Some(iterations) = args.iterations {
            params.ransac.iterations = iterations;
        }
        if let Some(threshold) = args.threshold {
            params.ransac.inlier_threshold = threshold;
        }
        params
    }

    /// Physics params with command-line overrides applied.
    pub fn physics_params(&self, args: &PhysicsArgs) -> PhysicsParams {
        let mut params = self.physics;
        if let Some(mass) = args.cup_mass {
            params.cup_mass = mass;
        }
        if let Some(density) = args.density {
            params.liquid_density = density;
        }
        params
    }
}

//! Cup dimensions taken straight from a scan file.
//!
//! Ties ingestion and volume detection to [`CylinderParams`], so every
//! failure on the way surfaces as [`TipoverError::Scan`].

use std::path::Path;

use cup_scan::tracing_ext::{log_bounds, log_cloud_stats};
use cup_scan::{DetectionParams, PointCloud, ScanError, VolumeDetectionResult, detect_volume_with};
use tracing::info;

use crate::error::TipoverResult;
use crate::params::CylinderParams;

/// A loaded scan with its detected interior.
#[derive(Debug, Clone)]
pub struct ScannedCup {
    /// Finite points the detection ran on.
    pub point_count: usize,
    pub detection: VolumeDetectionResult,
    /// Interior cylinder in scan units.
    pub cylinder: CylinderParams,
}

impl ScannedCup {
    /// Load `path` and detect the cup interior.
    ///
    /// The RANSAC generator comes from `params.ransac`, so a seeded config
    /// gives the same cylinder every run.
    ///
    /// # Errors
    ///
    /// [`TipoverError::Scan`](crate::TipoverError::Scan) wrapping the load
    /// error, or [`ScanError::DetectionUnavailable`] when the cloud is too
    /// sparse or degenerate for detection.
    pub fn load(path: impl AsRef<Path>, params: &DetectionParams) -> TipoverResult<Self> {
        let path = path.as_ref();
        let loaded = PointCloud::load(path)?;
        log_cloud_stats(&loaded.cloud, "scan");

        let points = loaded.cloud.positions();
        let bounds = loaded
            .cloud
            .bounds()
            .ok_or_else(|| ScanError::empty_cloud("no points to bound"))?;
        log_bounds(&bounds, "scan");

        let mut rng = params.ransac.rng();
        let detection = detect_volume_with(&points, &bounds, params, &mut rng)
            .ok_or_else(|| ScanError::detection_unavailable(points.len(), params.min_points))?;

        info!(
            points = points.len(),
            seed = ?params.ransac.seed,
            orientation = %detection.orientation,
            "Detection finished"
        );
        Ok(Self {
            point_count: points.len(),
            cylinder: CylinderParams::from(&detection.cylinder),
            detection,
        })
    }
}

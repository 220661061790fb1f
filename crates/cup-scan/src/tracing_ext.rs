//! Tracing extensions for scan fitting and detection.
//!
//! Structured logging and timing for point-cloud operations, built on the
//! `tracing` ecosystem. Nothing here installs a subscriber; applications do
//! that themselves:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=cup_scan=debug to see fit failures and rim statistics
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: Dropped points, detector fallbacks
//! - **INFO**: Load and detection summaries, timing
//! - **DEBUG**: Fit failures and intermediate values
//! - **TRACE**: Per-trial RANSAC scores

use crate::pointcloud::{Bounds, PointCloud};
use std::time::Instant;
use tracing::{Span, debug, info, trace};

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use cup_scan::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("scan_operation", operation = name);
        debug!(target: "cup_scan::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer that also records the number of input points.
    pub fn with_context(name: &'static str, point_count: usize) -> Self {
        let span = tracing::info_span!("scan_operation", operation = name, points = point_count);
        debug!(
            target: "cup_scan::timing",
            operation = name,
            points = point_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "cup_scan::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log point-cloud statistics at debug level.
pub fn log_cloud_stats(cloud: &PointCloud, context: &str) {
    let Some(bounds) = cloud.bounds() else {
        debug!(
            target: "cup_scan::cloud_state",
            context = context,
            points = 0,
            "Point cloud state"
        );
        return;
    };
    let dims = bounds.extent();

    debug!(
        target: "cup_scan::cloud_state",
        context = context,
        points = cloud.len(),
        dimensions = format!("{:.3} x {:.3} x {:.3}", dims.x, dims.y, dims.z),
        has_normals = cloud.has_normals(),
        has_colors = cloud.has_colors(),
        "Point cloud state"
    );
}

/// Log bounds at trace level.
pub fn log_bounds(bounds: &Bounds, context: &str) {
    trace!(
        target: "cup_scan::cloud_state",
        context = context,
        min_x = format!("{:.4}", bounds.min.x),
        min_y = format!("{:.4}", bounds.min.y),
        min_z = format!("{:.4}", bounds.min.z),
        max_x = format!("{:.4}", bounds.max.x),
        max_y = format!("{:.4}", bounds.max.y),
        max_z = format!("{:.4}", bounds.max.z),
        "Bounds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_log_cloud_stats() {
        // Just verify it doesn't panic
        log_cloud_stats(&PointCloud::new(), "empty");

        let cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
        ]);
        log_cloud_stats(&cloud, "two points");
        if let Some(bounds) = cloud.bounds() {
            log_bounds(&bounds, "two points");
        }
    }
}

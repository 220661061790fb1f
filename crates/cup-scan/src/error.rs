//! Error types for point-cloud ingestion and detection with rich diagnostics.
//!
//! The numerical core never errors: a fit that lacks data or hits degenerate
//! geometry returns `None`. These errors live at the boundary, where a file is
//! read or where a caller has to turn "no detection" into a message.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `SCAN-XXXX`:
//! - `SCAN-1xxx`: I/O and parse errors
//! - `SCAN-2xxx`: Point data errors
//! - `SCAN-3xxx`: Detection errors
//! - `SCAN-4xxx`: Format errors
//!
//! # Example
//!
//! ```rust,ignore
//! use cup_scan::{ScanError, ScanErrorCode};
//!
//! let err = ScanError::detection_unavailable(42, 100);
//! println!("Error code: {}", err.code()); // SCAN-3001
//! println!("Recovery: {}", err.recovery_suggestion());
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Machine-readable error codes for scan operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanErrorCode {
    /// SCAN-1001: Failed to read file
    IoRead = 1001,
    /// SCAN-1002: Failed to parse file contents
    ParseError = 1002,

    /// SCAN-2001: No usable points after loading
    EmptyCloud = 2001,

    /// SCAN-3001: Not enough signal to infer a cup interior
    DetectionUnavailable = 3001,

    /// SCAN-4001: Unsupported file format
    UnsupportedFormat = 4001,
}

impl ScanErrorCode {
    /// Returns the error code as a string in the format `SCAN-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanErrorCode::IoRead => "SCAN-1001",
            ScanErrorCode::ParseError => "SCAN-1002",
            ScanErrorCode::EmptyCloud => "SCAN-2001",
            ScanErrorCode::DetectionUnavailable => "SCAN-3001",
            ScanErrorCode::UnsupportedFormat => "SCAN-4001",
        }
    }
}

impl std::fmt::Display for ScanErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for scan errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the scan from the capture software.
    ReexportFile { format: Option<String> },
    /// Use a different file format.
    UseDifferentFormat { suggested: Vec<String> },
    /// Check the source file.
    CheckSource { checks: Vec<String> },
    /// Capture the object again with better coverage.
    RescanObject { min_points: usize },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(f, "Try re-exporting the scan as {}", fmt)
                } else {
                    write!(f, "Try re-exporting the scan from the capture software")
                }
            }
            RecoverySuggestion::UseDifferentFormat { suggested } => {
                write!(f, "Try using a different format: {}", suggested.join(", "))
            }
            RecoverySuggestion::CheckSource { checks } => {
                write!(f, "Check the source file for: {}", checks.join(", "))
            }
            RecoverySuggestion::RescanObject { min_points } => {
                write!(
                    f,
                    "Provide a denser scan of the cup (at least {} points covering the rim)",
                    min_points
                )
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
        }
    }
}

/// Errors that can occur while loading point clouds or reporting detections.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// Error reading from a file.
    #[error("failed to read point cloud from {path}")]
    #[diagnostic(
        code(scan::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing file contents.
    #[error("failed to parse point cloud from {path}: {details}")]
    #[diagnostic(
        code(scan::parse::error),
        help("The file may be corrupted or use an unsupported PLY variant. Try re-exporting it.")
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported point cloud format: {extension:?}")]
    #[diagnostic(
        code(scan::format::unsupported),
        help("Supported formats: PLY (.ply), XYZ text (.xyz, .txt, .asc, .pts)")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// No finite points survived loading.
    #[error("point cloud is empty: {details}")]
    #[diagnostic(
        code(scan::points::empty),
        help("The file must contain at least one vertex with finite coordinates.")
    )]
    EmptyCloud { details: String },

    /// The detector found no usable cup interior.
    #[error("volume detection unavailable for {point_count} points (need at least {required})")]
    #[diagnostic(
        code(scan::detect::unavailable),
        help("Load a different scan. The cup wall and rim must be sampled densely enough to fit a circle.")
    )]
    DetectionUnavailable { point_count: usize, required: usize },
}

impl ScanError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ScanErrorCode {
        match self {
            ScanError::IoRead { .. } => ScanErrorCode::IoRead,
            ScanError::ParseError { .. } => ScanErrorCode::ParseError,
            ScanError::UnsupportedFormat { .. } => ScanErrorCode::UnsupportedFormat,
            ScanError::EmptyCloud { .. } => ScanErrorCode::EmptyCloud,
            ScanError::DetectionUnavailable { .. } => ScanErrorCode::DetectionUnavailable,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            ScanError::IoRead { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            ScanError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some("ASCII or binary little-endian PLY".into()),
            },
            ScanError::UnsupportedFormat { .. } => RecoverySuggestion::UseDifferentFormat {
                suggested: vec!["PLY".into(), "XYZ".into()],
            },
            ScanError::EmptyCloud { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["vertex element present".into(), "finite coordinates".into()],
            },
            ScanError::DetectionUnavailable {
                point_count,
                required,
            } => {
                if point_count < required {
                    RecoverySuggestion::RescanObject {
                        min_points: *required,
                    }
                } else {
                    RecoverySuggestion::AdjustParameters {
                        parameters: vec![
                            ("ransac.iterations".into(), "try a higher value".into()),
                            ("ransac.inlier_threshold".into(), "match the scan units".into()),
                        ],
                    }
                }
            }
        }
    }

    /// Returns the file path involved in this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ScanError::IoRead { path, .. } | ScanError::ParseError { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        ScanError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: Option<String>) -> Self {
        ScanError::UnsupportedFormat { extension }
    }

    /// Create an EmptyCloud error.
    pub fn empty_cloud(details: impl Into<String>) -> Self {
        ScanError::EmptyCloud {
            details: details.into(),
        }
    }

    /// Create a DetectionUnavailable error.
    pub fn detection_unavailable(point_count: usize, required: usize) -> Self {
        ScanError::DetectionUnavailable {
            point_count,
            required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ScanError::detection_unavailable(42, 100);
        assert_eq!(err.code(), ScanErrorCode::DetectionUnavailable);
        assert_eq!(err.code().as_str(), "SCAN-3001");
    }

    #[test]
    fn test_sparse_scan_suggests_rescan() {
        let err = ScanError::detection_unavailable(42, 100);
        match err.recovery_suggestion() {
            RecoverySuggestion::RescanObject { min_points } => assert_eq!(min_points, 100),
            other => panic!("Expected RescanObject suggestion, got {:?}", other),
        }
    }

    #[test]
    fn test_dense_scan_suggests_parameters() {
        let err = ScanError::detection_unavailable(5000, 100);
        assert!(matches!(
            err.recovery_suggestion(),
            RecoverySuggestion::AdjustParameters { .. }
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::detection_unavailable(42, 100);
        let display = format!("{}", err);
        assert!(display.contains("42 points"));
        assert!(display.contains("at least 100"));
    }

    #[test]
    fn test_path_is_reported_for_parse_errors() {
        let err = ScanError::parse_error("/tmp/cup.ply", "bad header");
        assert_eq!(err.path(), Some(&PathBuf::from("/tmp/cup.ply")));
        assert_eq!(err.code().as_str(), "SCAN-1002");
    }
}

// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler. This is a false positive in newer Rust versions.
#![allow(unused_assignments)]

//! Error types for tipover simulation with rich diagnostics.
//!
//! Physics functions themselves are total over finite inputs. Errors only
//! arise at the boundary: invalid cylinder parameters handed to the builder,
//! or a scan error surfaced while producing those parameters.

use cup_scan::ScanError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for tipover operations.
pub type TipoverResult<T> = Result<T, TipoverError>;

/// Machine-readable error codes for tipover operations.
///
/// Codes follow the pattern `TIPOVER-XXXX` where:
/// - 1xxx = Input validation errors
/// - 2xxx = Upstream scan errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipoverErrorCode {
    /// TIPOVER-1001: Invalid cylinder or physics parameters
    InvalidParams = 1001,
    /// TIPOVER-2001: Scan ingestion or detection failed
    ScanFailed = 2001,
}

impl TipoverErrorCode {
    /// Returns the error code as a string in the format `TIPOVER-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoverErrorCode::InvalidParams => "TIPOVER-1001",
            TipoverErrorCode::ScanFailed => "TIPOVER-2001",
        }
    }
}

impl std::fmt::Display for TipoverErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for tipover errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TipoverRecoverySuggestion {
    /// Clamp the dimension to the minimum positive floor.
    ClampDimension { param: String, minimum: f64 },
    /// Set a non-dimension parameter to an accepted value.
    AdjustSetting {
        param: String,
        requirement: &'static str,
    },
    /// Fix the underlying scan first.
    FixScan,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for TipoverRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TipoverRecoverySuggestion::ClampDimension { param, minimum } => {
                write!(f, "Use a finite {} of at least {}", param, minimum)
            }
            TipoverRecoverySuggestion::AdjustSetting { param, requirement } => {
                write!(f, "Set {} to {}", param, requirement)
            }
            TipoverRecoverySuggestion::FixScan => {
                write!(f, "Resolve the scan error, then rerun the simulation")
            }
            TipoverRecoverySuggestion::None => {
                write!(f, "No specific suggestion available")
            }
        }
    }
}

/// Errors that can occur while preparing a tipover simulation.
#[derive(Debug, Error, Diagnostic)]
pub enum TipoverError {
    /// A cylinder or physics parameter is out of range.
    #[error("invalid parameter {param} = {value}: {details}")]
    #[diagnostic(
        code(tipover::params::invalid),
        help("Radius and height must be finite and positive; `CylinderParams::clamped` floors them. Other settings must be numbers in range.")
    )]
    InvalidParams {
        param: String,
        value: f64,
        details: String,
    },

    /// Underlying scan error.
    #[error("scan failed: {0}")]
    #[diagnostic(code(tipover::scan::error))]
    Scan(#[from] ScanError),
}

impl TipoverError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> TipoverErrorCode {
        match self {
            TipoverError::InvalidParams { .. } => TipoverErrorCode::InvalidParams,
            TipoverError::Scan(_) => TipoverErrorCode::ScanFailed,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> TipoverRecoverySuggestion {
        match self {
            TipoverError::InvalidParams { param, .. } => match param.as_str() {
                "radius" | "height" => TipoverRecoverySuggestion::ClampDimension {
                    param: param.clone(),
                    minimum: crate::params::MIN_DIMENSION,
                },
                other => TipoverRecoverySuggestion::AdjustSetting {
                    param: other.to_string(),
                    requirement: match other {
                        "steps" => "at least 1",
                        "fill_level" => "a number between 0 and 1",
                        "center" => "finite coordinates",
                        _ => "a finite number",
                    },
                },
            },
            TipoverError::Scan(_) => TipoverRecoverySuggestion::FixScan,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param(param: impl Into<String>, value: f64, details: impl Into<String>) -> Self {
        TipoverError::InvalidParams {
            param: param.into(),
            value,
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TipoverError::invalid_param("radius", -1.0, "must be positive");
        assert_eq!(err.code(), TipoverErrorCode::InvalidParams);
        assert_eq!(err.code().as_str(), "TIPOVER-1001");
    }

    #[test]
    fn test_error_display() {
        let err = TipoverError::invalid_param("height", 0.0, "must be positive");
        let display = format!("{}", err);
        assert!(display.contains("height"));
        assert!(display.contains("must be positive"));
    }

    #[test]
    fn test_dimension_suggestion() {
        let err = TipoverError::invalid_param("radius", 0.0, "must be positive");
        match err.recovery_suggestion() {
            TipoverRecoverySuggestion::ClampDimension { param, minimum } => {
                assert_eq!(param, "radius");
                assert_eq!(minimum, 0.01);
            }
            other => panic!("Expected ClampDimension, got {:?}", other),
        }
    }

    #[test]
    fn test_setting_suggestions() {
        let steps = TipoverError::invalid_param("steps", 0.0, "a sweep needs at least one step");
        assert_eq!(
            steps.recovery_suggestion(),
            TipoverRecoverySuggestion::AdjustSetting {
                param: "steps".to_string(),
                requirement: "at least 1",
            }
        );
        assert_eq!(steps.recovery_suggestion().to_string(), "Set steps to at least 1");

        let density = TipoverError::invalid_param("liquid_density", f64::NAN, "must be a number");
        assert_eq!(
            density.recovery_suggestion().to_string(),
            "Set liquid_density to a finite number"
        );

        let fill = TipoverError::invalid_param("fill_level", f64::NAN, "must be a number");
        assert!(!matches!(
            fill.recovery_suggestion(),
            TipoverRecoverySuggestion::ClampDimension { .. }
        ));
    }

    #[test]
    fn test_from_scan_error() {
        let scan_err = ScanError::empty_cloud("no finite points");
        let err: TipoverError = scan_err.into();
        assert!(matches!(err, TipoverError::Scan(_)));
        assert_eq!(err.code().as_str(), "TIPOVER-2001");
        assert_eq!(err.recovery_suggestion(), TipoverRecoverySuggestion::FixScan);
    }
}

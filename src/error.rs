//! Unified error hierarchy for paceplan
//!
//! Calculation failures, zone lookups and malformed input each get their own
//! enum so callers can decide whether to skip, isolate or propagate.

use thiserror::Error;

use crate::zones::ZoneError;

/// Top-level error type for all paceplan operations
#[derive(Debug, Error)]
pub enum PlanError {
    /// Pace or VDOT computation failed
    #[error("Calculation error: {0}")]
    Pace(#[from] PaceError),

    /// Unknown intensity zone
    #[error("Zone error: {0}")]
    Zone(#[from] ZoneError),

    /// Malformed or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Plan file or output serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Numeric failures of the pace model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaceError {
    #[error("time must be greater than zero, got {0} minutes")]
    NonPositiveTime(f64),

    #[error("distance must be greater than zero, got {0} m")]
    NonPositiveDistance(f64),

    #[error("intensity {0}% is outside (0, 200]")]
    IntensityOutOfRange(f64),

    #[error("no real velocity for VDOT {vdot} at {intensity}%")]
    NegativeDiscriminant { vdot: f64, intensity: f64 },

    #[error("non-positive velocity {0} m/min")]
    NonPositiveVelocity(f64),
}

/// Caller-correctable input problems
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Field is not a number
    #[error("field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Time string is not MM:SS or HH:MM:SS
    #[error("invalid time '{0}', expected MM:SS or HH:MM:SS")]
    InvalidTime(String),

    /// Value parsed but violates a range constraint
    #[error("field '{field}' out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    /// Workout structure is inconsistent
    #[error("invalid workout structure: {0}")]
    Structure(String),
}

/// Result type alias for paceplan operations
pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlanError::InvalidInput(_) => ErrorSeverity::Warning,
            PlanError::Pace(_) => ErrorSeverity::Warning,
            PlanError::Zone(_) => ErrorSeverity::Error,
            PlanError::Io(_) | PlanError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlanError::Pace(PaceError::NonPositiveTime(_)) => {
                "Calculation failed. Ensure time is greater than zero.".to_string()
            }
            PlanError::Pace(_) => "Pace calculation failed. Check your inputs.".to_string(),
            PlanError::Zone(ZoneError::UnknownZone(name)) => format!(
                "Invalid intensity zone '{}'. Must be one of: {}",
                name,
                crate::zones::IntensityZone::names().join(", ")
            ),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Input problem the caller can fix
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = PlanError::from(InputError::InvalidTime("abc".to_string()));
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = PlanError::from(ZoneError::UnknownZone("Tempo".to_string()));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_user_messages() {
        let err = PlanError::from(PaceError::NonPositiveTime(0.0));
        assert!(err.user_message().contains("greater than zero"));

        let err = PlanError::from(ZoneError::UnknownZone("Tempo".to_string()));
        let message = err.user_message();
        assert!(message.contains("Tempo"));
        assert!(message.contains("Threshold"));
    }
}

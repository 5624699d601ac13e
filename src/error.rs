// src/error.rs
use std::fmt;
use thiserror::Error;

/// Which closed-form evaluation broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainErrorKind {
    /// The square root in a closed-form control has a negative argument.
    NegativeDiscriminant,
    /// A closed-form control was evaluated at (or past) the horizon, where
    /// it divides by `T - t = 0`.
    DivisionSingularity,
    /// The state lies above the absorption bound `Y_max`.
    InfeasibleState,
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainErrorKind::NegativeDiscriminant => "negative discriminant",
            DomainErrorKind::DivisionSingularity => "division singularity",
            DomainErrorKind::InfeasibleState => "infeasible state",
        };
        f.write_str(name)
    }
}

/// A numeric edge case raised at the closed-form evaluator boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{kind} at (t={t}, y={y})")]
pub struct DomainError {
    pub kind: DomainErrorKind,
    pub t: f64,
    pub y: f64,
}

impl DomainError {
    pub fn new(kind: DomainErrorKind, t: f64, y: f64) -> Self {
        Self { kind, t, y }
    }
}

/// Error type for the hjb-control library
#[derive(Error, Debug)]
pub enum ControlError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration (resolution, scenario selection, canvas)
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Closed-form evaluation left its domain under the fail-fast policy
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Renderer could not write its output
    #[error("Render error: {0}")]
    Render(#[from] std::io::Error),
}

impl ControlError {
    /// True for the variants that reject a scenario before any grid is built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ControlError::InvalidParameters { .. } | ControlError::InvalidConfiguration { .. }
        )
    }
}

/// Result type alias for hjb-control operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Validation utilities
pub mod validation {
    use super::{ControlError, ControlResult};

    /// Validate that a parameter is finite and positive
    pub fn validate_positive(name: &str, value: f64) -> ControlResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(ControlError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> ControlResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(ControlError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> ControlResult<()> {
        if !value.is_finite() {
            Err(ControlError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a grid/sample count against a lower bound and a hard ceiling
    pub fn validate_resolution(field: &str, count: usize, min: usize) -> ControlResult<()> {
        if count < min {
            Err(ControlError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!("must be at least {}", min),
            })
        } else if count > 10_000_000 {
            Err(ControlError::InvalidConfiguration {
                field: field.to_string(),
                reason: "exceeds maximum allowed (10,000,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("gamma", 0.5).is_ok());
        assert!(validate_positive("gamma", 0.0).is_err());
        assert!(validate_positive("gamma", -0.1).is_err());
        assert!(validate_positive("gamma", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("sigma", 0.0).is_ok());
        assert!(validate_non_negative("sigma", -1e-9).is_err());
        assert!(validate_non_negative("sigma", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_resolution() {
        assert!(validate_resolution("samples", 1000, 2).is_ok());
        assert!(validate_resolution("samples", 1, 2).is_err());
        assert!(validate_resolution("samples", 20_000_000, 2).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = ControlError::InvalidParameters {
            parameter: "m".to_string(),
            value: -1.0,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("'m'"));
        assert!(display.contains("-1"));
        assert!(display.contains("positive"));
        assert!(error.is_configuration());
    }

    #[test]
    fn test_domain_error_display() {
        let error: ControlError =
            DomainError::new(DomainErrorKind::NegativeDiscriminant, 0.25, 0.5).into();

        let display = format!("{}", error);
        assert!(display.contains("negative discriminant"));
        assert!(display.contains("t=0.25"));
        assert!(!error.is_configuration());
    }
}

// src/models/params.rs
//! Scenario parameters for the retirement control problem
//!
//! # Mathematical Framework
//!
//! The state `y` is the value-equivalent of accumulated wealth under an
//! exponential utility with absolute risk aversion `γ`:
//! ```text
//! U_A(x) = (1 - e^(-γx)) / γ
//! ```
//!
//! The absorption boundary `M` caps the state at `Y_max = U_A(M)`, and the
//! agent is indifferent to retiring at
//! ```text
//! y_R = (1 - κ) / γ
//! ```
//! Retirement is an active regime only when `y_R < Y_max`.

use crate::error::{validation::*, ControlResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioParameters {
    pub gamma: f64,   // Risk aversion
    pub kappa: f64,   // Retirement/cost parameter
    pub k: f64,       // Quadratic cost coefficient
    pub horizon: f64, // Time horizon T
    pub m: f64,       // Absorption bound M
    pub sigma: f64,   // Volatility
}

impl ScenarioParameters {
    pub fn new(gamma: f64, kappa: f64, k: f64, horizon: f64, m: f64, sigma: f64) -> Self {
        Self {
            gamma,
            kappa,
            k,
            horizon,
            m,
            sigma,
        }
    }

    /// Build from the `(γ, κ, k, T, M, σ)` tuple used by the scenario catalog.
    pub const fn from_tuple(values: [f64; 6]) -> Self {
        Self {
            gamma: values[0],
            kappa: values[1],
            k: values[2],
            horizon: values[3],
            m: values[4],
            sigma: values[5],
        }
    }

    /// Reject degenerate parameters before any grid is built.
    pub fn validate(&self) -> ControlResult<()> {
        validate_positive("gamma", self.gamma)?;
        validate_finite("kappa", self.kappa)?;
        validate_positive("k", self.k)?;
        validate_positive("horizon", self.horizon)?;
        validate_positive("m", self.m)?;
        validate_non_negative("sigma", self.sigma)?;
        validate_positive("y_max", self.y_max())?;
        Ok(())
    }

    /// Utility of an absorbed amount `x`: `(1 - e^(-γx)) / γ`.
    pub fn utility_of_absorption(&self, x: f64) -> f64 {
        (1.0 - (-self.gamma * x).exp()) / self.gamma
    }

    /// Upper end of the state axis, `U_A(M)`.
    pub fn y_max(&self) -> f64 {
        self.utility_of_absorption(self.m)
    }

    /// State at which retiring and continuing are equally good: `(1 - κ)/γ`.
    pub fn retirement_threshold(&self) -> f64 {
        (1.0 - self.kappa) / self.gamma
    }

    /// Retirement is active iff the indifference threshold lies strictly
    /// below the absorption bound.
    pub fn does_retire(&self) -> bool {
        self.retirement_threshold() < self.y_max()
    }

    pub fn retirement(&self) -> RetirementClassification {
        RetirementClassification {
            threshold: self.retirement_threshold(),
            absorption_bound: self.y_max(),
            does_retire: self.does_retire(),
        }
    }
}

/// Outcome of comparing the retirement threshold with the absorption bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetirementClassification {
    pub threshold: f64,
    pub absorption_bound: f64,
    pub does_retire: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_y_max() {
        let params = ScenarioParameters::new(0.5, 0.7, 0.8, 1.0, 5.0, 0.5);
        assert_relative_eq!(params.y_max(), (1.0 - (-2.5f64).exp()) / 0.5, epsilon = 1e-15);
        assert!(params.y_max() > 0.0 && params.y_max().is_finite());
    }

    #[test]
    fn test_degenerate_parameters_rejected() {
        let base = ScenarioParameters::new(1.0, 0.3, 1.0, 1.0, 1.0, 0.3);
        assert!(base.validate().is_ok());
        assert!(ScenarioParameters { m: 0.0, ..base }.validate().is_err());
        assert!(ScenarioParameters { horizon: -1.0, ..base }.validate().is_err());
        assert!(ScenarioParameters { gamma: 0.0, ..base }.validate().is_err());
        assert!(ScenarioParameters { k: 0.0, ..base }.validate().is_err());
        assert!(ScenarioParameters { sigma: -0.1, ..base }.validate().is_err());
        assert!(ScenarioParameters { kappa: f64::NAN, ..base }.validate().is_err());
    }

    #[test]
    fn test_retirement_classification() {
        let no_retire = ScenarioParameters::new(1.0, 0.3, 1.0, 1.0, 1.0, 0.3);
        let class = no_retire.retirement();
        assert_relative_eq!(class.threshold, 0.7, epsilon = 1e-15);
        assert_relative_eq!(class.absorption_bound, 1.0 - (-1.0f64).exp(), epsilon = 1e-15);
        assert!(!class.does_retire);

        let retire = ScenarioParameters::new(0.3, 0.3, 0.8, 1.0, 10.0, 0.2);
        assert!(retire.does_retire());
    }
}

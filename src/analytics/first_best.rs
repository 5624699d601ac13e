// src/analytics/first_best.rs
//! Closed-form first-best solution of the retirement control problem
//!
//! # Mathematical Foundation
//!
//! Under full commitment the value function solves an ODE in `t` for every
//! fixed state `y`. For a constant control `α` and `τ = T - t`:
//! ```text
//! F(t, y; α) = α τ + (1/γ) ln(1 - γ y - γ τ (k α²/2 + κ α))
//! ```
//! with the terminal condition `u(T, y) = (1/γ) ln(1 - γ y)`.
//!
//! Two controls compete:
//! ```text
//! α*(t, y) = [-(k + κγτ) + √((k + κγτ)² - 2kγτ(γy - 1 + κ))] / (γτk)
//! α^M(t, y) = [-κτ + √(κ²τ² - 2kτ(y - U_A(M)))] / (kτ)
//! ```
//! `α*` is the unconstrained optimum, `α^M` keeps the state below the
//! absorption boundary. Below the retirement threshold the tighter of the two
//! binds; above it the control is zero.

use crate::error::{ControlError, ControlResult, DomainError, DomainErrorKind};
use crate::grid::Grid;
use crate::math_utils::scaled_count;
use crate::models::ScenarioParameters;
use ndarray::Array2;
use tracing::{debug, info, warn};

/// Time samples per unit of horizon on the first-best grid.
pub const TIME_SAMPLES_PER_UNIT: f64 = 500.0;
/// State samples per unit of `Y_max` on the first-best grid.
pub const STATE_SAMPLES_PER_UNIT: f64 = 1000.0;
pub const MIN_STATE_SAMPLES: usize = 50;
/// Offset keeping the last time sample off the singular terminal point.
pub const TERMINAL_OFFSET: f64 = 1e-5;
/// Two controls closer than this are treated as equal on the crossing curve.
pub const CROSSING_TOLERANCE: f64 = 1e-3;

/// How the evaluator treats numeric edge cases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DomainPolicy {
    /// NaN and `-∞` flow through as field values.
    #[default]
    Propagate,
    /// The first edge case aborts evaluation with a [`DomainError`].
    FailFast,
}

/// A point where `α*` and `α^M` coincide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossingPoint {
    pub t: f64,
    pub y: f64,
}

#[derive(Clone, Debug)]
pub struct FirstBestSolution {
    pub grid: Grid,
    pub value: Array2<f64>,
    /// First state, per time sample, where the two closed-form controls meet.
    pub crossing: Vec<CrossingPoint>,
}

#[derive(Clone, Copy, Debug)]
pub struct FirstBestEvaluator {
    params: ScenarioParameters,
    policy: DomainPolicy,
    y_max: f64,
}

impl FirstBestEvaluator {
    pub fn new(params: ScenarioParameters, policy: DomainPolicy) -> ControlResult<Self> {
        params.validate()?;
        // the time axis ends at T - 1e-5 and must not run backwards
        if params.horizon <= TERMINAL_OFFSET {
            return Err(ControlError::InvalidParameters {
                parameter: "horizon".to_string(),
                value: params.horizon,
                constraint: format!("must exceed the terminal offset {}", TERMINAL_OFFSET),
            });
        }
        Ok(Self {
            params,
            policy,
            y_max: params.y_max(),
        })
    }

    pub fn params(&self) -> &ScenarioParameters {
        &self.params
    }

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// `U_A(x) = (1 - e^(-γx)) / γ`
    pub fn utility_of_absorption(&self, x: f64) -> f64 {
        self.params.utility_of_absorption(x)
    }

    pub fn is_within_absorption_bound(&self, y: f64) -> bool {
        y <= self.y_max
    }

    pub fn is_below_retirement_threshold(&self, y: f64) -> bool {
        y <= self.params.retirement_threshold()
    }

    /// Discriminant of the quadratic whose root is `α*`.
    pub fn unconstrained_discriminant(&self, t: f64, y: f64) -> f64 {
        let ScenarioParameters {
            gamma, kappa, k, ..
        } = self.params;
        let tau = self.params.horizon - t;
        let b = k + kappa * gamma * tau;
        b * b - 2.0 * k * gamma * tau * (gamma * y - 1.0 + kappa)
    }

    /// Discriminant of the quadratic whose root is `α^M`.
    pub fn boundary_discriminant(&self, t: f64, y: f64) -> f64 {
        let ScenarioParameters { kappa, k, .. } = self.params;
        let tau = self.params.horizon - t;
        kappa * kappa * tau * tau - 2.0 * k * tau * (y - self.y_max)
    }

    /// Unconstrained optimal control `α*(t, y)`, assuming full continuation.
    ///
    /// NaN when the discriminant is negative; non-finite at `t = T`.
    pub fn optimal_control_unconstrained(&self, t: f64, y: f64) -> f64 {
        let ScenarioParameters {
            gamma, kappa, k, ..
        } = self.params;
        let tau = self.params.horizon - t;
        let numerator =
            -(k + kappa * gamma * tau) + self.unconstrained_discriminant(t, y).sqrt();
        numerator / (gamma * tau * k)
    }

    /// Control `α^M(t, y)` that keeps the state below the absorption boundary.
    ///
    /// NaN when the discriminant is negative; non-finite at `t = T`.
    pub fn optimal_control_at_absorption_boundary(&self, t: f64, y: f64) -> f64 {
        let ScenarioParameters { kappa, k, .. } = self.params;
        let tau = self.params.horizon - t;
        let numerator = -kappa * tau + self.boundary_discriminant(t, y).sqrt();
        numerator / (k * tau)
    }

    pub fn checked_optimal_control_unconstrained(
        &self,
        t: f64,
        y: f64,
    ) -> Result<f64, DomainError> {
        self.check_control_domain(t, y, self.unconstrained_discriminant(t, y))?;
        Ok(self.optimal_control_unconstrained(t, y))
    }

    pub fn checked_optimal_control_at_absorption_boundary(
        &self,
        t: f64,
        y: f64,
    ) -> Result<f64, DomainError> {
        self.check_control_domain(t, y, self.boundary_discriminant(t, y))?;
        Ok(self.optimal_control_at_absorption_boundary(t, y))
    }

    fn check_control_domain(&self, t: f64, y: f64, discriminant: f64) -> Result<(), DomainError> {
        if self.params.horizon - t <= 0.0 {
            return Err(DomainError::new(DomainErrorKind::DivisionSingularity, t, y));
        }
        if discriminant < 0.0 || discriminant.is_nan() {
            return Err(DomainError::new(DomainErrorKind::NegativeDiscriminant, t, y));
        }
        Ok(())
    }

    /// `F(t, y; α)` before the horizon, the terminal condition at it.
    pub fn value_function(&self, t: f64, y: f64, control: f64) -> f64 {
        let ScenarioParameters {
            gamma,
            kappa,
            k,
            horizon,
            ..
        } = self.params;
        if t < horizon {
            let tau = horizon - t;
            let running = control * tau;
            let cost = k / 2.0 * control * control + kappa * control;
            running + (1.0 / gamma) * (1.0 - gamma * y - gamma * tau * cost).ln()
        } else {
            1.0 / gamma * (1.0 - gamma * y).ln()
        }
    }

    /// First-best value at a single point.
    ///
    /// Below both the absorption bound and the retirement threshold the
    /// tighter control binds: `α^M` when it is strictly smaller, otherwise
    /// `α*` (so a NaN `α*` is carried through). Between threshold and bound the
    /// control is zero. Above the bound the point is infeasible.
    pub fn evaluate_point(&self, t: f64, y: f64) -> Result<f64, DomainError> {
        if !self.is_within_absorption_bound(y) {
            return match self.policy {
                DomainPolicy::Propagate => Ok(f64::NEG_INFINITY),
                DomainPolicy::FailFast => {
                    Err(DomainError::new(DomainErrorKind::InfeasibleState, t, y))
                }
            };
        }
        if !self.is_below_retirement_threshold(y) {
            return Ok(self.value_function(t, y, 0.0));
        }
        if t >= self.params.horizon {
            // terminal branch ignores the control
            return Ok(self.value_function(t, y, 0.0));
        }

        let (alpha_star, alpha_m) = match self.policy {
            DomainPolicy::Propagate => (
                self.optimal_control_unconstrained(t, y),
                self.optimal_control_at_absorption_boundary(t, y),
            ),
            DomainPolicy::FailFast => (
                self.checked_optimal_control_unconstrained(t, y)?,
                self.checked_optimal_control_at_absorption_boundary(t, y)?,
            ),
        };
        let control = if alpha_m < alpha_star { alpha_m } else { alpha_star };
        Ok(self.value_function(t, y, control))
    }

    /// The first-best grid: `round(T·500)` times over `[0, T - 1e-5]` and
    /// `max(50, round(Y_max·1000))` states over `[0, Y_max]`.
    pub fn grid(&self) -> Grid {
        let horizon = self.params.horizon;
        let n_times = scaled_count(horizon, TIME_SAMPLES_PER_UNIT, 1);
        let n_states = scaled_count(self.y_max, STATE_SAMPLES_PER_UNIT, MIN_STATE_SAMPLES);
        Grid::uniform(
            (0.0, horizon - TERMINAL_OFFSET, n_times),
            (0.0, self.y_max, n_states),
        )
    }

    /// Evaluate the value function on the whole grid plus the crossing curve.
    pub fn evaluate_grid(&self) -> ControlResult<FirstBestSolution> {
        let grid = self.grid();
        let (n_times, n_states) = grid.shape();
        info!(
            gamma = self.params.gamma,
            kappa = self.params.kappa,
            n_times,
            n_states,
            y_max = self.y_max,
            "evaluating first-best grid"
        );

        let value = grid.try_map(|t, y| self.evaluate_point(t, y))?;

        let non_finite = value.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(
                non_finite,
                policy = ?self.policy,
                "first-best field contains non-finite values"
            );
        }

        let crossing = self.crossing_curve(&grid);
        debug!(points = crossing.len(), "crossing curve located");

        Ok(FirstBestSolution {
            grid,
            value,
            crossing,
        })
    }

    /// For each time sample, the first state sample where `|α* - α^M| < 1e-3`.
    pub fn crossing_curve(&self, grid: &Grid) -> Vec<CrossingPoint> {
        grid.times
            .iter()
            .filter_map(|&t| {
                grid.states
                    .iter()
                    .find(|&&y| {
                        let gap = self.optimal_control_unconstrained(t, y)
                            - self.optimal_control_at_absorption_boundary(t, y);
                        gap.abs() < CROSSING_TOLERANCE
                    })
                    .map(|&y| CrossingPoint { t, y })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn evaluator(values: [f64; 6], policy: DomainPolicy) -> FirstBestEvaluator {
        FirstBestEvaluator::new(ScenarioParameters::from_tuple(values), policy).unwrap()
    }

    #[test]
    fn test_terminal_branch() {
        let fb = evaluator([0.5, 0.7, 0.8, 1.0, 5.0, 0.5], DomainPolicy::Propagate);
        let y = 0.4;
        assert_relative_eq!(
            fb.value_function(1.0, y, 3.0),
            2.0 * (1.0 - 0.5 * y).ln(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_zero_control_matches_terminal_shape() {
        let fb = evaluator([1.0, 0.3, 1.0, 1.0, 1.0, 0.3], DomainPolicy::Propagate);
        // with α = 0 the running term vanishes and F reduces to the terminal condition
        assert_relative_eq!(
            fb.value_function(0.3, 0.2, 0.0),
            (1.0 - 0.2f64).ln(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_controls_solve_their_quadratics() {
        let fb = evaluator([0.3, 0.2, 0.8, 1.0, 1.0, 0.2], DomainPolicy::Propagate);
        let (gamma, kappa, k) = (0.3, 0.2, 0.8);
        let (t, y) = (0.25, 0.4);
        let tau = 1.0 - t;

        let a = fb.optimal_control_unconstrained(t, y);
        let residual = gamma * tau * k / 2.0 * a * a + (k + kappa * gamma * tau) * a
            + (gamma * y - 1.0 + kappa);
        assert_relative_eq!(residual, 0.0, epsilon = 1e-12);

        let am = fb.optimal_control_at_absorption_boundary(t, y);
        let residual_m = k * tau / 2.0 * am * am + kappa * tau * am + (y - fb.y_max());
        assert_relative_eq!(residual_m, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_control_reaches_absorption() {
        let fb = evaluator([0.3, 0.2, 0.8, 1.0, 1.0, 0.2], DomainPolicy::Propagate);
        assert_relative_eq!(
            fb.optimal_control_at_absorption_boundary(0.5, fb.y_max()),
            0.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_infeasible_state() {
        let propagate = evaluator([1.0, 0.3, 1.0, 1.0, 1.0, 0.3], DomainPolicy::Propagate);
        let above = propagate.y_max() + 0.01;
        assert_eq!(propagate.evaluate_point(0.5, above), Ok(f64::NEG_INFINITY));

        let strict = evaluator([1.0, 0.3, 1.0, 1.0, 1.0, 0.3], DomainPolicy::FailFast);
        let err = strict.evaluate_point(0.5, above).unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::InfeasibleState);
    }

    #[test]
    fn test_retirement_region_uses_zero_control() {
        // scenario 3: threshold ≈ 2.333 < Y_max ≈ 3.167
        let fb = evaluator([0.3, 0.3, 0.8, 1.0, 10.0, 0.2], DomainPolicy::Propagate);
        let y = 3.0;
        assert!(!fb.is_below_retirement_threshold(y));
        assert!(fb.is_within_absorption_bound(y));
        assert_eq!(fb.evaluate_point(0.4, y), Ok(fb.value_function(0.4, y, 0.0)));
    }

    #[test]
    fn test_tighter_control_binds() {
        let fb = evaluator([0.3, 0.2, 0.8, 1.0, 1.0, 0.2], DomainPolicy::Propagate);
        let (t, y) = (0.5, 0.3);
        let control = fb
            .optimal_control_unconstrained(t, y)
            .min(fb.optimal_control_at_absorption_boundary(t, y));
        assert_eq!(fb.evaluate_point(t, y), Ok(fb.value_function(t, y, control)));
    }

    #[test]
    fn test_division_singularity_flagged() {
        let fb = evaluator([1.0, 0.3, 1.0, 1.0, 1.0, 0.3], DomainPolicy::FailFast);
        let err = fb.checked_optimal_control_unconstrained(1.0, 0.1).unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::DivisionSingularity);
        assert!(!fb.optimal_control_unconstrained(1.0, 0.1).is_finite());
    }

    #[test]
    fn test_horizon_within_terminal_offset_rejected() {
        for horizon in [1e-6, TERMINAL_OFFSET] {
            let params = ScenarioParameters::from_tuple([1.0, 0.3, 1.0, horizon, 1.0, 0.3]);
            let err = FirstBestEvaluator::new(params, DomainPolicy::Propagate).unwrap_err();
            assert!(err.is_configuration());
        }

        // below 1/500 the time axis keeps a single sample at t = 0
        let short = evaluator([1.0, 0.3, 1.0, 5e-4, 1.0, 0.3], DomainPolicy::Propagate);
        let grid = short.grid();
        assert_eq!(grid.times.len(), 1);
        assert_eq!(grid.times[0], 0.0);
    }

    #[test]
    fn test_negative_discriminant() {
        // inside [0, Y_max] the discriminant stays positive; probe above the bound
        let fb = evaluator([1.0, 0.3, 1.0, 1.0, 1.0, 0.3], DomainPolicy::FailFast);
        let (t, y) = (0.0, 5.0);
        assert!(fb.unconstrained_discriminant(t, y) < 0.0);
        assert!(fb.optimal_control_unconstrained(t, y).is_nan());
        let err = fb.checked_optimal_control_unconstrained(t, y).unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::NegativeDiscriminant);
    }

    #[test]
    fn test_grid_resolution() {
        let fb = evaluator([0.5, 0.7, 0.8, 1.0, 5.0, 0.5], DomainPolicy::Propagate);
        let grid = fb.grid();
        let expected_states = (fb.y_max() * 1000.0).round() as usize;
        assert_eq!(grid.shape(), (500, expected_states));
        assert_relative_eq!(grid.times[499], 1.0 - 1e-5, epsilon = 1e-15);
        assert_eq!(grid.states[expected_states - 1], fb.y_max());

        let small = evaluator([1.0, 0.3, 1.0, 1.0, 0.01, 0.3], DomainPolicy::Propagate);
        assert_eq!(small.grid().shape().1, MIN_STATE_SAMPLES);
    }
}

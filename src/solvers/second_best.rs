// src/solvers/second_best.rs
//! Explicit finite-difference solver for the second-best HJB equation
//!
//! # Mathematical Framework
//!
//! The second-best value function solves, backwards from the horizon,
//! ```text
//! ∂u/∂t + max(0, sup_z H(z; u_y, u_yy)) = 0
//! u(T, y) = (1/γ) ln(1 - γ y)
//! u(t, 0) = 0,    u(t, Y_max) = -M
//! ```
//! on `[0, T] × [0, Y_max]` with `Y_max = U_A(M)`.
//!
//! # Discretization
//!
//! Forward Euler in (reversed) time with centred differences in state:
//! ```text
//! u_y  ≈ (u[n+1,j+1] - u[n+1,j-1]) / (2Δy)
//! u_yy ≈ (u[n+1,j+1] - 2u[n+1,j] + u[n+1,j-1]) / Δy²
//! u[n,j] = u[n+1,j] + Δt · max(0, max_z H)
//! ```
//! Where the curvature estimate is non-negative the Hamiltonian is not
//! evaluated and the value is carried over unchanged.
//!
//! # Stability
//!
//! There is no CFL check: `Δt` depends only on `T`, never on `Δy` or the
//! derivative magnitudes. This is an approximation limit of the scheme.

use crate::error::{validation::*, ControlResult};
use crate::grid::Grid;
use crate::math_utils::{scaled_count, Timer};
use crate::models::ScenarioParameters;
use crate::solvers::hamiltonian::{HamiltonianMaximizer, DEFAULT_CONTROL_SAMPLES};
use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis};
use tracing::{debug, info};

/// Resolution and control-search settings for [`SecondBestSolver`].
///
/// The defaults reproduce the reference grid: `N_t = max(50, round(3000 T))`,
/// `N_y = max(10, round(180 Y_max))`, 1000 controls over `[κ, κ + 5]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Time steps per unit of horizon.
    pub time_steps_per_unit: f64,
    pub min_time_steps: usize,
    /// State steps per unit of `Y_max`.
    pub state_steps_per_unit: f64,
    pub min_state_steps: usize,
    /// Controls sampled per Hamiltonian search.
    pub control_samples: usize,
    /// The control search covers `[κ, κ + control_margin]`.
    pub control_margin: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_steps_per_unit: 3000.0,
            min_time_steps: 50,
            state_steps_per_unit: 180.0,
            min_state_steps: 10,
            control_samples: DEFAULT_CONTROL_SAMPLES,
            control_margin: 5.0,
        }
    }
}

impl SolverConfig {
    /// Sets the time resolution multiplier and floor.
    pub fn with_time_steps(mut self, per_unit: f64, min_steps: usize) -> Self {
        self.time_steps_per_unit = per_unit;
        self.min_time_steps = min_steps;
        self
    }

    /// Sets the state resolution multiplier and floor.
    pub fn with_state_steps(mut self, per_unit: f64, min_steps: usize) -> Self {
        self.state_steps_per_unit = per_unit;
        self.min_state_steps = min_steps;
        self
    }

    /// Sets the number of controls sampled per Hamiltonian search.
    pub fn with_control_samples(mut self, samples: usize) -> Self {
        self.control_samples = samples;
        self
    }

    /// Sets the width of the control search above `κ`.
    pub fn with_control_margin(mut self, margin: f64) -> Self {
        self.control_margin = margin;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        validate_positive("time_steps_per_unit", self.time_steps_per_unit)?;
        validate_positive("state_steps_per_unit", self.state_steps_per_unit)?;
        validate_positive("control_margin", self.control_margin)?;
        validate_resolution("min_time_steps", self.min_time_steps, 1)?;
        validate_resolution("min_state_steps", self.min_state_steps, 2)?;
        validate_resolution("control_samples", self.control_samples, 2)?;
        Ok(())
    }
}

/// Grid sizes and steps derived from parameters and [`SolverConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub n_t: usize,
    pub n_y: usize,
    pub dt: f64,
    pub dy: f64,
    pub y_max: f64,
    pub z_max: f64,
}

/// Derivative estimates and Hamiltonian output at every grid point.
///
/// Points where the curvature was clamped, and the boundary columns, keep
/// `max_term = z_star = 0`.
#[derive(Clone, Debug)]
pub struct DiagnosticFields {
    pub dy_u: Array2<f64>,
    pub dyy_u: Array2<f64>,
    pub max_term: Array2<f64>,
    pub z_star: Array2<f64>,
}

#[derive(Clone, Debug)]
pub struct SecondBestSolution {
    pub grid: Grid,
    pub value: Array2<f64>,
    pub diagnostics: DiagnosticFields,
    pub resolution: Resolution,
    /// Interior points where the non-negative curvature skipped the update.
    pub clamped_points: usize,
}

/// The Hamiltonian is only maximised where the curvature estimate is
/// strictly negative. A NaN estimate counts as stable.
#[inline]
pub fn is_curvature_stable(dyy_u: f64) -> bool {
    !(dyy_u >= 0.0)
}

/// Row views of slice `n` written by one backward step.
struct SliceOutput<'a> {
    value: ArrayViewMut1<'a, f64>,
    dy_u: ArrayViewMut1<'a, f64>,
    dyy_u: ArrayViewMut1<'a, f64>,
    max_term: ArrayViewMut1<'a, f64>,
    z_star: ArrayViewMut1<'a, f64>,
}

/// Fill the interior of slice `n` from slice `n + 1`. Boundary entries of
/// `out` are left as they are. Returns the number of clamped points.
fn advance_slice(
    maximizer: &HamiltonianMaximizer,
    dt: f64,
    dy: f64,
    next: ArrayView1<'_, f64>,
    mut out: SliceOutput<'_>,
) -> usize {
    let n_y = next.len() - 1;
    let mut clamped = 0;

    for j in 1..n_y {
        let (left, mid, right) = (next[j - 1], next[j], next[j + 1]);
        let dy_u = (right - left) / (2.0 * dy);
        let dyy_u = (right - 2.0 * mid + left) / (dy * dy);
        out.dy_u[j] = dy_u;

        if !is_curvature_stable(dyy_u) {
            out.dyy_u[j] = 0.0;
            out.value[j] = mid;
            clamped += 1;
            continue;
        }
        out.dyy_u[j] = dyy_u;

        let best = maximizer.maximize(dy_u, dyy_u);
        if best.value > 0.0 {
            out.z_star[j] = best.z;
            out.max_term[j] = best.value;
        }
        out.value[j] = mid + dt * best.value.max(0.0);
    }
    clamped
}

/// Backward explicit finite-difference solver.
#[derive(Clone, Copy, Debug)]
pub struct SecondBestSolver {
    params: ScenarioParameters,
    config: SolverConfig,
}

impl SecondBestSolver {
    pub fn new(params: ScenarioParameters) -> ControlResult<Self> {
        Self::with_config(params, SolverConfig::default())
    }

    pub fn with_config(params: ScenarioParameters, config: SolverConfig) -> ControlResult<Self> {
        params.validate()?;
        config.validate()?;
        Ok(Self { params, config })
    }

    pub fn params(&self) -> &ScenarioParameters {
        &self.params
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn resolution(&self) -> Resolution {
        let y_max = self.params.y_max();
        let n_t = scaled_count(
            self.params.horizon,
            self.config.time_steps_per_unit,
            self.config.min_time_steps,
        );
        let n_y = scaled_count(
            y_max,
            self.config.state_steps_per_unit,
            self.config.min_state_steps,
        );
        Resolution {
            n_t,
            n_y,
            dt: self.params.horizon / n_t as f64,
            dy: y_max / n_y as f64,
            y_max,
            z_max: self.params.kappa + self.config.control_margin,
        }
    }

    /// `N_t + 1` times over `[0, T]`, `N_y + 1` states over `[0, Y_max]`.
    pub fn grid(&self) -> Grid {
        let res = self.resolution();
        Grid::uniform(
            (0.0, self.params.horizon, res.n_t + 1),
            (0.0, res.y_max, res.n_y + 1),
        )
    }

    /// Run the backward sweep and return the frozen fields.
    pub fn solve(&self) -> ControlResult<SecondBestSolution> {
        let ScenarioParameters {
            gamma,
            kappa,
            k,
            m,
            sigma,
            ..
        } = self.params;
        let res = self.resolution();
        validate_resolution("n_t", res.n_t, 1)?;
        validate_resolution("n_y", res.n_y, 2)?;
        let Resolution {
            n_t, n_y, dt, dy, ..
        } = res;

        let grid = self.grid();
        let timer = Timer::new();
        info!(
            gamma,
            kappa,
            k,
            sigma,
            m,
            n_t,
            n_y,
            "solving second-best HJB"
        );
        debug!(
            dt,
            dy,
            diffusion_ratio = sigma * sigma * dt / (dy * dy),
            "explicit scheme runs without a CFL check"
        );

        let mut value = grid.zeros();
        let mut dy_u_field = grid.zeros();
        let mut dyy_u_field = grid.zeros();
        let mut max_term = grid.zeros();
        let mut z_star = grid.zeros();

        // terminal slice, then the state boundaries over every slice
        for (j, &y) in grid.states.iter().enumerate() {
            value[[n_t, j]] = (1.0 / gamma) * (1.0 - gamma * y).ln();
        }
        value.column_mut(0).fill(0.0);
        value.column_mut(n_y).fill(-m);

        let maximizer =
            HamiltonianMaximizer::new(sigma, k, kappa, res.z_max, self.config.control_samples);
        let report_every = (n_t / 10).max(1);
        let mut clamped_points = 0usize;

        for n in (0..n_t).rev() {
            let (mut earlier, later) = value.view_mut().split_at(Axis(0), n + 1);
            clamped_points += advance_slice(
                &maximizer,
                dt,
                dy,
                later.row(0),
                SliceOutput {
                    value: earlier.row_mut(n),
                    dy_u: dy_u_field.row_mut(n),
                    dyy_u: dyy_u_field.row_mut(n),
                    max_term: max_term.row_mut(n),
                    z_star: z_star.row_mut(n),
                },
            );

            if n % report_every == 0 {
                debug!(slice = n, t = grid.times[n], "backward sweep progress");
            }
        }

        info!(
            clamped_points,
            elapsed_ms = timer.elapsed_ms(),
            "second-best solve complete"
        );

        Ok(SecondBestSolution {
            grid,
            value,
            diagnostics: DiagnosticFields {
                dy_u: dy_u_field,
                dyy_u: dyy_u_field,
                max_term,
                z_star,
            },
            resolution: res,
            clamped_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    fn coarse(values: [f64; 6]) -> SecondBestSolver {
        let config = SolverConfig::default()
            .with_time_steps(200.0, 50)
            .with_control_samples(200);
        SecondBestSolver::with_config(ScenarioParameters::from_tuple(values), config).unwrap()
    }

    #[test]
    fn test_curvature_predicate() {
        assert!(is_curvature_stable(-1e-12));
        assert!(!is_curvature_stable(0.0));
        assert!(!is_curvature_stable(3.0));
        assert!(is_curvature_stable(f64::NAN));
    }

    #[test]
    fn test_resolution_defaults() {
        let solver = SecondBestSolver::new(ScenarioParameters::from_tuple([
            0.5, 0.7, 0.8, 1.0, 5.0, 0.5,
        ]))
        .unwrap();
        let res = solver.resolution();
        assert_eq!(res.n_t, 3000);
        assert_eq!(res.n_y, 330);
        assert_relative_eq!(res.dt, 1.0 / 3000.0, epsilon = 1e-18);
        assert_relative_eq!(res.z_max, 5.7, epsilon = 1e-15);
        assert_eq!(solver.grid().shape(), (3001, 331));
    }

    #[test]
    fn test_resolution_floors() {
        let solver = SecondBestSolver::new(ScenarioParameters::from_tuple([
            1.0, 0.3, 1.0, 0.001, 0.01, 0.3,
        ]))
        .unwrap();
        let res = solver.resolution();
        assert_eq!(res.n_t, 50);
        assert_eq!(res.n_y, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let params = ScenarioParameters::from_tuple([1.0, 0.3, 1.0, 1.0, 1.0, 0.3]);
        let config = SolverConfig::default().with_control_samples(1);
        assert!(SecondBestSolver::with_config(params, config).is_err());
        let config = SolverConfig::default().with_state_steps(180.0, 1);
        assert!(SecondBestSolver::with_config(params, config).is_err());
    }

    #[test]
    fn test_coarse_solve_boundaries_and_monotonicity() {
        let solver = coarse([1.0, 0.3, 1.0, 1.0, 1.0, 0.3]);
        let sol = solver.solve().unwrap();
        let (n_t, n_y) = (sol.resolution.n_t, sol.resolution.n_y);
        assert_eq!(sol.value.dim(), (n_t + 1, n_y + 1));

        for n in 0..=n_t {
            assert_eq!(sol.value[[n, 0]], 0.0);
            assert_eq!(sol.value[[n, n_y]], -1.0);
        }
        for n in 0..n_t {
            for j in 0..=n_y {
                assert!(sol.value[[n, j]] >= sol.value[[n + 1, j]]);
            }
        }
    }

    #[test]
    fn test_diagnostics_consistent_with_update() {
        let solver = coarse([0.3, 0.3, 0.8, 1.0, 5.0, 0.3]);
        let sol = solver.solve().unwrap();
        let d = &sol.diagnostics;
        let res = sol.resolution;
        let kappa = 0.3;

        for n in 0..res.n_t {
            for j in 1..res.n_y {
                let increment = sol.value[[n, j]] - sol.value[[n + 1, j]];
                if d.max_term[[n, j]] > 0.0 {
                    assert!(d.z_star[[n, j]] >= kappa && d.z_star[[n, j]] <= res.z_max);
                    assert_relative_eq!(increment, res.dt * d.max_term[[n, j]], epsilon = 1e-12);
                } else {
                    assert_eq!(d.z_star[[n, j]], 0.0);
                    assert_eq!(increment, 0.0);
                }
                assert!(d.dyy_u[[n, j]] <= 0.0);
            }
        }
    }

    #[test]
    fn test_advance_slice_matches_centred_stencil() {
        let maximizer = HamiltonianMaximizer::new(0.3, 0.8, 0.3, 5.3, 500);
        let (dt, dy) = (0.01, 0.2);
        // convex at j = 2, flat curvature at j = 4
        let next = array![0.0, -0.5, -1.5, -1.0, -3.0, -5.0];

        let mut value = Array1::from_elem(6, f64::NAN);
        value[0] = 0.0;
        value[5] = -5.0;
        let mut dy_u = Array1::<f64>::zeros(6);
        let mut dyy_u = Array1::<f64>::zeros(6);
        let mut max_term = Array1::<f64>::zeros(6);
        let mut z_star = Array1::<f64>::zeros(6);

        let clamped = advance_slice(
            &maximizer,
            dt,
            dy,
            next.view(),
            SliceOutput {
                value: value.view_mut(),
                dy_u: dy_u.view_mut(),
                dyy_u: dyy_u.view_mut(),
                max_term: max_term.view_mut(),
                z_star: z_star.view_mut(),
            },
        );

        assert_eq!(clamped, 2);
        assert_eq!(value[0], 0.0);
        assert_eq!(value[5], -5.0);

        for j in 1..5 {
            let centred = (next[j + 1] - next[j - 1]) / (2.0 * dy);
            let second = (next[j + 1] - 2.0 * next[j] + next[j - 1]) / (dy * dy);
            assert_relative_eq!(dy_u[j], centred, epsilon = 1e-12);

            if second >= 0.0 {
                // slope is still recorded where the update is skipped
                assert!(dy_u[j] != 0.0);
                assert_eq!(dyy_u[j], 0.0);
                assert_eq!(value[j], next[j]);
                assert_eq!(max_term[j], 0.0);
                assert_eq!(z_star[j], 0.0);
            } else {
                assert_relative_eq!(dyy_u[j], second, max_relative = 1e-12);
                let best = maximizer.maximize(centred, second);
                assert_relative_eq!(value[j], next[j] + dt * best.value.max(0.0), epsilon = 1e-12);
            }
        }
    }
}

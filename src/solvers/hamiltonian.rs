// src/solvers/hamiltonian.rs
//! Pointwise Hamiltonian maximisation for the second-best HJB equation
//!
//! # Mathematical Framework
//!
//! Given the local derivatives `u_y`, `u_yy` the Hamiltonian, as a function
//! of the control `z`, is the quadratic
//! ```text
//! H(z) = A z² + z/k - B
//! A = (σ²/2) u_yy + u_y / (2k)
//! B = (κ² / (2k)) u_y + κ/k
//! ```
//!
//! # Search
//!
//! `H` is maximised by dense sampling: `samples` uniform controls over
//! `[κ, z_max]`, keeping the first sample that attains the maximum. There is
//! no refinement, so the argmax is accurate to one sample spacing.

use crate::math_utils::linspace;
use ndarray::Array1;

/// Controls sampled per Hamiltonian search.
pub const DEFAULT_CONTROL_SAMPLES: usize = 1000;

/// Best sampled control and the Hamiltonian value it attains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HamiltonianMax {
    pub z: f64,
    pub value: f64,
}

/// Quadratic coefficients `(A, B)` of the Hamiltonian.
pub fn hamiltonian_coefficients(
    dy_u: f64,
    dyy_u: f64,
    sigma: f64,
    k: f64,
    kappa: f64,
) -> (f64, f64) {
    let a = (sigma * sigma / 2.0) * dyy_u + (1.0 / (2.0 * k)) * dy_u;
    let b = (kappa * kappa / (2.0 * k)) * dy_u + kappa / k;
    (a, b)
}

/// One-shot maximisation over 1000 controls in `[kappa, z_max]`.
pub fn maximize_hamiltonian(
    dy_u: f64,
    dyy_u: f64,
    sigma: f64,
    k: f64,
    kappa: f64,
    z_max: f64,
) -> HamiltonianMax {
    HamiltonianMaximizer::new(sigma, k, kappa, z_max, DEFAULT_CONTROL_SAMPLES)
        .maximize(dy_u, dyy_u)
}

/// Reusable maximiser holding the sampled control range.
#[derive(Clone, Debug)]
pub struct HamiltonianMaximizer {
    sigma: f64,
    k: f64,
    kappa: f64,
    controls: Array1<f64>,
}

impl HamiltonianMaximizer {
    pub fn new(sigma: f64, k: f64, kappa: f64, z_max: f64, samples: usize) -> Self {
        Self {
            sigma,
            k,
            kappa,
            controls: linspace(kappa, z_max, samples),
        }
    }

    pub fn controls(&self) -> &Array1<f64> {
        &self.controls
    }

    /// `H(z)` for the given derivatives.
    #[inline]
    pub fn objective(&self, z: f64, dy_u: f64, dyy_u: f64) -> f64 {
        let (a, b) = hamiltonian_coefficients(dy_u, dyy_u, self.sigma, self.k, self.kappa);
        z * z * a + z / self.k - b
    }

    /// Stable argmax of `H` over the sampled controls.
    ///
    /// Ties keep the earliest sample. A NaN objective is treated as the
    /// maximum at the first position it occurs.
    pub fn maximize(&self, dy_u: f64, dyy_u: f64) -> HamiltonianMax {
        let (a, b) = hamiltonian_coefficients(dy_u, dyy_u, self.sigma, self.k, self.kappa);
        let mut best = HamiltonianMax {
            z: f64::NAN,
            value: f64::NEG_INFINITY,
        };
        for &z in self.controls.iter() {
            let value = z * z * a + z / self.k - b;
            if value.is_nan() {
                return HamiltonianMax { z, value };
            }
            if best.z.is_nan() || value > best.value {
                best = HamiltonianMax { z, value };
            }
        }
        best
    }
}

// src/grid.rs
//! Rectangular (time, state) grids and fields aligned with them.
//!
//! Every field produced by this crate is an `Array2<f64>` of shape
//! `(times.len(), states.len())`: index `(n, j)` is the coordinate
//! `(times[n], states[j])` for the grid it was produced on.

use crate::math_utils::linspace;
use ndarray::{Array1, Array2};

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub times: Array1<f64>,
    pub states: Array1<f64>,
}

impl Grid {
    pub fn new(times: Array1<f64>, states: Array1<f64>) -> Self {
        Self { times, states }
    }

    /// Uniform grid with `n_times` samples over `[t_start, t_end]` and
    /// `n_states` samples over `[y_start, y_end]`.
    pub fn uniform(
        (t_start, t_end, n_times): (f64, f64, usize),
        (y_start, y_end, n_states): (f64, f64, usize),
    ) -> Self {
        Self {
            times: linspace(t_start, t_end, n_times),
            states: linspace(y_start, y_end, n_states),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.times.len(), self.states.len())
    }

    pub fn coordinate(&self, n: usize, j: usize) -> (f64, f64) {
        (self.times[n], self.states[j])
    }

    /// Zero-initialised field aligned with this grid.
    pub fn zeros(&self) -> Array2<f64> {
        Array2::zeros(self.shape())
    }

    /// Apply a pure function to every grid coordinate.
    pub fn map<F>(&self, mut f: F) -> Array2<f64>
    where
        F: FnMut(f64, f64) -> f64,
    {
        Array2::from_shape_fn(self.shape(), |(n, j)| f(self.times[n], self.states[j]))
    }

    /// Fallible variant of [`Grid::map`]; stops at the first error.
    pub fn try_map<F, E>(&self, mut f: F) -> Result<Array2<f64>, E>
    where
        F: FnMut(f64, f64) -> Result<f64, E>,
    {
        let mut field = self.zeros();
        for ((n, j), cell) in field.indexed_iter_mut() {
            *cell = f(self.times[n], self.states[j])?;
        }
        Ok(field)
    }
}

/// Min/max over the finite entries of a field, `None` if there are none.
pub fn finite_range(field: &Array2<f64>) -> Option<(f64, f64)> {
    field
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

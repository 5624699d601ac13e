//! # hjb-control: First-best and second-best solutions of a retirement control problem
//!
//! A Rust library that solves a stochastic optimal-control problem with an
//! absorption boundary and a retirement option under two regimes.
//!
//! ## Key Features
//!
//! - **First best**: closed-form value function and controls evaluated on a grid
//! - **Second best**: explicit backward finite-difference scheme for the HJB equation
//! - **Pointwise Hamiltonian search**: dense sampling of the control with a stable argmax
//! - **Diagnostics**: derivative, Hamiltonian and optimal-control fields from the same sweep
//! - **Explicit edge-case policy**: NaN/-∞ propagation or fail-fast domain errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hjb_control::orchestrator::{render_run, run_scenario, DiagnosticsConfig, RunConfig};
//! use hjb_control::output::{CanvasConfig, TextRenderer};
//!
//! let cfg = RunConfig {
//!     scenario: 3,
//!     ..Default::default()
//! };
//! let run = run_scenario(&cfg).expect("Valid configuration");
//! println!("does retire: {}", run.retirement.does_retire);
//!
//! let mut renderer = TextRenderer::new(std::io::stdout(), CanvasConfig::default())
//!     .expect("Valid canvas");
//! render_run(&run, DiagnosticsConfig::ALL, &mut renderer).expect("Rendered");
//! ```
//!
//! ## Mathematical Foundation
//!
//! The state `y ∈ [0, Y_max]`, `Y_max = (1 - e^(-γM))/γ`, is driven by a
//! control whose quadratic cost is paid against an exponential-utility terminal
//! value `u(T, y) = (1/γ) ln(1 - γy)`. The first best is known in closed form;
//! the second best requires solving
//! ```text
//! ∂u/∂t + max(0, sup_z [A z² + z/k - B]) = 0
//! ```
//! numerically, with `A`, `B` built from `∂u/∂y` and `∂²u/∂y²`.

// Module declarations
pub mod error;
pub mod math_utils;
pub mod grid;
pub mod models;
pub mod analytics;
pub mod solvers;
pub mod orchestrator;
pub mod output;
pub mod logging;

// Re-export commonly used types for convenience
pub use error::{ControlError, ControlResult, DomainError, DomainErrorKind};
pub use models::ScenarioParameters;

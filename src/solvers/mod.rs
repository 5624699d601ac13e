pub mod hamiltonian;
pub mod second_best;

pub use hamiltonian::{maximize_hamiltonian, HamiltonianMax, HamiltonianMaximizer};
pub use second_best::{
    is_curvature_stable, DiagnosticFields, Resolution, SecondBestSolution, SecondBestSolver,
    SolverConfig,
};

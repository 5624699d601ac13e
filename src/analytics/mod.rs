pub mod first_best;

pub use first_best::{CrossingPoint, DomainPolicy, FirstBestEvaluator, FirstBestSolution};

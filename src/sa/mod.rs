//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! [`SaRunner`] is generic over [`SaProblem`]; [`AnnealingOptimizer`]
//! applies it to group assignments, with [`find_neighbor`] (one pairwise
//! swap inside one iteration) as the move.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod grouping;
mod runner;
mod types;

pub use config::{CoolingSchedule, ReturnPolicy, SaConfig};
pub use grouping::{find_neighbor, AnnealingOptimizer, GroupingProblem};
pub use runner::{step_probability, SaResult, SaRunner};
pub use types::SaProblem;

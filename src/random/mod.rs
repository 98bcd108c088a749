//! Random balanced partitions.
//!
//! [`RandomPartitioner::find_assignment`] produces the seed assignment for
//! the annealing search. [`RandomPartitioner::brute_force_assignment`] is a
//! pure random-restart baseline: many independent draws, no mutation, keep
//! the cheapest. It is the quality floor the annealing search has to beat.

mod runner;

pub use runner::{BruteForceResult, RandomPartitioner};

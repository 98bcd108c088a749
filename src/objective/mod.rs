//! Objective function for multi-round grouping.
//!
//! Two competing costs, each normalized to `[0, 1]`:
//!
//! - **Mix cost**: for every pair of groups across the whole assignment,
//!   the members they share beyond the first. Bounded by `C(R, 2) * P`
//!   for `R` iterations over `P` participants.
//! - **Diversity cost**: per group, `sqrt(sum of squared attribute value
//!   counts - group size)`, summed over groups. The bound counts the same
//!   values across the entire population instead of the group.
//!
//! [`ObjectiveFunction::calculate_weighted_cost`] combines both with
//! [`CostWeights`] into the scalar the optimizers minimize.

mod bounds;
mod config;
mod function;

pub use bounds::{check_shape, raw_diversity_cost, raw_mix_cost, CostBounds};
pub use config::CostWeights;
pub use function::{CostBreakdown, CostReport, ObjectiveFunction};

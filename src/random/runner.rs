//! Random partition generation and the random-restart baseline.

use crate::error::{GroupingError, Result};
use crate::model::{Assignment, Group, Iteration, MemberId, PartitionRequest, Population, Shape};
use crate::objective::{check_shape, CostBounds, CostWeights, ObjectiveFunction};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of a random-restart run.
#[derive(Debug, Clone)]
pub struct BruteForceResult {
    /// Lowest-cost assignment among all trials (earliest on ties).
    pub best: Assignment,
    /// Weighted cost of `best`.
    pub best_cost: f64,
    /// Number of trials drawn.
    pub trials: usize,
}

/// Builds random balanced partitions from a caller-owned RNG.
pub struct RandomPartitioner;

impl RandomPartitioner {
    /// Returns a random assignment of the requested shape.
    ///
    /// Each round independently shuffles the population and deals members
    /// into groups slot by slot (slot 0 of every group, then slot 1, ...),
    /// so group sizes differ by at most one.
    pub fn find_assignment<R: Rng>(
        population: &Arc<Population>,
        request: PartitionRequest,
        rng: &mut R,
    ) -> Result<Assignment> {
        request.validate(population.len())?;
        Ok(Self::partition(population, request, rng))
    }

    /// Draws `max_cycles` random assignments and keeps the cheapest under an
    /// objective over all attribute classes of the population, equally weighted.
    pub fn brute_force_assignment<R: Rng>(
        population: &Arc<Population>,
        request: PartitionRequest,
        max_cycles: usize,
        rng: &mut R,
    ) -> Result<Assignment> {
        let objective = ObjectiveFunction::for_population(population)?;
        Self::brute_force_with(
            population,
            request,
            max_cycles,
            &objective,
            CostWeights::default(),
            rng,
        )
        .map(|r| r.best)
    }

    /// Random-restart baseline with an explicit objective and weights.
    pub fn brute_force_with<R: Rng>(
        population: &Arc<Population>,
        request: PartitionRequest,
        max_cycles: usize,
        objective: &ObjectiveFunction,
        weights: CostWeights,
        rng: &mut R,
    ) -> Result<BruteForceResult> {
        request.validate(population.len())?;
        if max_cycles == 0 {
            return Err(GroupingError::invalid("max_cycles must be positive"));
        }
        weights.validate()?;
        check_shape(&Shape {
            iterations: request.iterations,
            groups_per_iteration: request.groups_per_iteration,
            participants: population.len(),
        })?;
        population.require_classes(objective.attribute_classes())?;

        let first = Self::partition(population, request, rng);
        let bounds = objective.bounds(&first)?;
        let (best, best_cost) =
            search_trials(population, request, max_cycles, first, objective, &bounds, weights, rng);

        debug!(trials = max_cycles, best_cost, "random restart finished");
        Ok(BruteForceResult {
            best,
            best_cost,
            trials: max_cycles,
        })
    }

    /// Partition without validation; `request` must already be valid.
    pub(crate) fn partition<R: Rng>(
        population: &Arc<Population>,
        request: PartitionRequest,
        rng: &mut R,
    ) -> Assignment {
        let groups = request.groups_per_iteration;
        let mut iterations = Vec::with_capacity(request.iterations);
        for _ in 0..request.iterations {
            let mut members: Vec<MemberId> = population.member_ids().collect();
            u_numflow::random::shuffle(&mut members, &mut *rng);

            let mut iteration = vec![Group::new(); groups];
            for (k, id) in members.into_iter().enumerate() {
                iteration[k % groups].insert(id);
            }
            iterations.push(Iteration::new(iteration));
        }
        Assignment::from_parts(Arc::clone(population), iterations)
    }
}

#[cfg(not(feature = "parallel"))]
#[allow(clippy::too_many_arguments)]
fn search_trials<R: Rng>(
    population: &Arc<Population>,
    request: PartitionRequest,
    max_cycles: usize,
    first: Assignment,
    objective: &ObjectiveFunction,
    bounds: &CostBounds,
    weights: CostWeights,
    rng: &mut R,
) -> (Assignment, f64) {
    let mut best_cost = objective.evaluate_unchecked(&first, bounds, weights).weighted;
    let mut best = first;
    for _ in 1..max_cycles {
        let trial = RandomPartitioner::partition(population, request, rng);
        let cost = objective.evaluate_unchecked(&trial, bounds, weights).weighted;
        if cost < best_cost {
            best = trial;
            best_cost = cost;
        }
    }
    (best, best_cost)
}

/// Trials are drawn sequentially from the RNG and only scored in parallel,
/// so the outcome matches the sequential search.
#[cfg(feature = "parallel")]
#[allow(clippy::too_many_arguments)]
fn search_trials<R: Rng>(
    population: &Arc<Population>,
    request: PartitionRequest,
    max_cycles: usize,
    first: Assignment,
    objective: &ObjectiveFunction,
    bounds: &CostBounds,
    weights: CostWeights,
    rng: &mut R,
) -> (Assignment, f64) {
    let mut trials = Vec::with_capacity(max_cycles);
    trials.push(first);
    for _ in 1..max_cycles {
        trials.push(RandomPartitioner::partition(population, request, rng));
    }
    let costs: Vec<f64> = trials
        .par_iter()
        .map(|a| objective.evaluate_unchecked(a, bounds, weights).weighted)
        .collect();

    let mut best_index = 0;
    for (i, &c) in costs.iter().enumerate().skip(1) {
        if c < costs[best_index] {
            best_index = i;
        }
    }
    let best_cost = costs[best_index];
    (trials.swap_remove(best_index), best_cost)
}

//! Annealing over group assignments.

use super::config::SaConfig;
use super::runner::{SaResult, SaRunner};
use super::types::SaProblem;
use crate::error::{GroupingError, Result};
use crate::model::{Assignment, PartitionRequest, Population, Shape};
use crate::objective::{check_shape, CostBounds, CostWeights, ObjectiveFunction};
use crate::random::RandomPartitioner;
use rand::Rng;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// Returns a copy of `assignment` with one pairwise swap applied.
///
/// One iteration is picked uniformly, then two distinct groups in it
/// (the second pick is redrawn until it differs), then one member of each.
/// The two members trade places. Group sizes and the partition are kept,
/// and `assignment` itself is untouched.
///
/// An iteration with fewer than two groups, or an empty group pick,
/// yields an unchanged copy.
pub fn find_neighbor<R: Rng>(assignment: &Assignment, rng: &mut R) -> Assignment {
    let mut neighbor = assignment.clone();
    let iterations = neighbor.iterations_mut();
    if iterations.is_empty() {
        return neighbor;
    }
    let index = rng.random_range(0..iterations.len());
    let groups = iterations[index].groups_mut();
    let n = groups.len();
    if n < 2 {
        return neighbor;
    }

    let g1 = rng.random_range(0..n);
    let len1 = groups[g1].len();
    if len1 == 0 {
        return neighbor;
    }
    let first = groups[g1].nth(rng.random_range(0..len1));

    let mut g2 = g1;
    while g2 == g1 {
        g2 = rng.random_range(0..n);
    }
    let len2 = groups[g2].len();
    if len2 == 0 {
        return neighbor;
    }
    let second = groups[g2].nth(rng.random_range(0..len2));

    let (Some(a), Some(b)) = (first, second) else {
        return neighbor;
    };
    groups[g1].remove(a);
    groups[g1].insert(b);
    groups[g2].remove(b);
    groups[g2].insert(a);
    neighbor
}

/// [`SaProblem`] over assignments of one fixed shape.
///
/// Bounds are fixed at construction, so every cost evaluation in a run
/// uses the same normalization.
pub struct GroupingProblem<'a> {
    population: Arc<Population>,
    request: PartitionRequest,
    objective: &'a ObjectiveFunction,
    bounds: CostBounds,
    weights: CostWeights,
}

impl<'a> GroupingProblem<'a> {
    /// Fixes the shape of `sample` and the bounds for that shape.
    pub fn new(
        objective: &'a ObjectiveFunction,
        sample: &Assignment,
        weights: CostWeights,
    ) -> Result<Self> {
        weights.validate()?;
        let bounds = objective.bounds(sample)?;
        let shape = sample.shape();
        Ok(Self {
            population: Arc::clone(sample.population()),
            request: PartitionRequest::new(shape.groups_per_iteration, shape.iterations),
            objective,
            bounds,
            weights,
        })
    }

    pub fn bounds(&self) -> &CostBounds {
        &self.bounds
    }
}

impl SaProblem for GroupingProblem<'_> {
    type Solution = Assignment;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Assignment {
        RandomPartitioner::partition(&self.population, self.request, rng)
    }

    fn cost(&self, solution: &Assignment) -> f64 {
        self.objective
            .evaluate_unchecked(solution, &self.bounds, self.weights)
            .weighted
    }

    fn neighbor<R: Rng>(&self, solution: &Assignment, rng: &mut R) -> Assignment {
        find_neighbor(solution, rng)
    }
}

/// Simulated annealing search for multi-round groupings.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_groupmix::model::{Participant, PartitionRequest, Population};
/// use u_groupmix::sa::{AnnealingOptimizer, SaConfig};
///
/// let people = (0..12)
///     .map(|i| {
///         let dept = ["sales", "ops", "dev"][i % 3];
///         Participant::new(i.to_string(), [("dept", dept)])
///     })
///     .collect();
/// let population = Arc::new(Population::new(people).unwrap());
///
/// let optimizer = AnnealingOptimizer::new(["dept"])
///     .unwrap()
///     .with_config(SaConfig::default().with_max_cycles(200));
/// let mut rng = u_numflow::random::create_rng(1);
/// let assignment = optimizer
///     .find_assignment(&population, PartitionRequest::new(3, 4), &mut rng)
///     .unwrap();
/// assert_eq!(assignment.iterations().len(), 4);
/// ```
#[derive(Debug)]
pub struct AnnealingOptimizer {
    objective: ObjectiveFunction,
    config: SaConfig,
    weights: CostWeights,
}

impl AnnealingOptimizer {
    /// Optimizer over the given attribute classes with default settings.
    pub fn new<I, S>(attribute_classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            objective: ObjectiveFunction::new(attribute_classes)?,
            config: SaConfig::default(),
            weights: CostWeights::default(),
        })
    }

    pub fn with_config(mut self, config: SaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn objective(&self) -> &ObjectiveFunction {
        &self.objective
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    /// Rejects every unusable input before any random number is drawn.
    pub fn validate(&self, population: &Population, request: PartitionRequest) -> Result<()> {
        self.config.validate()?;
        self.weights.validate()?;
        request.validate(population.len())?;
        if request.groups_per_iteration < 2 || request.groups_per_iteration >= population.len() {
            return Err(GroupingError::invalid(format!(
                "groups_per_iteration must be in 2..{}, got {}",
                population.len(),
                request.groups_per_iteration
            )));
        }
        check_shape(&Shape {
            iterations: request.iterations,
            groups_per_iteration: request.groups_per_iteration,
            participants: population.len(),
        })?;
        population.require_classes(self.objective.attribute_classes())
    }

    /// Runs the search and returns the assignment chosen by the configured
    /// [`ReturnPolicy`](super::ReturnPolicy).
    pub fn find_assignment<R: Rng>(
        &self,
        population: &Arc<Population>,
        request: PartitionRequest,
        rng: &mut R,
    ) -> Result<Assignment> {
        let result = self.find_assignment_with(population, request, rng, None, None)?;
        Ok(result.into_selected(self.config.return_policy).0)
    }

    /// Full run with optional progress reporting and cancellation.
    ///
    /// The seed assignment comes from [`RandomPartitioner`] on the same
    /// RNG. Bounds depend only on its shape and population, so a reused
    /// optimizer returns the same assignment for the same seed.
    pub fn find_assignment_with<R: Rng>(
        &self,
        population: &Arc<Population>,
        request: PartitionRequest,
        rng: &mut R,
        progress: Option<&mut dyn FnMut(usize, usize)>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult<Assignment>> {
        self.validate(population, request)?;

        let seed = RandomPartitioner::partition(population, request, rng);
        let problem = GroupingProblem::new(&self.objective, &seed, self.weights)?;
        debug!(
            participants = population.len(),
            groups = request.groups_per_iteration,
            iterations = request.iterations,
            "grouping search prepared"
        );
        SaRunner::run_from(&problem, seed, &self.config, rng, progress, cancel)
    }
}

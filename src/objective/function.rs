//! The objective function: normalized mix and diversity costs.

use super::bounds::{raw_diversity_cost, raw_mix_cost, CostBounds};
use super::config::CostWeights;
use crate::error::{GroupingError, Result};
use crate::model::{Assignment, BoundsKey, MemberId, Population};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Normalized cost components of one assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub mix: f64,
    pub diversity: f64,
    pub weighted: f64,
}

/// Summary statistics for reporting a finished assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostReport {
    /// Mean number of distinct other participants each participant meets.
    pub average_meetings: f64,
    pub mix_cost: f64,
    pub diversity_cost: f64,
    pub weighted_cost: f64,
}

/// Evaluates assignments against a fixed list of attribute classes.
///
/// Normalization bounds are memoized per [`BoundsKey`] (shape plus
/// population fingerprint), so one instance can score assignments of
/// different shapes without ever applying bounds from the wrong one.
/// Bounds depend on nothing but the key, so scores never depend on which
/// assignments were evaluated before.
///
/// The memo holds one entry per distinct key and is never evicted on its
/// own; a long-lived instance that scores many populations should call
/// [`clear_bounds`](Self::clear_bounds) between them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_groupmix::model::{Participant, PartitionRequest, Population};
/// use u_groupmix::objective::{CostWeights, ObjectiveFunction};
/// use u_groupmix::random::RandomPartitioner;
///
/// let people = (0..8)
///     .map(|i| Participant::new(i.to_string(), [("team", if i % 2 == 0 { "a" } else { "b" })]))
///     .collect();
/// let population = Arc::new(Population::new(people).unwrap());
/// let mut rng = u_numflow::random::create_rng(7);
/// let assignment = RandomPartitioner::find_assignment(
///     &population,
///     PartitionRequest::new(2, 3),
///     &mut rng,
/// )
/// .unwrap();
///
/// let objective = ObjectiveFunction::new(["team"]).unwrap();
/// let cost = objective
///     .calculate_weighted_cost(&assignment, CostWeights::default())
///     .unwrap();
/// assert!((0.0..=1.0).contains(&cost));
/// ```
#[derive(Debug)]
pub struct ObjectiveFunction {
    attribute_classes: Vec<String>,
    bounds: RwLock<HashMap<BoundsKey, CostBounds>>,
}

impl ObjectiveFunction {
    /// Creates an objective over the given attribute classes.
    ///
    /// The list must be non-empty and free of duplicates.
    pub fn new<I, S>(attribute_classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute_classes: Vec<String> =
            attribute_classes.into_iter().map(Into::into).collect();
        if attribute_classes.is_empty() {
            return Err(GroupingError::invalid("attribute class list must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = attribute_classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(GroupingError::invalid(format!(
                "attribute class {dup:?} listed twice"
            )));
        }
        Ok(Self {
            attribute_classes,
            bounds: RwLock::new(HashMap::new()),
        })
    }

    /// Objective over every attribute class of the population.
    pub fn for_population(population: &Population) -> Result<Self> {
        Self::new(population.attribute_classes())
    }

    pub fn attribute_classes(&self) -> &[String] {
        &self.attribute_classes
    }

    /// Bounds for the sample's shape and population, computed on first use
    /// and memoized. The sample's group membership does not matter.
    pub fn bounds(&self, sample: &Assignment) -> Result<CostBounds> {
        let key = sample.bounds_key();
        if let Some(cached) = self.read_cache().get(&key) {
            return Ok(*cached);
        }
        self.recalculate_bounds(sample)
    }

    /// Recomputes the bounds for the sample's shape, replacing any
    /// memoized value.
    pub fn recalculate_bounds(&self, sample: &Assignment) -> Result<CostBounds> {
        let bounds = CostBounds::compute(sample, &self.attribute_classes)?;
        debug!(
            key = %bounds.key,
            mix_max = bounds.mix_max,
            diversity_max = bounds.diversity_max,
            "computed cost bounds"
        );
        self.write_cache().insert(bounds.key, bounds);
        Ok(bounds)
    }

    /// Number of distinct shapes with memoized bounds.
    pub fn cached_shapes(&self) -> usize {
        self.read_cache().len()
    }

    /// Drops every memoized bound.
    pub fn clear_bounds(&self) {
        self.write_cache().clear();
    }

    /// Normalized mix cost in `[0, 1]`, lower means fewer repeated encounters.
    pub fn mix_cost(&self, assignment: &Assignment) -> Result<f64> {
        let bounds = self.bounds(assignment)?;
        Ok(normalize(raw_mix_cost(assignment), bounds.mix_max))
    }

    /// Normalized diversity cost in `[0, 1]`, lower means more diverse groups.
    pub fn diversity_cost(&self, assignment: &Assignment) -> Result<f64> {
        let bounds = self.bounds(assignment)?;
        Ok(normalize(
            raw_diversity_cost(assignment, &self.attribute_classes),
            bounds.diversity_max,
        ))
    }

    /// Weighted mean of mix and diversity cost.
    pub fn calculate_weighted_cost(
        &self,
        assignment: &Assignment,
        weights: CostWeights,
    ) -> Result<f64> {
        let bounds = self.bounds(assignment)?;
        self.evaluate(assignment, &bounds, weights)
            .map(|b| b.weighted)
    }

    /// Pure evaluation against explicit bounds.
    ///
    /// Fails with [`GroupingError::StaleBounds`] if `bounds` were computed
    /// for a different shape or population.
    pub fn evaluate(
        &self,
        assignment: &Assignment,
        bounds: &CostBounds,
        weights: CostWeights,
    ) -> Result<CostBreakdown> {
        bounds.matches(assignment)?;
        weights.validate()?;
        Ok(self.evaluate_unchecked(assignment, bounds, weights))
    }

    /// Evaluation for callers that already guarantee matching bounds and
    /// valid weights (the annealing loop only produces same-shape neighbors).
    pub(crate) fn evaluate_unchecked(
        &self,
        assignment: &Assignment,
        bounds: &CostBounds,
        weights: CostWeights,
    ) -> CostBreakdown {
        let mix = normalize(raw_mix_cost(assignment), bounds.mix_max);
        let diversity = normalize(
            raw_diversity_cost(assignment, &self.attribute_classes),
            bounds.diversity_max,
        );
        CostBreakdown {
            mix,
            diversity,
            weighted: weights.combine(mix, diversity),
        }
    }

    /// Mean number of distinct other participants each participant shares
    /// at least one group with.
    pub fn average_meetings(assignment: &Assignment) -> f64 {
        let n = assignment.population().len();
        if n == 0 {
            return 0.0;
        }
        let mut met: Vec<HashSet<MemberId>> = vec![HashSet::new(); n];
        for group in assignment.groups() {
            for a in group.iter() {
                if let Some(seen) = met.get_mut(a.index()) {
                    seen.extend(group.iter().filter(|&b| b != a));
                }
            }
        }
        met.iter().map(HashSet::len).sum::<usize>() as f64 / n as f64
    }

    /// All summary figures for a finished assignment.
    pub fn report(&self, assignment: &Assignment, weights: CostWeights) -> Result<CostReport> {
        let bounds = self.bounds(assignment)?;
        let costs = self.evaluate(assignment, &bounds, weights)?;
        Ok(CostReport {
            average_meetings: Self::average_meetings(assignment),
            mix_cost: costs.mix,
            diversity_cost: costs.diversity,
            weighted_cost: costs.weighted,
        })
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<BoundsKey, CostBounds>> {
        self.bounds.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<BoundsKey, CostBounds>> {
        self.bounds.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `raw / max`, clamped to 1. A zero bound means no value is shared
/// anywhere, so the raw cost is zero as well.
fn normalize(raw: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        (raw / max).min(1.0)
    }
}

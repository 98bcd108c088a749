//! Normalization bounds and the raw (unnormalized) cost terms.

use crate::error::{GroupingError, Result};
use crate::model::{Assignment, BoundsKey, Group, MemberId, Population, Shape};
use std::collections::HashMap;

/// Upper bounds of the unnormalized mix and diversity costs.
///
/// Both bounds depend only on the shape and the population, so a value
/// computed once is valid for every assignment whose [`BoundsKey`] equals
/// `key`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostBounds {
    pub key: BoundsKey,
    pub mix_max: f64,
    pub diversity_max: f64,
}

impl CostBounds {
    /// Computes both bounds for the shape and population of `sample`.
    ///
    /// Group membership in `sample` is not used: the diversity bound is
    /// measured on a reference layout of the same shape, in which member
    /// `k` of the population sits in group `k % groups_per_iteration` in
    /// every iteration, each present value counted across the whole
    /// population.
    pub fn compute(sample: &Assignment, classes: &[String]) -> Result<Self> {
        let key = sample.bounds_key();
        check_shape(&key.shape)?;
        let population = sample.population();
        population.require_classes(classes)?;

        let pairs = key.shape.iterations * (key.shape.iterations - 1) / 2;
        let mix_max = (pairs * key.shape.participants) as f64;

        let reference = population_counts(population, classes);
        let per_iteration: f64 = reference_layout(population, key.shape.groups_per_iteration)
            .iter()
            .map(|g| group_diversity(population, g, classes, Some(reference.as_slice())))
            .sum();

        Ok(Self {
            key,
            mix_max,
            diversity_max: per_iteration * key.shape.iterations as f64,
        })
    }

    pub fn matches(&self, assignment: &Assignment) -> Result<()> {
        let found = assignment.bounds_key();
        if found == self.key {
            Ok(())
        } else {
            Err(GroupingError::StaleBounds {
                expected: self.key,
                found,
            })
        }
    }
}

/// Rejects shapes for which the mix bound is zero or the search has
/// nothing to exchange.
pub fn check_shape(shape: &Shape) -> Result<()> {
    if shape.iterations < 2 {
        return Err(GroupingError::shape(format!(
            "need at least 2 iterations, got {}",
            shape.iterations
        )));
    }
    if shape.groups_per_iteration < 2 {
        return Err(GroupingError::shape(format!(
            "need at least 2 groups per iteration, got {}",
            shape.groups_per_iteration
        )));
    }
    Ok(())
}

/// Sum over all group pairs of the members they share beyond the first.
pub fn raw_mix_cost(assignment: &Assignment) -> f64 {
    let groups: Vec<&Group> = assignment.groups().collect();
    let mut cost = 0usize;
    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            cost += a.overlap(b).saturating_sub(1);
        }
    }
    cost as f64
}

/// Sum of the per-group diversity costs.
pub fn raw_diversity_cost(assignment: &Assignment, classes: &[String]) -> f64 {
    let population = assignment.population();
    assignment
        .groups()
        .map(|g| group_diversity(population, g, classes, None))
        .sum()
}

fn value<'a>(population: &'a Population, id: MemberId, class: &str) -> &'a str {
    population
        .get(id)
        .and_then(|p| p.attribute(class))
        .unwrap_or_default()
}

fn reference_layout(population: &Population, groups: usize) -> Vec<Group> {
    let mut layout = vec![Group::new(); groups.max(1)];
    let len = layout.len();
    for id in population.member_ids() {
        layout[id.index() % len].insert(id);
    }
    layout
}

fn population_counts<'a>(
    population: &'a Population,
    classes: &[String],
) -> Vec<HashMap<&'a str, usize>> {
    classes
        .iter()
        .map(|class| {
            let mut counts = HashMap::new();
            for id in population.member_ids() {
                *counts.entry(value(population, id, class)).or_insert(0) += 1;
            }
            counts
        })
        .collect()
}

/// `sqrt(sum of squared value counts - group size)`.
///
/// With `reference`, each value present in the group is counted across
/// the whole population instead of the group, which yields the bound.
fn group_diversity(
    population: &Population,
    group: &Group,
    classes: &[String],
    reference: Option<&[HashMap<&str, usize>]>,
) -> f64 {
    let mut squares = 0usize;
    for (ci, class) in classes.iter().enumerate() {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in group.iter() {
            *counts.entry(value(population, id, class)).or_insert(0) += 1;
        }
        for (v, c) in counts {
            let n = reference
                .and_then(|r| r.get(ci))
                .and_then(|r| r.get(v).copied())
                .unwrap_or(c);
            squares += n * n;
        }
    }
    (squares.saturating_sub(group.len()) as f64).sqrt()
}

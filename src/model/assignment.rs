//! Groups, iterations and assignments.

use super::participant::{MemberId, Participant, Population};
use crate::error::{GroupingError, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A set of participants meeting together in one iteration.
///
/// Members are kept ordered so that indexing into a group (as the
/// neighbor move does) is reproducible under a fixed seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    members: BTreeSet<MemberId>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.members.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().copied()
    }

    /// The `n`-th member in handle order.
    pub fn nth(&self, n: usize) -> Option<MemberId> {
        self.members.iter().nth(n).copied()
    }

    /// Number of members shared with `other`.
    pub fn overlap(&self, other: &Group) -> usize {
        self.members.intersection(&other.members).count()
    }

    pub(crate) fn insert(&mut self, id: MemberId) -> bool {
        self.members.insert(id)
    }

    pub(crate) fn remove(&mut self, id: MemberId) -> bool {
        self.members.remove(&id)
    }
}

impl FromIterator<MemberId> for Group {
    fn from_iter<T: IntoIterator<Item = MemberId>>(iter: T) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// One round: an ordered list of groups partitioning the population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iteration {
    groups: Vec<Group>,
}

impl Iteration {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of members across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }
}

/// Problem shape: what a set of cost bounds is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub iterations: usize,
    pub groups_per_iteration: usize,
    pub participants: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations x {} groups over {} participants",
            self.iterations, self.groups_per_iteration, self.participants
        )
    }
}

/// Shape plus population fingerprint. Bounds computed for one key are
/// never used for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsKey {
    pub shape: Shape,
    pub population: u64,
}

impl fmt::Display for BoundsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (population {:016x})", self.shape, self.population)
    }
}

/// How many groups and rounds to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionRequest {
    pub groups_per_iteration: usize,
    pub iterations: usize,
}

impl PartitionRequest {
    pub fn new(groups_per_iteration: usize, iterations: usize) -> Self {
        Self {
            groups_per_iteration,
            iterations,
        }
    }

    /// Checks the request against a population of `participants` members.
    pub fn validate(&self, participants: usize) -> Result<()> {
        if participants == 0 {
            return Err(GroupingError::invalid("population must not be empty"));
        }
        if self.groups_per_iteration == 0 {
            return Err(GroupingError::invalid("groups_per_iteration must be positive"));
        }
        if self.groups_per_iteration > participants {
            return Err(GroupingError::invalid(format!(
                "groups_per_iteration ({}) exceeds participant count ({participants})",
                self.groups_per_iteration
            )));
        }
        if self.iterations == 0 {
            return Err(GroupingError::invalid("iterations must be positive"));
        }
        Ok(())
    }

    /// Largest group size: `ceil(participants / groups_per_iteration)`.
    pub fn max_group_size(&self, participants: usize) -> usize {
        participants.div_ceil(self.groups_per_iteration.max(1))
    }
}

/// A full solution: one [`Iteration`] per round over a shared population.
///
/// Cloning copies the group containers and shares the population.
#[derive(Debug, Clone)]
pub struct Assignment {
    population: Arc<Population>,
    iterations: Vec<Iteration>,
}

impl Assignment {
    /// Builds an assignment, checking that every iteration is a balanced
    /// partition of the population.
    pub fn new(population: Arc<Population>, iterations: Vec<Iteration>) -> Result<Self> {
        if iterations.is_empty() {
            return Err(GroupingError::invalid("assignment needs at least one iteration"));
        }
        let groups = iterations[0].len();
        for (index, iteration) in iterations.iter().enumerate() {
            if iteration.len() != groups {
                return Err(GroupingError::invalid(format!(
                    "iteration {index} has {} groups, expected {groups}",
                    iteration.len()
                )));
            }
            check_partition(&population, iteration, index)?;
        }
        Ok(Self {
            population,
            iterations,
        })
    }

    /// Skips validation; callers construct partitions by design.
    pub(crate) fn from_parts(population: Arc<Population>, iterations: Vec<Iteration>) -> Self {
        Self {
            population,
            iterations,
        }
    }

    pub fn population(&self) -> &Arc<Population> {
        &self.population
    }

    pub fn iterations(&self) -> &[Iteration] {
        &self.iterations
    }

    pub(crate) fn iterations_mut(&mut self) -> &mut [Iteration] {
        &mut self.iterations
    }

    /// Every group of every iteration, in order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.iterations.iter().flat_map(|it| it.groups().iter())
    }

    pub fn shape(&self) -> Shape {
        Shape {
            iterations: self.iterations.len(),
            groups_per_iteration: self.iterations.first().map_or(0, Iteration::len),
            participants: self.iterations.first().map_or(0, Iteration::member_count),
        }
    }

    pub fn bounds_key(&self) -> BoundsKey {
        BoundsKey {
            shape: self.shape(),
            population: self.population.fingerprint(),
        }
    }

    /// Resolves a handle to its participant.
    pub fn participant(&self, id: MemberId) -> Option<&Participant> {
        self.population.get(id)
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.population.fingerprint() == other.population.fingerprint()
            && self.iterations == other.iterations
    }
}

impl Eq for Assignment {}

fn check_partition(population: &Population, iteration: &Iteration, index: usize) -> Result<()> {
    let mut seen = vec![false; population.len()];
    for group in iteration.groups() {
        for id in group.iter() {
            match seen.get_mut(id.index()) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(GroupingError::invalid(format!(
                        "iteration {index} places member {} twice",
                        id.index()
                    )))
                }
                None => {
                    return Err(GroupingError::invalid(format!(
                        "iteration {index} refers to unknown member {}",
                        id.index()
                    )))
                }
            }
        }
    }
    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(GroupingError::invalid(format!(
            "iteration {index} omits member {missing}"
        )));
    }

    let sizes = iteration.groups().iter().map(Group::len);
    let (min, max) = sizes.fold((usize::MAX, 0), |(lo, hi), s| (lo.min(s), hi.max(s)));
    if max.saturating_sub(min) > 1 {
        return Err(GroupingError::invalid(format!(
            "iteration {index} is unbalanced: group sizes range from {min} to {max}"
        )));
    }
    Ok(())
}

//! Attribute value synonyms.
//!
//! Free-form survey answers spell the same thing many ways ("DE",
//! "Germany", "germany"). A [`SynonymMap`] folds them into one preferred
//! value before the participants reach the objective, so the diversity
//! cost counts them as one value.

use crate::model::Participant;
use std::collections::BTreeMap;

/// Classes of equivalent values. The first entry of each class is its
/// preferred spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynonymMap {
    classes: Vec<Vec<String>>,
}

impl SynonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `synonym` (and everything already folded into it) a synonym of
    /// `preferred`.
    ///
    /// Both arguments are first resolved to their current preferred
    /// spelling. Returns `false` when they already share a class.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_groupmix::table::SynonymMap;
    ///
    /// let mut map = SynonymMap::new();
    /// map.merge("Germany", "DE");
    /// map.merge("DE", "germany");
    /// assert_eq!(map.preferred("germany"), "Germany");
    /// assert_eq!(map.synonyms_for("DE"), ["Germany", "DE", "germany"]);
    /// ```
    pub fn merge(&mut self, preferred: &str, synonym: &str) -> bool {
        let target = self.preferred(preferred).to_string();
        let source = self.preferred(synonym).to_string();
        if target == source {
            return false;
        }

        let moved = match self.class_index(&source) {
            Some(i) => self.classes.remove(i),
            None => vec![source],
        };
        match self.class_index(&target) {
            Some(i) => self.classes[i].extend(moved),
            None => {
                let mut class = vec![target];
                class.extend(moved);
                self.classes.push(class);
            }
        }
        true
    }

    /// The class containing `value`, preferred spelling first. A value
    /// with no synonyms is its own single-entry class.
    pub fn synonyms_for(&self, value: &str) -> Vec<String> {
        self.classes
            .iter()
            .find(|class| class.iter().any(|v| v == value))
            .cloned()
            .unwrap_or_else(|| vec![value.to_string()])
    }

    /// Preferred spelling of `value`.
    pub fn preferred<'a>(&'a self, value: &'a str) -> &'a str {
        self.classes
            .iter()
            .find(|class| class.iter().any(|v| v == value))
            .and_then(|class| class.first())
            .map_or(value, String::as_str)
    }

    /// Number of classes with at least one synonym.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Forgets every merge.
    pub fn reset(&mut self) {
        self.classes.clear();
    }

    /// Copies of `participants` with every attribute value replaced by its
    /// preferred spelling.
    pub fn apply(&self, participants: &[Participant]) -> Vec<Participant> {
        participants
            .iter()
            .map(|p| p.map_values(|_, v| self.preferred(v).to_string()))
            .collect()
    }

    fn class_index(&self, head: &str) -> Option<usize> {
        self.classes
            .iter()
            .position(|class| class.first().is_some_and(|v| v == head))
    }
}

/// Sort order of [`value_distribution`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistributionOrder {
    /// Alphabetical by value.
    #[default]
    Value,
    /// Most frequent first; ties alphabetical.
    Frequency,
}

/// Distinct non-empty values of `attribute` with their counts.
pub fn value_distribution(
    participants: &[Participant],
    attribute: &str,
    order: DistributionOrder,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in participants.iter().filter_map(|p| p.attribute(attribute)) {
        if !value.is_empty() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(v, c)| (v.to_string(), c))
        .collect();
    if order == DistributionOrder::Frequency {
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    }
    out
}

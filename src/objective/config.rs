//! Relative weighting of the two cost components.

use crate::error::{GroupingError, Result};

/// Weights of the mix and diversity components in the combined cost.
///
/// Only the ratio matters: `(1, 1)` and `(5, 5)` rank assignments
/// identically.
///
/// # Examples
///
/// ```
/// use u_groupmix::objective::CostWeights;
///
/// let weights = CostWeights::default().with_diversity(3.0);
/// assert!(weights.validate().is_ok());
/// assert!((weights.combine(0.2, 0.6) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    /// Weight of the mix cost (repeated encounters).
    pub mix: f64,
    /// Weight of the diversity cost (attribute homogeneity).
    pub diversity: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            mix: 1.0,
            diversity: 1.0,
        }
    }
}

impl CostWeights {
    pub fn new(mix: f64, diversity: f64) -> Self {
        Self { mix, diversity }
    }

    pub fn with_mix(mut self, w: f64) -> Self {
        self.mix = w;
        self
    }

    pub fn with_diversity(mut self, w: f64) -> Self {
        self.diversity = w;
        self
    }

    /// Weights must be finite, non-negative and not both zero.
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [("mix", self.mix), ("diversity", self.diversity)] {
            if !w.is_finite() || w < 0.0 {
                return Err(GroupingError::invalid(format!(
                    "{name} weight must be finite and non-negative, got {w}"
                )));
            }
        }
        if self.mix + self.diversity <= 0.0 {
            return Err(GroupingError::invalid("cost weights must not both be zero"));
        }
        Ok(())
    }

    /// Weighted mean of the two normalized costs.
    pub fn combine(&self, mix_cost: f64, diversity_cost: f64) -> f64 {
        (mix_cost * self.mix + diversity_cost * self.diversity) / (self.mix + self.diversity)
    }
}

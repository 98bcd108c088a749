//! SA configuration and cooling schedules.

use crate::error::{GroupingError, Result};

/// Temperature as a function of run progress `p = cycle / max_cycles`.
///
/// Both schedules reach exactly zero on the last cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// `T(p) = T_0 * (1 - p) * exp(-scaling * p)`.
    ///
    /// Effectively frozen well before the end of the run; higher
    /// `scaling` freezes sooner. Typical `scaling`: 10–20.
    ExponentialDecay {
        /// Decay rate. Must be finite and non-negative.
        scaling: f64,
    },

    /// `T(p) = T_0 * (1 - p)`.
    Linear,
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::ExponentialDecay { scaling: 15.0 }
    }
}

impl CoolingSchedule {
    /// Temperature at `progress` in `[0, 1]`.
    pub fn temperature(&self, initial_temperature: f64, progress: f64) -> f64 {
        let remaining = (1.0 - progress).max(0.0);
        match *self {
            CoolingSchedule::ExponentialDecay { scaling } => {
                initial_temperature * remaining * (-scaling * progress).exp()
            }
            CoolingSchedule::Linear => initial_temperature * remaining,
        }
    }
}

/// Which state a finished run hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnPolicy {
    /// Lowest-cost state observed at any cycle.
    #[default]
    Best,
    /// State current when the cycle budget ran out.
    Last,
}

/// Configuration for the Simulated Annealing run.
///
/// # Examples
///
/// ```
/// use u_groupmix::sa::{CoolingSchedule, ReturnPolicy, SaConfig};
///
/// let config = SaConfig::default()
///     .with_max_cycles(2_000)
///     .with_initial_temperature(0.5)
///     .with_cooling(CoolingSchedule::ExponentialDecay { scaling: 10.0 })
///     .with_return_policy(ReturnPolicy::Last);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Temperature at progress 0. Costs live in `[0, 1]`, so 1 is
    /// already permissive.
    pub initial_temperature: f64,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Number of neighbor proposals.
    pub max_cycles: usize,

    /// Best-observed or last-accepted state.
    pub return_policy: ReturnPolicy,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling: CoolingSchedule::default(),
            max_cycles: 1000,
            return_policy: ReturnPolicy::default(),
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    /// Shorthand for `ExponentialDecay { scaling }`.
    pub fn with_temperature_scaling(mut self, scaling: f64) -> Self {
        self.cooling = CoolingSchedule::ExponentialDecay { scaling };
        self
    }

    pub fn with_max_cycles(mut self, n: usize) -> Self {
        self.max_cycles = n;
        self
    }

    pub fn with_return_policy(mut self, policy: ReturnPolicy) -> Self {
        self.return_policy = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_temperature.is_finite() || self.initial_temperature < 0.0 {
            return Err(GroupingError::invalid(format!(
                "initial_temperature must be finite and non-negative, got {}",
                self.initial_temperature
            )));
        }
        if self.max_cycles == 0 {
            return Err(GroupingError::invalid("max_cycles must be positive"));
        }
        if let CoolingSchedule::ExponentialDecay { scaling } = self.cooling {
            if !scaling.is_finite() || scaling < 0.0 {
                return Err(GroupingError::invalid(format!(
                    "temperature scaling must be finite and non-negative, got {scaling}"
                )));
            }
        }
        Ok(())
    }
}

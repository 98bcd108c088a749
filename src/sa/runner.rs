//! SA execution loop.

use super::config::{ReturnPolicy, SaConfig};
use super::types::SaProblem;
use crate::error::Result;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone> {
    /// The lowest-cost solution observed, including the initial one.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// The current solution when the loop stopped.
    pub last: S,

    /// Cost of the last solution.
    pub last_cost: f64,

    /// Number of cycles executed (neighbor evaluations).
    pub cycles: usize,

    /// Temperature of the last executed cycle.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost sampled at regular intervals.
    pub cost_history: Vec<f64>,
}

impl<S: Clone> SaResult<S> {
    /// Solution and cost selected by `policy`.
    pub fn into_selected(self, policy: ReturnPolicy) -> (S, f64) {
        match policy {
            ReturnPolicy::Best => (self.best, self.best_cost),
            ReturnPolicy::Last => (self.last, self.last_cost),
        }
    }
}

/// Metropolis acceptance probability for a move from `cost_old` to `cost_new`.
///
/// - strictly better: `1`
/// - not better and frozen (`temperature <= 0`): `0`
/// - otherwise `exp(-(cost_new - cost_old) / temperature)`
pub fn step_probability(cost_old: f64, cost_new: f64, temperature: f64) -> f64 {
    if cost_new < cost_old {
        1.0
    } else if temperature <= 0.0 {
        0.0
    } else {
        (-(cost_new - cost_old) / temperature).exp()
    }
}

/// Executes the Simulated Annealing algorithm.
pub struct SaRunner;

impl SaRunner {
    /// Runs SA from the problem's own initial solution.
    pub fn run<P: SaProblem, R: Rng>(
        problem: &P,
        config: &SaConfig,
        rng: &mut R,
    ) -> Result<SaResult<P::Solution>> {
        config.validate()?;
        let initial = problem.initial_solution(rng);
        Self::run_from(problem, initial, config, rng, None, None)
    }

    /// Runs SA from `initial`.
    ///
    /// For `cycle` in `1..=max_cycles`: the temperature follows the cooling
    /// schedule at progress `cycle / max_cycles`, one neighbor is proposed,
    /// one uniform draw in `[0, 1)` is taken, and the neighbor replaces the
    /// current state iff the draw is `<=` the Metropolis probability.
    ///
    /// `progress` is called with `(cycle, max_cycles)` after every cycle.
    /// `cancel` is checked before every cycle; once set, the loop stops and
    /// the states reached so far are returned.
    pub fn run_from<P: SaProblem, R: Rng>(
        problem: &P,
        initial: P::Solution,
        config: &SaConfig,
        rng: &mut R,
        mut progress: Option<&mut dyn FnMut(usize, usize)>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult<P::Solution>> {
        config.validate()?;

        let mut current = initial;
        let mut current_cost = problem.cost(&current);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let total = config.max_cycles;
        let mut temperature = config.initial_temperature;
        let mut cycles = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cancelled = false;

        let history_interval = (total / 100).max(1);
        let mut cost_history = vec![best_cost];

        debug!(
            max_cycles = total,
            initial_temperature = config.initial_temperature,
            initial_cost = current_cost,
            "annealing started"
        );

        for cycle in 1..=total {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let fraction = cycle as f64 / total as f64;
            temperature = config
                .cooling
                .temperature(config.initial_temperature, fraction);

            let neighbor = problem.neighbor(&current, rng);
            let neighbor_cost = problem.cost(&neighbor);
            let probability = step_probability(current_cost, neighbor_cost, temperature);
            let draw: f64 = rng.random();

            if draw <= probability {
                if neighbor_cost < current_cost {
                    improving_moves += 1;
                }
                trace!(cycle, from = current_cost, to = neighbor_cost, temperature, "accepted");
                current = neighbor;
                current_cost = neighbor_cost;
                accepted_moves += 1;

                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                }
            }

            cycles = cycle;
            if cycle % history_interval == 0 {
                cost_history.push(best_cost);
            }

            if let Some(cb) = progress.as_deref_mut() {
                cb(cycle, total);
            }
        }

        if cost_history
            .last()
            .is_none_or(|&last| (last - best_cost).abs() > 1e-15)
        {
            cost_history.push(best_cost);
        }

        if cancelled {
            warn!(cycles, max_cycles = total, "annealing cancelled");
        }
        debug!(
            cycles,
            accepted_moves,
            improving_moves,
            best_cost,
            last_cost = current_cost,
            "annealing finished"
        );

        Ok(SaResult {
            best,
            best_cost,
            last: current,
            last_cost: current_cost,
            cycles,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            cancelled,
            cost_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::CoolingSchedule;
    use u_numflow::random::create_rng;

    // ---- Quadratic minimization: f(x) = x^2, minimum at 0 ----

    struct QuadraticProblem;

    impl SaProblem for QuadraticProblem {
        type Solution = f64;

        fn initial_solution<R: Rng>(&self, rng: &mut R) -> f64 {
            rng.random_range(-10.0..10.0)
        }

        fn cost(&self, x: &f64) -> f64 {
            x * x
        }

        fn neighbor<R: Rng>(&self, x: &f64, rng: &mut R) -> f64 {
            x + rng.random_range(-1.0..1.0)
        }
    }

    #[test]
    fn test_step_probability_improvement() {
        assert_eq!(step_probability(0.5, 0.4, 0.0), 1.0);
        assert_eq!(step_probability(0.5, 0.4, 10.0), 1.0);
    }

    #[test]
    fn test_step_probability_frozen() {
        assert_eq!(step_probability(0.4, 0.5, 0.0), 0.0);
        assert_eq!(step_probability(0.4, 0.4, 0.0), 0.0);
        assert_eq!(step_probability(0.4, 0.5, -1.0), 0.0);
    }

    #[test]
    fn test_step_probability_uphill_decreases() {
        let t = 0.1;
        let small = step_probability(0.4, 0.41, t);
        let large = step_probability(0.4, 0.6, t);
        assert!(small > 0.0 && small < 1.0);
        assert!(large > 0.0 && large < 1.0);
        assert!(small > large);
        assert!((large - (-2.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_sa_quadratic() {
        let config = SaConfig::default()
            .with_initial_temperature(10.0)
            .with_temperature_scaling(5.0)
            .with_max_cycles(20_000);

        let result = SaRunner::run(&QuadraticProblem, &config, &mut create_rng(42)).unwrap();

        assert!(
            result.best_cost < 1.0,
            "expected near-zero cost, got {}",
            result.best_cost
        );
        assert!(result.improving_moves > 0);
        assert_eq!(result.cycles, 20_000);
    }

    #[test]
    fn test_sa_linear_schedule() {
        let config = SaConfig::default()
            .with_initial_temperature(10.0)
            .with_cooling(CoolingSchedule::Linear)
            .with_max_cycles(20_000);

        let result = SaRunner::run(&QuadraticProblem, &config, &mut create_rng(42)).unwrap();
        assert!(result.best_cost < 1.0);
        assert_eq!(result.final_temperature, 0.0);
    }

    #[test]
    fn test_sa_best_never_worse_than_last() {
        let config = SaConfig::default().with_max_cycles(500);
        let result = SaRunner::run(&QuadraticProblem, &config, &mut create_rng(7)).unwrap();
        assert!(result.best_cost <= result.last_cost);
        let (_, cost) = result.clone().into_selected(ReturnPolicy::Last);
        assert_eq!(cost, result.last_cost);
    }

    #[test]
    fn test_sa_cancellation() {
        let config = SaConfig::default().with_max_cycles(1_000);

        // Set cancel flag before running so cancellation is deterministic.
        let cancel = Arc::new(AtomicBool::new(true));

        let result = SaRunner::run_from(
            &QuadraticProblem,
            3.0,
            &config,
            &mut create_rng(42),
            None,
            Some(cancel),
        )
        .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.cycles, 0);
        assert_eq!(result.last, 3.0);
    }

    #[test]
    fn test_sa_cancel_from_progress_callback() {
        let config = SaConfig::default().with_max_cycles(1_000);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let mut stop_at_ten = |cycle: usize, _total: usize| {
            if cycle == 10 {
                flag.store(true, Ordering::Relaxed);
            }
        };

        let result = SaRunner::run_from(
            &QuadraticProblem,
            3.0,
            &config,
            &mut create_rng(42),
            Some(&mut stop_at_ten),
            Some(cancel),
        )
        .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.cycles, 10);
    }

    #[test]
    fn test_sa_progress_reports_every_cycle() {
        let config = SaConfig::default().with_max_cycles(50);
        let mut seen = Vec::new();
        let mut record = |cycle: usize, total: usize| seen.push((cycle, total));
        SaRunner::run_from(
            &QuadraticProblem,
            1.0,
            &config,
            &mut create_rng(1),
            Some(&mut record),
            None,
        )
        .unwrap();
        assert_eq!(seen.len(), 50);
        assert_eq!(seen.first(), Some(&(1, 50)));
        assert_eq!(seen.last(), Some(&(50, 50)));
    }

    #[test]
    fn test_sa_progress_does_not_change_result() {
        let config = SaConfig::default().with_max_cycles(300);
        let plain = SaRunner::run_from(&QuadraticProblem, 5.0, &config, &mut create_rng(9), None, None)
            .unwrap();
        let mut noop = |_: usize, _: usize| {};
        let observed = SaRunner::run_from(
            &QuadraticProblem,
            5.0,
            &config,
            &mut create_rng(9),
            Some(&mut noop),
            None,
        )
        .unwrap();
        assert_eq!(plain.last, observed.last);
        assert_eq!(plain.best, observed.best);
    }

    #[test]
    fn test_sa_cost_history_non_increasing() {
        let config = SaConfig::default().with_max_cycles(5_000);
        let result = SaRunner::run(&QuadraticProblem, &config, &mut create_rng(42)).unwrap();

        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0] + 1e-10,
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_sa_invalid_config() {
        let config = SaConfig::default().with_max_cycles(0);
        assert!(SaRunner::run(&QuadraticProblem, &config, &mut create_rng(1)).is_err());
    }
}

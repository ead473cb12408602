//! Finite-difference gradient descent over behavior parameters.
//!
//! The optimizer never sees the cost formula: it only needs scalar losses,
//! which it aggregates over sampled record pairs. Gradients are estimated
//! by one forward-difference evaluation per weight component, clipped by
//! max-norm, and applied with heavy-ball momentum under a cosine-cyclic
//! learning rate.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg64;

use hextune_evaluator::{BehaviorParameters, CostFunction, PARAM_COUNT, unit_state_map};
use hextune_stats::DescriptiveStats;
use hextune_trajectory::ActionAndState;

use crate::parameters;

pub const MAX_ITERATIONS: usize = 100_000;
pub const BATCH_SIZE: usize = 50;
pub const PATIENCE: usize = 50;
pub const TOLERANCE: f64 = 1e-6;
pub const BASE_LEARNING_RATE: f64 = 1e-3;
pub const MAX_LEARNING_RATE: f64 = 1e-1;
pub const CYCLE_LENGTH: usize = 2_000;
pub const MOMENTUM: f64 = 0.9;
pub const NOISE_INTERVAL: usize = 100;
pub const NOISE_SIGMA: f64 = 0.01;
pub const L2_PENALTY: f64 = 1e-4;
pub const REPORT_INTERVAL: usize = 1_000;

/// Entity ids the recorded skirmishes assign to bot-controlled units.
///
/// Every loss evaluation draws one id from this set and scores only the
/// pairs whose action belongs to it; the rest of the batch is discarded for
/// that evaluation. The draw happens per call, so the baseline and each
/// per-component evaluation inside one gradient estimate can land on
/// different actors.
const SAMPLED_ACTOR_IDS: [u32; 6] = [8, 9, 10, 11, 12, 13];

/// Tunable knobs of one optimization run.
///
/// `cycle_length` must be positive; a `report_interval` of zero silences
/// progress output.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
    pub batch_size: usize,
    /// Iterations without improvement before a restart.
    pub patience: usize,
    pub tolerance: f64,
    pub base_learning_rate: f64,
    pub max_learning_rate: f64,
    /// Period of the cosine learning-rate cycle, in iterations.
    pub cycle_length: usize,
    pub momentum: f64,
    /// Iterations between unconditional exploration-noise injections.
    pub noise_interval: usize,
    pub noise_sigma: f64,
    pub l2_penalty: f64,
    pub report_interval: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            batch_size: BATCH_SIZE,
            patience: PATIENCE,
            tolerance: TOLERANCE,
            base_learning_rate: BASE_LEARNING_RATE,
            max_learning_rate: MAX_LEARNING_RATE,
            cycle_length: CYCLE_LENGTH,
            momentum: MOMENTUM,
            noise_interval: NOISE_INTERVAL,
            noise_sigma: NOISE_SIGMA,
            l2_penalty: L2_PENALTY,
            report_interval: REPORT_INTERVAL,
        }
    }
}

/// Why a fit stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Termination {
    /// Best loss fell below the configured tolerance.
    Converged,
    /// The iteration cap was reached; the best vector seen is returned.
    IterationLimit,
    /// The caller raised the cancellation flag.
    Cancelled,
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub parameters: BehaviorParameters,
    /// Best evaluation loss seen during the run.
    pub loss: f64,
    /// Iterations actually executed.
    pub iterations: usize,
    pub termination: Termination,
}

/// The loss pipeline produced a NaN or infinite value.
///
/// Raised instead of letting a non-finite loss flow through the momentum
/// and clamp steps, where it would silently poison every later iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("non-finite loss at iteration {iteration}")]
pub struct DivergenceError {
    pub iteration: usize,
}

/// Fits a [`BehaviorParameters`] vector to a trajectory dataset.
///
/// The records, the cost function, and the RNG seed are all injected, so a
/// run is fully determined by its constructor arguments.
#[derive(Debug)]
pub struct Optimizer<'a> {
    config: OptimizerConfig,
    cost_function: &'a dyn CostFunction,
    records: &'a [ActionAndState],
    rng: Pcg64,
}

impl<'a> Optimizer<'a> {
    #[must_use]
    pub fn new(
        config: OptimizerConfig,
        cost_function: &'a dyn CostFunction,
        records: &'a [ActionAndState],
        seed: u64,
    ) -> Self {
        Self {
            config,
            cost_function,
            records,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Runs the optimization loop to completion.
    ///
    /// `cancel` is polled once per iteration; raising it ends the run with
    /// [`Termination::Cancelled`] and the best vector found so far.
    pub fn fit(&mut self, cancel: &AtomicBool) -> Result<FitOutcome, DivergenceError> {
        let mut params = parameters::random(&mut self.rng);
        let mut velocity = BehaviorParameters::zeros();
        let mut best_params = params;
        let mut best_loss = f64::INFINITY;
        let mut stagnant = 0_usize;
        let mut recent_losses: Vec<f64> = Vec::new();

        let mut completed = 0;
        let mut termination = Termination::IterationLimit;

        for iteration in 0..self.config.max_iterations {
            if cancel.load(Ordering::Relaxed) {
                termination = Termination::Cancelled;
                break;
            }

            // The schedule reassigns the rate every iteration, so the
            // restart halving below never survives into the next one.
            let mut learning_rate = self.cyclic_learning_rate(iteration);

            if self.config.noise_interval > 0
                && iteration > 0
                && iteration % self.config.noise_interval == 0
            {
                params = parameters::jitter(&params, self.config.noise_sigma, &mut self.rng);
            }

            let batch = self.sample_batch();
            let base_loss = self.compute_loss(&params, &batch);
            if !base_loss.is_finite() {
                return Err(DivergenceError { iteration });
            }

            let gradient = self.estimate_gradient(&params, &batch, base_loss, iteration)?;
            velocity = velocity
                .scale(self.config.momentum)
                .add(&gradient.scale(learning_rate));
            params = params.sub(&velocity).clamped(0.0, 1.0);

            let eval_batch = self.sample_batch();
            let eval_loss = self.compute_loss(&params, &eval_batch);
            if !eval_loss.is_finite() {
                return Err(DivergenceError { iteration });
            }
            recent_losses.push(eval_loss);

            if eval_loss < best_loss {
                best_loss = eval_loss;
                best_params = params;
                stagnant = 0;
            } else {
                stagnant += 1;
            }

            if stagnant >= self.config.patience {
                learning_rate /= 2.0;
                params = parameters::jitter(&params, self.config.noise_sigma, &mut self.rng);
                stagnant = 0;
            }

            completed = iteration + 1;

            if self.config.report_interval > 0 && completed % self.config.report_interval == 0 {
                let window = DescriptiveStats::new(recent_losses.drain(..));
                eprintln!(
                    "iteration {completed}: best loss {best_loss:.6e}, learning rate {learning_rate:.4e}"
                );
                if let Some(stats) = window {
                    eprintln!(
                        "  recent eval loss: mean {:.6e}, min {:.6e}, max {:.6e}",
                        stats.mean, stats.min, stats.max
                    );
                }
            }

            if best_loss < self.config.tolerance {
                termination = Termination::Converged;
                break;
            }
        }

        Ok(FitOutcome {
            parameters: best_params,
            loss: best_loss,
            iterations: completed,
            termination,
        })
    }

    /// Forward-difference gradient over one batch, clipped by max-norm.
    fn estimate_gradient(
        &mut self,
        params: &BehaviorParameters,
        batch: &[usize],
        base_loss: f64,
        iteration: usize,
    ) -> Result<BehaviorParameters, DivergenceError> {
        let mut components = [0.0; PARAM_COUNT];
        for (i, g) in components.iter_mut().enumerate() {
            let epsilon = adaptive_epsilon(params.get(i));
            let perturbed_loss = self.compute_loss(&params.perturbed(i, epsilon), batch);
            if !perturbed_loss.is_finite() {
                return Err(DivergenceError { iteration });
            }
            *g = (perturbed_loss - base_loss) / epsilon;
        }
        Ok(clip_max_norm(&BehaviorParameters::from_values(components)))
    }

    /// Loss of one batch: mean squared cost over the pairs belonging to one
    /// sampled actor, plus the L2 penalty on the weights.
    ///
    /// An empty or fully filtered batch contributes no cost term, only the
    /// penalty, so undersized datasets are safe.
    fn compute_loss(&mut self, params: &BehaviorParameters, batch: &[usize]) -> f64 {
        let actor_id = *SAMPLED_ACTOR_IDS
            .choose(&mut self.rng)
            .expect("actor id set is non-empty");

        let mut total = 0.0;
        let mut scored = 0_usize;
        for &start in batch {
            let current = &self.records[start];
            if current.action.actor_id != actor_id {
                continue;
            }
            let next = &self.records[start + 1];
            let before = unit_state_map(&current.states);
            let after = unit_state_map(&next.states);
            let cost = self
                .cost_function
                .resolve(&current.action, &before, &after, params);
            total += cost * cost;
            scored += 1;
        }

        #[expect(clippy::cast_precision_loss)]
        let mean_squared = if scored == 0 {
            0.0
        } else {
            total / scored as f64
        };
        let penalty: f64 = params.iter().map(|w| w * w).sum();
        mean_squared + self.config.l2_penalty * penalty
    }

    /// Draws start indices of consecutive record pairs, with replacement.
    ///
    /// A dataset too small to form any pair yields an empty batch.
    fn sample_batch(&mut self) -> Vec<usize> {
        if self.records.len() < 2 {
            return Vec::new();
        }
        (0..self.config.batch_size)
            .map(|_| self.rng.random_range(0..self.records.len() - 1))
            .collect()
    }

    #[expect(clippy::cast_precision_loss)]
    fn cyclic_learning_rate(&self, iteration: usize) -> f64 {
        let base = self.config.base_learning_rate;
        let max = self.config.max_learning_rate;
        let phase = std::f64::consts::TAU * iteration as f64 / self.config.cycle_length as f64;
        base + (max - base) * (1.0 + phase.cos()) / 2.0
    }
}

/// Forward-difference step size that scales with the component but never
/// collapses to zero.
fn adaptive_epsilon(value: f64) -> f64 {
    f64::max(1e-8, 1e-5 * value.abs())
}

/// Rescales a gradient so its largest absolute component is exactly 1.
///
/// Signs and relative magnitudes are preserved; an all-zero gradient passes
/// through unchanged.
fn clip_max_norm(gradient: &BehaviorParameters) -> BehaviorParameters {
    let max = gradient.max_abs();
    if max > 0.0 {
        gradient.scale(1.0 / max)
    } else {
        *gradient
    }
}

#[cfg(test)]
mod tests {
    use hextune_evaluator::{UnitStateMap, Weight};
    use hextune_trajectory::{BoardPos, UnitAction};

    use super::*;

    /// Transition-blind cost: squared distance of the weights from zero.
    #[derive(Debug)]
    struct QuadraticCost;

    impl CostFunction for QuadraticCost {
        fn resolve(
            &self,
            _action: &UnitAction,
            _before: &UnitStateMap<'_>,
            _after: &UnitStateMap<'_>,
            params: &BehaviorParameters,
        ) -> f64 {
            params.iter().map(|p| p * p).sum()
        }
    }

    #[derive(Debug)]
    struct PoisonedCost;

    impl CostFunction for PoisonedCost {
        fn resolve(
            &self,
            _action: &UnitAction,
            _before: &UnitStateMap<'_>,
            _after: &UnitStateMap<'_>,
            _params: &BehaviorParameters,
        ) -> f64 {
            f64::NAN
        }
    }

    fn record(actor_id: u32, round: u32) -> ActionAndState {
        ActionAndState {
            round,
            action: UnitAction {
                actor_id,
                facing: 0,
                from: BoardPos::new(0, 0),
                to: BoardPos::new(1, 0),
                hexes_moved: 1,
                distance: 1,
                mp_used: 1,
                max_mp: 4,
                mp_ratio: 0.25,
                heat_ratio: 0.0,
                armor_ratio: 1.0,
                internal_ratio: 1.0,
                jumping: false,
                prone: false,
                legal: true,
            },
            states: vec![],
        }
    }

    fn dataset() -> Vec<ActionAndState> {
        (1..=4).map(|round| record(8, round)).collect()
    }

    fn quick_config(max_iterations: usize) -> OptimizerConfig {
        OptimizerConfig {
            max_iterations,
            report_interval: 0,
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn clipping_normalizes_the_largest_component() {
        let mut values = [0.0; PARAM_COUNT];
        values[0] = 0.5;
        values[1] = -2.0;
        values[2] = 1.0;
        let clipped = clip_max_norm(&BehaviorParameters::from_values(values));

        assert!((clipped.max_abs() - 1.0).abs() < 1e-12);
        assert!((clipped.get(1) + 1.0).abs() < 1e-12);
        assert!((clipped.get(0) - 0.25).abs() < 1e-12);
        assert!((clipped.get(2) - 0.5).abs() < 1e-12);
        assert!((clipped.get(3) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clipping_leaves_zero_gradients_alone() {
        let zero = BehaviorParameters::zeros();
        assert_eq!(clip_max_norm(&zero), zero);
    }

    #[test]
    fn epsilon_never_degenerates_to_zero() {
        assert!((adaptive_epsilon(0.0) - 1e-8).abs() < 1e-20);
        assert!((adaptive_epsilon(-0.5) - 5e-6).abs() < 1e-18);
        assert!((adaptive_epsilon(1.0) - 1e-5).abs() < 1e-18);
    }

    #[test]
    fn converges_on_a_zero_target_quadratic() {
        let records = dataset();
        let mut optimizer =
            Optimizer::new(quick_config(20_000), &QuadraticCost, &records, 42);
        let outcome = optimizer.fit(&AtomicBool::new(false)).unwrap();

        assert!(outcome.termination.is_converged(), "{outcome:?}");
        assert!(outcome.loss < TOLERANCE);
        assert!(outcome.iterations < 20_000);
    }

    #[test]
    fn longer_runs_never_lose_ground() {
        let records = dataset();
        let mut config = quick_config(50);
        config.tolerance = 0.0;
        let short = Optimizer::new(config.clone(), &QuadraticCost, &records, 7)
            .fit(&AtomicBool::new(false))
            .unwrap();
        config.max_iterations = 500;
        let long = Optimizer::new(config, &QuadraticCost, &records, 7)
            .fit(&AtomicBool::new(false))
            .unwrap();

        // same seed, longer run: the best loss is monotone in iterations
        assert!(long.loss <= short.loss);
    }

    #[test]
    fn identical_seeds_produce_identical_fits() {
        let records = dataset();
        let run = |seed| {
            Optimizer::new(quick_config(300), &QuadraticCost, &records, seed)
                .fit(&AtomicBool::new(false))
                .unwrap()
        };
        let a = run(11);
        let b = run(11);
        assert_eq!(a, b);
        assert_eq!(a.parameters.values(), b.parameters.values());
    }

    #[test]
    fn fitted_parameters_stay_clamped() {
        let records = dataset();
        let mut optimizer = Optimizer::new(quick_config(300), &QuadraticCost, &records, 3);
        let outcome = optimizer.fit(&AtomicBool::new(false)).unwrap();
        assert!(outcome.parameters.iter().all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn single_record_dataset_is_safe() {
        let records = vec![record(8, 1)];
        let mut optimizer = Optimizer::new(quick_config(50), &QuadraticCost, &records, 1);
        let outcome = optimizer.fit(&AtomicBool::new(false)).unwrap();

        // no pair can form, so only the regularization term is ever scored
        assert!(outcome.loss.is_finite());
    }

    #[test]
    fn preset_cancel_flag_stops_before_the_first_iteration() {
        let records = dataset();
        let mut optimizer = Optimizer::new(quick_config(1_000), &QuadraticCost, &records, 1);
        let outcome = optimizer.fit(&AtomicBool::new(true)).unwrap();

        assert!(outcome.termination.is_cancelled());
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn non_finite_losses_halt_the_run() {
        let records = dataset();
        let mut optimizer = Optimizer::new(quick_config(200), &PoisonedCost, &records, 1);
        let err = optimizer.fit(&AtomicBool::new(false)).unwrap_err();
        assert!(err.iteration < 200);
    }

    #[test]
    fn actor_filter_only_scores_matching_pairs() {
        // actors outside the sampled id set are never scored, so a poisoned
        // cost function cannot be reached and the loss stays finite
        let records: Vec<_> = (1..=4).map(|round| record(99, round)).collect();
        let mut optimizer = Optimizer::new(quick_config(30), &PoisonedCost, &records, 1);
        let outcome = optimizer.fit(&AtomicBool::new(false)).unwrap();
        assert!(outcome.loss.is_finite());
    }

    #[test]
    fn weight_vector_length_matches_the_gradient() {
        // every named weight has a gradient slot
        assert_eq!(Weight::ALL.len(), PARAM_COUNT);
    }
}

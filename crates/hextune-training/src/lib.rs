//! Fitting behavior parameters to recorded trajectories.
//!
//! This crate implements the optimization loop that turns a parsed
//! trajectory dataset and a cost function into a fitted
//! [`BehaviorParameters`](hextune_evaluator::BehaviorParameters) vector.
//!
//! # How Fitting Works
//!
//! 1. **Initialize** - draw a random weight vector (seeded, reproducible)
//! 2. **Sample** - pick a batch of consecutive record pairs from the data
//! 3. **Estimate** - approximate the loss gradient by forward differences,
//!    one perturbed evaluation per weight component
//! 4. **Update** - heavy-ball momentum step, then clamp into `[0, 1]`
//! 5. **Track** - evaluate a fresh batch and keep the best vector seen
//! 6. **Adapt** - cyclic learning rate, periodic exploration noise, and a
//!    stagnation restart rule
//!
//! The loop ends when the best loss drops below tolerance, the iteration
//! cap is reached, or the caller's cancellation flag is raised.
//!
//! # Determinism
//!
//! All randomness flows from one seeded PCG generator owned by the
//! [`optimizer::Optimizer`], and batch evaluation is strictly sequential,
//! so two runs with the same seed, data, and cost function produce
//! bit-identical parameter trajectories. That property is what makes the
//! convergence tests meaningful.

pub mod optimizer;
pub mod parameters;

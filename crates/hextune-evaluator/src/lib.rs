//! Scoring layer: behavior parameters and transition cost functions.
//!
//! This crate defines the two halves of the scoring seam the optimizer
//! drives:
//!
//! 1. **Behavior parameters** ([`behavior_parameters`]) - the fixed-length
//!    weight vector being fitted, with the value-type arithmetic the
//!    optimizer needs (perturbation, clamping, max-abs queries).
//!
//! 2. **Cost functions** ([`cost_function`]) - pluggable, pure scorers that
//!    rate one recorded transition (action plus before/after board state)
//!    against a candidate weight vector. Lower is better; a perfectly
//!    parameterized bot would assign cost 0 to every action the recorded
//!    players actually took.
//!
//! Concrete scorers share the per-transition feature extraction in
//! [`transition`]: each of the 29 weights multiplies one normalized
//! badness feature, so a fitted vector can be read off weight by weight.

pub use self::{
    behavior_parameters::{BehaviorParameters, PARAM_COUNT, Weight},
    cost_function::{
        AggressionCostFunction, CostFunction, PathRankingCostFunction, UnitStateMap,
        unit_state_map,
    },
    transition::TransitionFeatures,
};

pub mod behavior_parameters;
pub mod cost_function;
pub mod transition;

//! Random initialization and exploration noise for parameter vectors.
//!
//! These are the only operations on [`BehaviorParameters`] that consume
//! randomness; they live here rather than on the vector type itself so the
//! evaluator crate stays free of RNG concerns.

use hextune_evaluator::{BehaviorParameters, PARAM_COUNT};
use rand::Rng;
use rand_distr::Normal;

/// Upper bound for even-indexed components at initialization.
///
/// Half the weights start above unit range so the first iterations can
/// explore coefficients the `[0, 1]` clamp would otherwise never visit;
/// the first update step clips them back.
pub const WIDE_INIT_MAX: f64 = 1.5;

/// Draws a fresh parameter vector with uniform-random components.
///
/// Even-indexed components are drawn from `[0, WIDE_INIT_MAX]`, odd-indexed
/// from `[0, 1]`.
pub fn random<R>(rng: &mut R) -> BehaviorParameters
where
    R: Rng + ?Sized,
{
    let mut values = [0.0; PARAM_COUNT];
    for (i, v) in values.iter_mut().enumerate() {
        let max = if i % 2 == 0 { WIDE_INIT_MAX } else { 1.0 };
        *v = rng.random_range(0.0..=max);
    }
    BehaviorParameters::from_values(values)
}

/// Returns a copy with independent Gaussian noise added to every component.
///
/// No clamping happens here; the optimizer's update step clips the vector
/// back into the admissible range.
pub fn jitter<R>(params: &BehaviorParameters, sigma: f64, rng: &mut R) -> BehaviorParameters
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).unwrap();
    let mut values = *params.values();
    for v in &mut values {
        *v += rng.sample(normal);
    }
    BehaviorParameters::from_values(values)
}

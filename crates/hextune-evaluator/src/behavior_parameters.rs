//! The tunable weight vector and its value-type arithmetic.
//!
//! [`BehaviorParameters`] is deliberately a value type: every operation
//! returns a fresh vector, so the optimizer's current estimate, velocity,
//! and gradient can never alias each other.

/// Number of weight components in a behavior parameter vector.
pub const PARAM_COUNT: usize = 29;

/// Identifier for one component of a [`BehaviorParameters`] vector.
///
/// Each weight multiplies exactly one normalized transition feature (see
/// [`TransitionFeatures`](crate::TransitionFeatures)), so the enum doubles
/// as the canonical component ordering and as the stable id list for
/// serialized models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    MpEconomy,
    MpReserve,
    PathWinding,
    Standstill,
    JumpReluctance,
    ProneStigma,
    IllegalMove,
    HeatLoad,
    HeatSpike,
    ArmorRisk,
    StructureRisk,
    DamageTaken,
    StructureLost,
    FacingChange,
    EnemyStandoffBefore,
    EnemyStandoffAfter,
    EnemyClosing,
    EnemyRetreat,
    InOwnReach,
    InEnemyReach,
    OutgunnedTrade,
    TargetSoftness,
    TargetStructure,
    AllyCohesion,
    AllyCrowding,
    IsolationRisk,
    NumericalPressure,
    CrippledCaution,
    DoneTempo,
}

impl Weight {
    /// All weights in canonical component order.
    pub const ALL: [Weight; PARAM_COUNT] = [
        Weight::MpEconomy,
        Weight::MpReserve,
        Weight::PathWinding,
        Weight::Standstill,
        Weight::JumpReluctance,
        Weight::ProneStigma,
        Weight::IllegalMove,
        Weight::HeatLoad,
        Weight::HeatSpike,
        Weight::ArmorRisk,
        Weight::StructureRisk,
        Weight::DamageTaken,
        Weight::StructureLost,
        Weight::FacingChange,
        Weight::EnemyStandoffBefore,
        Weight::EnemyStandoffAfter,
        Weight::EnemyClosing,
        Weight::EnemyRetreat,
        Weight::InOwnReach,
        Weight::InEnemyReach,
        Weight::OutgunnedTrade,
        Weight::TargetSoftness,
        Weight::TargetStructure,
        Weight::AllyCohesion,
        Weight::AllyCrowding,
        Weight::IsolationRisk,
        Weight::NumericalPressure,
        Weight::CrippledCaution,
        Weight::DoneTempo,
    ];

    /// Stable identifier used in serialized models.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Weight::MpEconomy => "mp-economy",
            Weight::MpReserve => "mp-reserve",
            Weight::PathWinding => "path-winding",
            Weight::Standstill => "standstill",
            Weight::JumpReluctance => "jump-reluctance",
            Weight::ProneStigma => "prone-stigma",
            Weight::IllegalMove => "illegal-move",
            Weight::HeatLoad => "heat-load",
            Weight::HeatSpike => "heat-spike",
            Weight::ArmorRisk => "armor-risk",
            Weight::StructureRisk => "structure-risk",
            Weight::DamageTaken => "damage-taken",
            Weight::StructureLost => "structure-lost",
            Weight::FacingChange => "facing-change",
            Weight::EnemyStandoffBefore => "enemy-standoff-before",
            Weight::EnemyStandoffAfter => "enemy-standoff-after",
            Weight::EnemyClosing => "enemy-closing",
            Weight::EnemyRetreat => "enemy-retreat",
            Weight::InOwnReach => "in-own-reach",
            Weight::InEnemyReach => "in-enemy-reach",
            Weight::OutgunnedTrade => "outgunned-trade",
            Weight::TargetSoftness => "target-softness",
            Weight::TargetStructure => "target-structure",
            Weight::AllyCohesion => "ally-cohesion",
            Weight::AllyCrowding => "ally-crowding",
            Weight::IsolationRisk => "isolation-risk",
            Weight::NumericalPressure => "numerical-pressure",
            Weight::CrippledCaution => "crippled-caution",
            Weight::DoneTempo => "done-tempo",
        }
    }
}

/// Fixed-length vector of behavior weight coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorParameters {
    values: [f64; PARAM_COUNT],
}

impl BehaviorParameters {
    #[must_use]
    pub fn zeros() -> Self {
        Self {
            values: [0.0; PARAM_COUNT],
        }
    }

    #[must_use]
    pub fn from_values(values: [f64; PARAM_COUNT]) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64; PARAM_COUNT] {
        &self.values
    }

    /// Component at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= PARAM_COUNT`.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Component for a named weight.
    #[must_use]
    pub fn weight(&self, weight: Weight) -> f64 {
        self.values[weight as usize]
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }

    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Copy of the vector with the component at `index` shifted by
    /// `epsilon`; every other component is untouched.
    #[must_use]
    pub fn perturbed(&self, index: usize, epsilon: f64) -> Self {
        let mut values = self.values;
        values[index] += epsilon;
        Self { values }
    }

    /// Element-wise clip of every component into `[lo, hi]`.
    #[must_use]
    pub fn clamped(&self, lo: f64, hi: f64) -> Self {
        self.map(|v| v.clamp(lo, hi))
    }

    /// Largest absolute component value.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut values = self.values;
        for v in &mut values {
            *v = f(*v);
        }
        Self { values }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut values = self.values;
        for (v, o) in values.iter_mut().zip(other.values) {
            *v = f(*v, o);
        }
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> BehaviorParameters {
        let mut values = [0.0; PARAM_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            {
                *v = i as f64 * 0.1 - 0.5;
            }
        }
        BehaviorParameters::from_values(values)
    }

    #[test]
    fn weight_ids_are_unique() {
        for (i, a) in Weight::ALL.iter().enumerate() {
            for b in &Weight::ALL[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
    }

    #[test]
    fn perturbed_touches_only_the_given_index() {
        let p = ramp();
        for index in 0..PARAM_COUNT {
            let q = p.perturbed(index, 1e-3);
            for i in 0..PARAM_COUNT {
                if i == index {
                    assert!((q.get(i) - p.get(i) - 1e-3).abs() < 1e-12);
                } else {
                    assert!((q.get(i) - p.get(i)).abs() < f64::EPSILON, "index {i}");
                }
            }
        }
    }

    #[test]
    fn clamped_lands_every_component_inside_the_bounds() {
        let p = ramp().scale(10.0);
        let clamped = p.clamped(0.0, 1.0);
        assert!(clamped.iter().all(|v| (0.0..=1.0).contains(&v)));
        // components already inside the range are untouched
        assert!((clamped.get(6) - p.get(6)).abs() < f64::EPSILON);
    }

    #[test]
    fn arithmetic_is_element_wise() {
        let p = ramp();
        let sum = p.add(&p);
        let diff = sum.sub(&p);
        for i in 0..PARAM_COUNT {
            assert!((sum.get(i) - 2.0 * p.get(i)).abs() < 1e-12);
            assert!((diff.get(i) - p.get(i)).abs() < 1e-12);
        }
    }

    #[test]
    fn max_abs_sees_negative_components() {
        let p = BehaviorParameters::zeros().perturbed(4, -2.5).perturbed(9, 1.0);
        assert!((p.max_abs() - 2.5).abs() < f64::EPSILON);
    }
}

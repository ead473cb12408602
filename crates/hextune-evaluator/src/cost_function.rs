//! The pluggable scoring seam the optimizer drives.
//!
//! A [`CostFunction`] rates one recorded transition against a candidate
//! weight vector. Implementations must be pure: no side effects, the same
//! inputs always produce the same score, and the score stays finite for any
//! clamped parameter vector. The optimizer estimates gradients by finite
//! differences, so scorers should also avoid hard discontinuities at
//! generic parameter values.

use std::collections::BTreeMap;
use std::fmt;

use hextune_trajectory::{UnitAction, UnitState};

use crate::{behavior_parameters::BehaviorParameters, transition::TransitionFeatures};

/// Board snapshot keyed by actor id.
///
/// Ordered map on purpose: scorers aggregate floats over the board, and a
/// fixed iteration order keeps results bit-identical across runs with one
/// seed.
pub type UnitStateMap<'a> = BTreeMap<u32, &'a UnitState>;

/// Builds the actor-id keyed map for one state block.
#[must_use]
pub fn unit_state_map(states: &[UnitState]) -> UnitStateMap<'_> {
    states.iter().map(|s| (s.actor_id, s)).collect()
}

/// Scores one transition; lower is better.
pub trait CostFunction: fmt::Debug + Send + Sync {
    fn resolve(
        &self,
        action: &UnitAction,
        before: &UnitStateMap<'_>,
        after: &UnitStateMap<'_>,
        params: &BehaviorParameters,
    ) -> f64;
}

/// Balanced movement scorer: weighted sum of all transition features.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathRankingCostFunction;

impl CostFunction for PathRankingCostFunction {
    fn resolve(
        &self,
        action: &UnitAction,
        before: &UnitStateMap<'_>,
        after: &UnitStateMap<'_>,
        params: &BehaviorParameters,
    ) -> f64 {
        TransitionFeatures::extract(action, before, after).dot(params)
    }
}

/// Offense-leaning scorer: same feature set, re-read so that closing with
/// the enemy is free and keeping distance is expensive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressionCostFunction;

impl CostFunction for AggressionCostFunction {
    fn resolve(
        &self,
        action: &UnitAction,
        before: &UnitStateMap<'_>,
        after: &UnitStateMap<'_>,
        params: &BehaviorParameters,
    ) -> f64 {
        TransitionFeatures::extract(action, before, after)
            .aggressive()
            .dot(params)
    }
}

#[cfg(test)]
mod tests {
    use hextune_trajectory::BoardPos;

    use super::*;
    use crate::behavior_parameters::{PARAM_COUNT, Weight};

    fn action(actor_id: u32, legal: bool) -> UnitAction {
        UnitAction {
            actor_id,
            facing: 2,
            from: BoardPos::new(3, 3),
            to: BoardPos::new(3, 4),
            hexes_moved: 1,
            distance: 1,
            mp_used: 1,
            max_mp: 5,
            mp_ratio: 0.2,
            heat_ratio: 0.0,
            armor_ratio: 0.8,
            internal_ratio: 1.0,
            jumping: false,
            prone: false,
            legal,
        }
    }

    fn unit(actor_id: u32, team_id: u32, pos: BoardPos) -> UnitState {
        UnitState {
            actor_id,
            team_id: Some(team_id),
            player_id: team_id,
            round: 1,
            chassis: "Mad Cat".to_owned(),
            model: "Prime".to_owned(),
            unit_type: "BM".to_owned(),
            role: "BRAWLER".to_owned(),
            position: pos,
            facing: 2,
            mp: 5,
            heat: 0,
            prone: false,
            airborne: false,
            off_board: false,
            crippled: false,
            destroyed: false,
            armor_ratio: 0.8,
            internal_ratio: 1.0,
            done: false,
            max_weapon_range: 18,
            total_damage: 40.0,
            turns_without_movement: 0,
        }
    }

    fn board() -> (Vec<UnitState>, Vec<UnitState>) {
        let before = vec![
            unit(8, 1, BoardPos::new(3, 3)),
            unit(9, 1, BoardPos::new(2, 3)),
            unit(20, 2, BoardPos::new(10, 3)),
        ];
        let mut after = vec![
            unit(8, 1, BoardPos::new(3, 4)),
            unit(9, 1, BoardPos::new(2, 3)),
            unit(20, 2, BoardPos::new(10, 3)),
        ];
        after[0].done = true;
        (before, after)
    }

    #[test]
    fn map_is_keyed_by_actor_id() {
        let (before, _) = board();
        let map = unit_state_map(&before);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&8].actor_id, 8);
        assert_eq!(map[&20].team_id, Some(2));
    }

    #[test]
    fn zero_weights_score_zero() {
        let (before, after) = board();
        let cost = PathRankingCostFunction.resolve(
            &action(8, true),
            &unit_state_map(&before),
            &unit_state_map(&after),
            &BehaviorParameters::zeros(),
        );
        assert!((cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scores_are_finite_and_deterministic_across_the_clamped_range() {
        let (before, after) = board();
        let before = unit_state_map(&before);
        let after = unit_state_map(&after);
        let act = action(8, true);
        for params in [
            BehaviorParameters::zeros(),
            BehaviorParameters::from_values([1.0; PARAM_COUNT]),
            BehaviorParameters::from_values([0.37; PARAM_COUNT]),
        ] {
            let a = PathRankingCostFunction.resolve(&act, &before, &after, &params);
            let b = PathRankingCostFunction.resolve(&act, &before, &after, &params);
            assert!(a.is_finite());
            assert!((a - b).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn illegal_actions_cost_more_under_the_legality_weight() {
        let (before, after) = board();
        let before = unit_state_map(&before);
        let after = unit_state_map(&after);
        let params = BehaviorParameters::zeros().perturbed(Weight::IllegalMove as usize, 1.0);

        let legal = PathRankingCostFunction.resolve(&action(8, true), &before, &after, &params);
        let illegal = PathRankingCostFunction.resolve(&action(8, false), &before, &after, &params);
        assert!(illegal > legal);
        assert!((illegal - 1.0).abs() < 1e-12);
    }

    #[test]
    fn aggression_never_charges_for_closing() {
        let (before, after) = board();
        let before = unit_state_map(&before);
        let after = unit_state_map(&after);
        let params = BehaviorParameters::zeros().perturbed(Weight::EnemyClosing as usize, 1.0);

        let cost =
            AggressionCostFunction.resolve(&action(8, true), &before, &after, &params);
        assert!((cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_actor_snapshot_is_tolerated() {
        let (_, after) = board();
        let after = unit_state_map(&after);
        let empty = UnitStateMap::new();
        let cost = PathRankingCostFunction.resolve(
            &action(8, true),
            &empty,
            &after,
            &BehaviorParameters::from_values([1.0; PARAM_COUNT]),
        );
        assert!(cost.is_finite());
    }
}

//! Per-transition feature extraction shared by the concrete cost functions.
//!
//! Each feature is a normalized badness contribution in `[0, 1]`: a scorer
//! multiplies the feature vector with a [`BehaviorParameters`] vector, so a
//! transition the recorded player handled well should extract small values
//! for whatever the fitted weights care about.
//!
//! Distances are measured in board hexes and capped at
//! [`DISTANCE_SCALE`]; heat swings are scaled by [`HEAT_SCALE`]. Friend and
//! foe are split by team id when the log carries one, by player id
//! otherwise.

use hextune_trajectory::{BoardPos, UnitAction, UnitState};

use crate::{
    behavior_parameters::{BehaviorParameters, PARAM_COUNT, Weight},
    cost_function::UnitStateMap,
};

/// Distance at which separation features saturate, in hexes.
pub const DISTANCE_SCALE: f64 = 30.0;

/// Heat-delta that counts as a full-scale spike.
pub const HEAT_SCALE: f64 = 10.0;

/// Normalized badness features for one recorded transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFeatures {
    values: [f64; PARAM_COUNT],
}

impl TransitionFeatures {
    /// Extracts the feature vector for one transition.
    ///
    /// Tolerates incomplete snapshots: when the acting unit is missing from
    /// a state map, position falls back to the action's coordinates and the
    /// state-delta features extract as zero.
    #[must_use]
    pub fn extract(
        action: &UnitAction,
        before: &UnitStateMap<'_>,
        after: &UnitStateMap<'_>,
    ) -> Self {
        let actor_before = before.get(&action.actor_id).copied();
        let actor_after = after.get(&action.actor_id).copied();
        let side = actor_after.or(actor_before).map(side_of);

        let pos_before = actor_before.map_or(action.from, |s| s.position);
        let pos_after = actor_after.map_or(action.to, |s| s.position);

        let enemies_before = opponents(before, side);
        let enemies_after = opponents(after, side);
        let allies_after = comrades(after, side, action.actor_id);

        let nearest_enemy_before = nearest(pos_before, &enemies_before);
        let nearest_enemy_after = nearest(pos_after, &enemies_after);
        let nearest_ally_after = nearest(pos_after, &allies_after);

        let standoff_before =
            nearest_enemy_before.map_or(1.0, |(d, _)| normalized_distance(d));
        let standoff_after = nearest_enemy_after.map_or(1.0, |(d, _)| normalized_distance(d));

        let mut features = [0.0; PARAM_COUNT];
        let mut set = |weight: Weight, value: f64| {
            features[weight as usize] = value.clamp(0.0, 1.0);
        };

        set(Weight::MpEconomy, action.mp_ratio);
        set(Weight::MpReserve, 1.0 - action.mp_ratio);
        set(Weight::PathWinding, path_winding(action));
        set(Weight::Standstill, f64::from(u8::from(action.hexes_moved == 0)));
        set(Weight::JumpReluctance, f64::from(u8::from(action.jumping)));
        set(Weight::ProneStigma, f64::from(u8::from(action.prone)));
        set(Weight::IllegalMove, f64::from(u8::from(!action.legal)));
        set(Weight::HeatLoad, action.heat_ratio);
        set(Weight::HeatSpike, heat_spike(actor_before, actor_after));
        set(Weight::ArmorRisk, 1.0 - action.armor_ratio);
        set(Weight::StructureRisk, 1.0 - action.internal_ratio);
        set(
            Weight::DamageTaken,
            state_delta(actor_before, actor_after, |s| s.armor_ratio),
        );
        set(
            Weight::StructureLost,
            state_delta(actor_before, actor_after, |s| s.internal_ratio),
        );
        set(Weight::FacingChange, facing_change(actor_before, action));
        set(Weight::EnemyStandoffBefore, standoff_before);
        set(Weight::EnemyStandoffAfter, standoff_after);
        set(
            Weight::EnemyClosing,
            (standoff_before - standoff_after).max(0.0),
        );
        set(
            Weight::EnemyRetreat,
            (standoff_after - standoff_before).max(0.0),
        );
        set(
            Weight::InOwnReach,
            in_reach(actor_after, nearest_enemy_after),
        );
        set(Weight::InEnemyReach, in_enemy_reach(pos_after, &enemies_after));
        set(
            Weight::OutgunnedTrade,
            outgunned_trade(actor_after, nearest_enemy_after),
        );
        set(
            Weight::TargetSoftness,
            nearest_enemy_after.map_or(0.0, |(_, e)| 1.0 - e.armor_ratio),
        );
        set(
            Weight::TargetStructure,
            nearest_enemy_after.map_or(0.0, |(_, e)| 1.0 - e.internal_ratio),
        );
        set(
            Weight::AllyCohesion,
            nearest_ally_after.map_or(1.0, |(d, _)| normalized_distance(d)),
        );
        set(
            Weight::AllyCrowding,
            f64::from(u8::from(nearest_ally_after.is_some_and(|(d, _)| d <= 1))),
        );
        set(
            Weight::IsolationRisk,
            f64::from(u8::from(allies_after.is_empty())),
        );
        set(
            Weight::NumericalPressure,
            numerical_pressure(enemies_after.len(), allies_after.len()),
        );
        set(
            Weight::CrippledCaution,
            f64::from(u8::from(actor_after.is_some_and(|s| s.crippled))),
        );
        set(Weight::DoneTempo, done_tempo(after, side));

        Self { values: features }
    }

    /// Feature value for a named weight.
    #[must_use]
    pub fn value(&self, weight: Weight) -> f64 {
        self.values[weight as usize]
    }

    /// Weighted sum of all features; the scorers' badness scalar.
    #[must_use]
    pub fn dot(&self, params: &BehaviorParameters) -> f64 {
        self.values
            .iter()
            .zip(params.iter())
            .map(|(f, w)| f * w)
            .sum()
    }

    /// Offense-leaning re-reading of the same transition: closing with the
    /// enemy is never a cost, while standing off or giving ground counts
    /// double.
    #[must_use]
    pub fn aggressive(mut self) -> Self {
        self.values[Weight::EnemyClosing as usize] = 0.0;
        self.values[Weight::InEnemyReach as usize] = 0.0;
        for weight in [Weight::EnemyStandoffAfter, Weight::EnemyRetreat] {
            let v = &mut self.values[weight as usize];
            *v = (*v * 2.0).min(1.0);
        }
        self
    }
}

fn side_of(state: &UnitState) -> u32 {
    state.team_id.unwrap_or(state.player_id)
}

fn opponents<'a>(states: &UnitStateMap<'a>, side: Option<u32>) -> Vec<&'a UnitState> {
    let Some(side) = side else {
        return Vec::new();
    };
    states
        .values()
        .copied()
        .filter(|s| s.is_active() && side_of(s) != side)
        .collect()
}

fn comrades<'a>(
    states: &UnitStateMap<'a>,
    side: Option<u32>,
    actor_id: u32,
) -> Vec<&'a UnitState> {
    let Some(side) = side else {
        return Vec::new();
    };
    states
        .values()
        .copied()
        .filter(|s| s.is_active() && side_of(s) == side && s.actor_id != actor_id)
        .collect()
}

/// Closest unit by hex distance; ties resolve to the lowest actor id since
/// the candidates arrive in map order.
fn nearest<'a>(from: BoardPos, units: &[&'a UnitState]) -> Option<(u32, &'a UnitState)> {
    let mut best: Option<(u32, &UnitState)> = None;
    for &unit in units {
        let d = from.distance(unit.position);
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, unit));
        }
    }
    best
}

fn normalized_distance(hexes: u32) -> f64 {
    (f64::from(hexes) / DISTANCE_SCALE).min(1.0)
}

fn path_winding(action: &UnitAction) -> f64 {
    if action.distance == 0 {
        return 0.0;
    }
    let wasted = f64::from(action.distance.saturating_sub(action.displacement()));
    wasted / f64::from(action.distance)
}

fn heat_spike(before: Option<&UnitState>, after: Option<&UnitState>) -> f64 {
    match (before, after) {
        (Some(b), Some(a)) => (f64::from(a.heat) - f64::from(b.heat)).max(0.0) / HEAT_SCALE,
        _ => 0.0,
    }
}

/// Positive drop of a unit ratio across the transition.
fn state_delta(
    before: Option<&UnitState>,
    after: Option<&UnitState>,
    ratio: impl Fn(&UnitState) -> f64,
) -> f64 {
    match (before, after) {
        (Some(b), Some(a)) => (ratio(b) - ratio(a)).max(0.0),
        _ => 0.0,
    }
}

/// Facing turns needed between the starting facing and the action's final
/// facing, as a fraction of the three-turn maximum.
fn facing_change(before: Option<&UnitState>, action: &UnitAction) -> f64 {
    let Some(before) = before else {
        return 0.0;
    };
    let diff = (i16::from(before.facing) - i16::from(action.facing)).unsigned_abs();
    let turns = diff.min(6 - diff);
    f64::from(turns) / 3.0
}

fn in_reach(actor: Option<&UnitState>, nearest_enemy: Option<(u32, &UnitState)>) -> f64 {
    match (actor, nearest_enemy) {
        (Some(actor), Some((d, _))) if actor.max_weapon_range > 0 => {
            f64::from(u8::from(d <= actor.max_weapon_range))
        }
        _ => 0.0,
    }
}

fn in_enemy_reach(pos: BoardPos, enemies: &[&UnitState]) -> f64 {
    let reached = enemies
        .iter()
        .any(|e| e.max_weapon_range > 0 && pos.distance(e.position) <= e.max_weapon_range);
    f64::from(u8::from(reached))
}

/// Share of the local firepower the nearest enemy holds.
fn outgunned_trade(actor: Option<&UnitState>, nearest_enemy: Option<(u32, &UnitState)>) -> f64 {
    match (actor, nearest_enemy) {
        (Some(actor), Some((_, enemy))) => {
            enemy.total_damage / (enemy.total_damage + actor.total_damage + 1.0)
        }
        _ => 0.0,
    }
}

#[expect(clippy::cast_precision_loss)]
fn numerical_pressure(enemies: usize, allies: usize) -> f64 {
    let total = enemies + allies;
    if total == 0 {
        return 0.0;
    }
    enemies as f64 / total as f64
}

/// Fraction of the actor's side that has already finished acting.
fn done_tempo(after: &UnitStateMap<'_>, side: Option<u32>) -> f64 {
    let Some(side) = side else {
        return 0.0;
    };
    let friendly: Vec<_> = after
        .values()
        .filter(|s| s.is_active() && side_of(s) == side)
        .collect();
    if friendly.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss)]
    {
        friendly.iter().filter(|s| s.done).count() as f64 / friendly.len() as f64
    }
}

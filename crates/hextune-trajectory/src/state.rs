use crate::position::BoardPos;

/// Snapshot of one unit inside a board-wide state block.
///
/// Every state inside one block shares the same round number; the parser
/// rejects blocks where rows disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitState {
    /// Entity id, matching [`UnitAction::actor_id`](crate::UnitAction::actor_id).
    pub actor_id: u32,
    /// Absent when the log predates team-aware state headers.
    pub team_id: Option<u32>,
    pub player_id: u32,
    pub round: u32,
    pub chassis: String,
    pub model: String,
    pub unit_type: String,
    pub role: String,
    pub position: BoardPos,
    pub facing: u8,
    /// Movement points remaining this round.
    pub mp: u32,
    pub heat: u32,
    pub prone: bool,
    pub airborne: bool,
    pub off_board: bool,
    pub crippled: bool,
    pub destroyed: bool,
    pub armor_ratio: f64,
    pub internal_ratio: f64,
    /// Whether the unit has finished acting this round.
    pub done: bool,
    /// Longest weapon range from the unit definition, 0 when unresolved.
    pub max_weapon_range: u32,
    /// Summed weapon damage from the unit definition, 0 when unresolved.
    pub total_damage: f64,
    /// Consecutive rounds without movement. The upstream recorder does not
    /// emit this yet, so it is always 0.
    pub turns_without_movement: u32,
}

impl UnitState {
    /// A unit that can still influence the fight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.destroyed && !self.off_board
    }
}

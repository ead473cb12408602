use crate::position::BoardPos;

/// One movement decision taken by one unit in one round.
///
/// Actions are parsed once from the trajectory log and never mutated; the
/// optimizer only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAction {
    /// Entity id of the acting unit.
    pub actor_id: u32,
    /// Hex facing after the move, 0-5.
    pub facing: u8,
    pub from: BoardPos,
    pub to: BoardPos,
    pub hexes_moved: u32,
    /// Path length in hexes; exceeds `hexes_moved` on winding paths.
    pub distance: u32,
    pub mp_used: u32,
    pub max_mp: u32,
    /// Movement points used as a fraction of the maximum.
    pub mp_ratio: f64,
    pub heat_ratio: f64,
    pub armor_ratio: f64,
    pub internal_ratio: f64,
    pub jumping: bool,
    pub prone: bool,
    /// Whether the recorded action was legal under the movement rules.
    pub legal: bool,
}

impl UnitAction {
    /// Hexes the unit ended up displaced from its starting hex.
    #[must_use]
    pub fn displacement(&self) -> u32 {
        self.from.distance(self.to)
    }
}

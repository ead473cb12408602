use crate::{action::UnitAction, state::UnitState};

/// The atomic trajectory element: one action plus the board state around it.
///
/// Records are produced in log order by [`LogParser`](crate::LogParser) and
/// held read-only for the lifetime of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionAndState {
    /// Round the action was taken in, from the accompanying state block.
    pub round: u32,
    pub action: UnitAction,
    /// One snapshot per unit on the board when the action was recorded.
    pub states: Vec<UnitState>,
}

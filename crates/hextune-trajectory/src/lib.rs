//! Trajectory records and the movement-log parser.
//!
//! A trajectory log is a line-oriented, tab-separated text file: each entry
//! is an action header, one action data row, a unit state header, and one
//! state row per unit on the board. [`LogParser`] turns a whole file into an
//! ordered list of [`ActionAndState`] records, validating headers, column
//! counts, flags, and value ranges as it goes.
//!
//! Derived per-unit stats (weapon range, damage potential) come from a
//! [`UnitCatalog`] supplied by the caller; unresolved units degrade to
//! zeroed stats instead of failing the parse.

pub use self::{action::*, catalog::*, parser::*, position::*, record::*, state::*};

pub mod action;
pub mod catalog;
pub mod parser;
pub mod position;
pub mod record;
pub mod state;

/// Structural or value error that aborts a parse.
///
/// Every variant carries the 1-based line number of the offending input
/// line. Parsing is all-or-nothing: the first error wins and no records are
/// returned, since partial trajectories must not feed the optimizer.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParseError {
    #[display("line {line}: expected an action header")]
    UnexpectedLine { line: usize },
    #[display("line {line}: action header at end of input")]
    MissingActionRow { line: usize },
    #[display("line {line}: expected a unit state header after the action row")]
    MissingStateHeader { line: usize },
    #[display("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[display("line {line}: invalid number {value:?} in column {column}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[display("line {line}: invalid flag {value:?} in column {column}, expected \"0\" or \"1\"")]
    InvalidFlag {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[display("line {line}: facing {value} outside 0-5")]
    FacingOutOfRange { line: usize, value: u8 },
    #[display("line {line}: ratio {value} in column {column} outside [0, 1]")]
    RatioOutOfRange {
        line: usize,
        column: &'static str,
        value: f64,
    },
    #[display("line {line}: unit state round {found} disagrees with block round {expected}")]
    RoundMismatch {
        line: usize,
        expected: u32,
        found: u32,
    },
}

impl ParseError {
    /// 1-based input line the error was detected on.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedLine { line }
            | Self::MissingActionRow { line }
            | Self::MissingStateHeader { line }
            | Self::ColumnCount { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::InvalidFlag { line, .. }
            | Self::FacingOutOfRange { line, .. }
            | Self::RatioOutOfRange { line, .. }
            | Self::RoundMismatch { line, .. } => *line,
        }
    }
}

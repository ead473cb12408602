//! Tab-separated trajectory-log parser.
//!
//! The grammar is line oriented:
//!
//! 1. an action header line ([`ACTION_HEADER`], matched verbatim),
//! 2. one action data row (20 tab-separated fields plus an unparsed step
//!    tail),
//! 3. a unit state header (either [`STATE_HEADER_TEAMED`] or
//!    [`STATE_HEADER_UNTEAMED`]),
//! 4. zero or more state rows, terminated by a blank line, a `ROUND`
//!    marker, a new action header, or end of input.
//!
//! Headers are matched against the full expected column list rather than
//! trusting positions, so a reordered or renamed column fails on the header
//! line instead of producing silently shifted values.

use std::{collections::HashSet, iter::Peekable, str::FromStr};

use crate::{
    ParseError,
    action::UnitAction,
    catalog::{UnitCatalog, UnitSpec},
    position::BoardPos,
    record::ActionAndState,
    state::UnitState,
};

/// Column header preceding every action data row.
pub const ACTION_HEADER: &str = "PLAYER_ID\tENTITY_ID\tCHASSIS\tMODEL\tFACING\tFROM_X\tFROM_Y\tTO_X\tTO_Y\tHEXES_MOVED\tDISTANCE\tMP_USED\tMAX_MP\tMP_P\tHEAT_P\tARMOR_P\tINTERNAL_P\tJUMPING\tPRONE\tLEGAL\tSTEPS";

/// Unit state header carrying a `TEAM_ID` column.
pub const STATE_HEADER_TEAMED: &str = "ROUND\tPHASE\tTEAM_ID\tPLAYER_ID\tENTITY_ID\tCHASSIS\tMODEL\tTYPE\tROLE\tX\tY\tFACING\tMP\tHEAT\tPRONE\tAIRBORNE\tOFF_BOARD\tCRIPPLED\tDESTROYED\tARMOR_P\tINTERNAL_P\tDONE";

/// Unit state header without a `TEAM_ID` column (older logs).
pub const STATE_HEADER_UNTEAMED: &str = "ROUND\tPHASE\tPLAYER_ID\tENTITY_ID\tCHASSIS\tMODEL\tTYPE\tROLE\tX\tY\tFACING\tMP\tHEAT\tPRONE\tAIRBORNE\tOFF_BOARD\tCRIPPLED\tDESTROYED\tARMOR_P\tINTERNAL_P\tDONE";

// The STEPS tail is not a fixed-width column, so action rows are checked
// against the 20 data columns only.
const ACTION_COLUMNS: usize = 20;
const STATE_COLUMNS_TEAMED: usize = 22;
const STATE_COLUMNS_UNTEAMED: usize = 21;

/// Converts a trajectory log into ordered [`ActionAndState`] records.
///
/// The parser owns no global state: the unit catalog is injected at
/// construction and the once-per-key warning set lives on the instance, so
/// concurrent parses of different files cannot interfere.
#[derive(Debug)]
pub struct LogParser<'c> {
    catalog: &'c dyn UnitCatalog,
    unresolved: HashSet<String>,
}

impl<'c> LogParser<'c> {
    #[must_use]
    pub fn new(catalog: &'c dyn UnitCatalog) -> Self {
        Self {
            catalog,
            unresolved: HashSet::new(),
        }
    }

    /// Parses a whole log, returning records in input order.
    ///
    /// The first structural or value error aborts the parse.
    pub fn parse_str(&mut self, input: &str) -> Result<Vec<ActionAndState>, ParseError> {
        let mut cursor = Cursor::new(input);
        let mut records = Vec::new();
        while let Some((line, text)) = cursor.next_line() {
            if text.trim().is_empty() || is_round_marker(text) {
                continue;
            }
            if text != ACTION_HEADER {
                return Err(ParseError::UnexpectedLine { line });
            }
            records.push(self.parse_block(line, &mut cursor)?);
        }
        Ok(records)
    }

    fn parse_block(
        &mut self,
        header_line: usize,
        cursor: &mut Cursor<'_>,
    ) -> Result<ActionAndState, ParseError> {
        let (action_line, text) = cursor.next_line().ok_or(ParseError::MissingActionRow {
            line: header_line,
        })?;
        let action = parse_action_row(action_line, text)?;

        let (state_line, text) = cursor.next_line().ok_or(ParseError::MissingStateHeader {
            line: action_line,
        })?;
        let teamed = match text {
            STATE_HEADER_TEAMED => true,
            STATE_HEADER_UNTEAMED => false,
            _ => return Err(ParseError::MissingStateHeader { line: state_line }),
        };

        let mut states = Vec::new();
        let mut round = None;
        while let Some((_, text)) = cursor.peek_line() {
            if text.trim().is_empty() || is_round_marker(text) || text == ACTION_HEADER {
                break;
            }
            let (line, text) = cursor.next_line().expect("peeked line");
            let state = self.parse_state_row(line, text, teamed)?;
            match round {
                None => round = Some(state.round),
                Some(expected) if expected != state.round => {
                    return Err(ParseError::RoundMismatch {
                        line,
                        expected,
                        found: state.round,
                    });
                }
                Some(_) => {}
            }
            states.push(state);
        }

        Ok(ActionAndState {
            round: round.unwrap_or(0),
            action,
            states,
        })
    }

    fn parse_state_row(
        &mut self,
        line: usize,
        text: &str,
        teamed: bool,
    ) -> Result<UnitState, ParseError> {
        let fields: Vec<&str> = text.split('\t').collect();
        let expected = if teamed {
            STATE_COLUMNS_TEAMED
        } else {
            STATE_COLUMNS_UNTEAMED
        };
        if fields.len() != expected {
            return Err(ParseError::ColumnCount {
                line,
                expected,
                found: fields.len(),
            });
        }
        let row = Row {
            line,
            fields: &fields,
        };

        // Index of PLAYER_ID; everything after the optional TEAM_ID shifts
        // with it.
        let base = if teamed { 3 } else { 2 };
        let team_id = if teamed {
            Some(row.number("TEAM_ID", 2)?)
        } else {
            None
        };
        let chassis = row.text(base + 2);
        let model = row.text(base + 3);
        let spec = self.resolve_unit(chassis, model);

        Ok(UnitState {
            round: row.number("ROUND", 0)?,
            team_id,
            player_id: row.number("PLAYER_ID", base)?,
            actor_id: row.number("ENTITY_ID", base + 1)?,
            chassis: chassis.to_owned(),
            model: model.to_owned(),
            unit_type: row.text(base + 4).to_owned(),
            role: row.text(base + 5).to_owned(),
            position: BoardPos::new(row.number("X", base + 6)?, row.number("Y", base + 7)?),
            facing: row.facing("FACING", base + 8)?,
            mp: row.number("MP", base + 9)?,
            heat: row.number("HEAT", base + 10)?,
            prone: row.flag("PRONE", base + 11)?,
            airborne: row.flag("AIRBORNE", base + 12)?,
            off_board: row.flag("OFF_BOARD", base + 13)?,
            crippled: row.flag("CRIPPLED", base + 14)?,
            destroyed: row.flag("DESTROYED", base + 15)?,
            armor_ratio: row.ratio("ARMOR_P", base + 16)?,
            internal_ratio: row.ratio("INTERNAL_P", base + 17)?,
            done: row.flag("DONE", base + 18)?,
            max_weapon_range: spec.map_or(0, |s| s.max_weapon_range),
            total_damage: spec.map_or(0.0, |s| s.total_damage),
            turns_without_movement: 0,
        })
    }

    fn resolve_unit(&mut self, chassis: &str, model: &str) -> Option<UnitSpec> {
        let spec = self.catalog.lookup(chassis, model);
        if spec.is_none() {
            let key = format!("{chassis} {model}");
            if self.unresolved.insert(key) {
                log::warn!("no unit definition for \"{chassis} {model}\", derived stats zeroed");
            }
        }
        spec
    }
}

fn parse_action_row(line: usize, text: &str) -> Result<UnitAction, ParseError> {
    let fields: Vec<&str> = text.split('\t').collect();
    if fields.len() < ACTION_COLUMNS {
        return Err(ParseError::ColumnCount {
            line,
            expected: ACTION_COLUMNS,
            found: fields.len(),
        });
    }
    let row = Row {
        line,
        fields: &fields,
    };
    Ok(UnitAction {
        actor_id: row.number("ENTITY_ID", 1)?,
        facing: row.facing("FACING", 4)?,
        from: BoardPos::new(row.number("FROM_X", 5)?, row.number("FROM_Y", 6)?),
        to: BoardPos::new(row.number("TO_X", 7)?, row.number("TO_Y", 8)?),
        hexes_moved: row.number("HEXES_MOVED", 9)?,
        distance: row.number("DISTANCE", 10)?,
        mp_used: row.number("MP_USED", 11)?,
        max_mp: row.number("MAX_MP", 12)?,
        mp_ratio: row.ratio("MP_P", 13)?,
        heat_ratio: row.ratio("HEAT_P", 14)?,
        armor_ratio: row.ratio("ARMOR_P", 15)?,
        internal_ratio: row.ratio("INTERNAL_P", 16)?,
        jumping: row.flag("JUMPING", 17)?,
        prone: row.flag("PRONE", 18)?,
        legal: row.flag("LEGAL", 19)?,
    })
}

fn is_round_marker(text: &str) -> bool {
    text.starts_with("ROUND")
}

struct Cursor<'a> {
    lines: Peekable<std::iter::Enumerate<std::str::Lines<'a>>>,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate().peekable(),
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.next().map(|(i, text)| (i + 1, text))
    }

    fn peek_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.peek().map(|&(i, text)| (i + 1, text))
    }
}

/// One tab-split data row with typed, column-named field accessors.
struct Row<'a> {
    line: usize,
    fields: &'a [&'a str],
}

impl Row<'_> {
    fn text(&self, index: usize) -> &str {
        self.fields[index]
    }

    fn number<T: FromStr>(&self, column: &'static str, index: usize) -> Result<T, ParseError> {
        self.fields[index]
            .parse()
            .map_err(|_| ParseError::InvalidNumber {
                line: self.line,
                column,
                value: self.fields[index].to_owned(),
            })
    }

    fn ratio(&self, column: &'static str, index: usize) -> Result<f64, ParseError> {
        let value: f64 = self.number(column, index)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ParseError::RatioOutOfRange {
                line: self.line,
                column,
                value,
            });
        }
        Ok(value)
    }

    fn flag(&self, column: &'static str, index: usize) -> Result<bool, ParseError> {
        match self.fields[index] {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(ParseError::InvalidFlag {
                line: self.line,
                column,
                value: other.to_owned(),
            }),
        }
    }

    fn facing(&self, column: &'static str, index: usize) -> Result<u8, ParseError> {
        let value: u8 = self.number(column, index)?;
        if value > 5 {
            return Err(ParseError::FacingOutOfRange {
                line: self.line,
                value,
            });
        }
        Ok(value)
    }
}

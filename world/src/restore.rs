//! Rebuilding a world from a persisted match.

use skirmish_core::{Archetype, BoardSize, CellIndex, MatchSnapshot, Side};
use thiserror::Error;

use crate::{roster::UnitRegistry, state::MatchState, World};

/// Reasons a persisted match cannot be restored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    /// A placement lies outside the board.
    #[error("unit placed off the board at cell {cell}")]
    OffBoard {
        /// Offending cell.
        cell: CellIndex,
    },
    /// Two placements share a cell.
    #[error("more than one unit placed at cell {cell}")]
    SharedCell {
        /// Offending cell.
        cell: CellIndex,
    },
    /// A unit carries level zero.
    #[error("unit at cell {cell} has level zero")]
    ZeroLevel {
        /// Cell of the offending unit.
        cell: CellIndex,
    },
    /// A unit is listed under the side that does not field its archetype.
    #[error("{archetype} listed for the {side} side")]
    WrongSide {
        /// Archetype of the offending unit.
        archetype: Archetype,
        /// Side the unit was listed under.
        side: Side,
    },
}

impl World {
    /// Replaces the world wholesale with the persisted match.
    ///
    /// Units at zero health are not placed. The turn number and level are
    /// raised to at least one.
    pub fn from_snapshot(snapshot: &MatchSnapshot, board: BoardSize) -> Result<Self, RestoreError> {
        let mut units = UnitRegistry::new(board);

        for side in [Side::Player, Side::Computer] {
            for record in snapshot.placed(side) {
                let cell = record.board_index;
                if !board.contains(cell) {
                    return Err(RestoreError::OffBoard { cell });
                }
                if record.unit.level == 0 {
                    return Err(RestoreError::ZeroLevel { cell });
                }
                let archetype = record.unit.archetype;
                if archetype.side() != side {
                    return Err(RestoreError::WrongSide { archetype, side });
                }
                if units.occupant(cell).is_some() {
                    return Err(RestoreError::SharedCell { cell });
                }

                let unit = record.unit.to_unit();
                if !unit.is_alive() {
                    continue;
                }
                if units.insert(side, unit, cell).is_none() {
                    return Err(RestoreError::SharedCell { cell });
                }
            }
        }

        let state = MatchState::restored(
            snapshot.turn,
            snapshot.turn_number,
            snapshot.score,
            snapshot.best_score,
            snapshot.game_over,
            snapshot.game_completed,
            snapshot.level,
        );

        Ok(Self {
            board,
            state,
            units,
        })
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The controller submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values describing what
//! changed. Systems read immutable snapshots and respond with new command
//! batches or decisions.
//!
//! The unit model, board geometry and the serialized match format live here
//! too, so every crate agrees on stats, ranges and persistence.

mod board;
mod snapshot;
mod unit;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use board::{
    attack_cells, distance, movement_cells, tile_kind, BoardSize, CellIndex, TileKind,
    DEFAULT_BOARD_SIZE,
};
pub use snapshot::{MatchSnapshot, PlacedRecord, SnapshotError, UnitRecord};
pub use unit::{Archetype, ArchetypeProfile, Unit, MAX_HEALTH, STARTING_HEALTH};

/// The two opposing parties of a match.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Human-controlled roster. Always moves first.
    #[default]
    Player,
    /// Roster driven by the opponent decision engine.
    Computer,
}

impl Side {
    /// Returns the side facing this one.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Computer,
            Self::Computer => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Computer => f.write_str("computer"),
        }
    }
}

/// Unique identifier assigned to a unit by the world's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts the provided level from a clean board.
    ///
    /// Best score survives the reset; everything else returns to its initial
    /// value and every unit is dropped.
    ResetMatch {
        /// Level the fresh match starts at.
        level: u32,
    },
    /// Places a unit on the board for the given side.
    DeployUnit {
        /// Side receiving the unit. Must match the unit's archetype.
        side: Side,
        /// Statistics of the unit being deployed.
        unit: Unit,
        /// Cell the unit is placed on.
        cell: CellIndex,
    },
    /// Selects one of the player's units.
    SelectUnit {
        /// Unit to select.
        unit: UnitId,
    },
    /// Drops the current selection, if any.
    ClearSelection,
    /// Moves a unit to an unoccupied cell within its movement range.
    MoveUnit {
        /// Unit being moved.
        unit: UnitId,
        /// Destination cell.
        to: CellIndex,
    },
    /// Subtracts health from a unit, removing it when health reaches zero.
    ApplyDamage {
        /// Unit receiving the damage.
        target: UnitId,
        /// Amount of health removed.
        amount: f64,
    },
    /// Adds points to the running score.
    AwardScore {
        /// Points awarded.
        points: u64,
    },
    /// Passes the turn to the other side.
    EndTurn,
    /// Levels up every surviving unit of a side.
    LevelUpSurvivors {
        /// Side whose units advance.
        side: Side,
    },
    /// Marks the match as lost.
    SetGameOver,
    /// Marks the match as won.
    SetGameCompleted,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh match started.
    MatchReset {
        /// Level the match is now at.
        level: u32,
    },
    /// Confirms that a unit was placed on the board.
    UnitDeployed {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Side owning the unit.
        side: Side,
        /// Cell the unit occupies.
        cell: CellIndex,
    },
    /// Confirms that a player unit became selected.
    UnitSelected {
        /// Selected unit.
        unit: UnitId,
        /// Cell the selected unit occupies.
        cell: CellIndex,
    },
    /// Confirms that the selection was dropped.
    SelectionCleared,
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellIndex,
        /// Cell the unit occupies after moving.
        to: CellIndex,
    },
    /// Reports damage dealt to a unit.
    UnitDamaged {
        /// Unit that was hit.
        unit: UnitId,
        /// Cell the unit occupied when hit.
        cell: CellIndex,
        /// Health removed by the hit.
        amount: f64,
        /// Health left after the hit.
        remaining: f64,
    },
    /// Reports that a unit reached zero health and left the board.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Side that lost the unit.
        side: Side,
        /// Cell the unit occupied.
        cell: CellIndex,
    },
    /// Reports that a side has no units left.
    RosterEliminated {
        /// Side whose roster is empty.
        side: Side,
    },
    /// Reports a change to the score.
    ScoreChanged {
        /// Score after the change.
        score: u64,
        /// Best score after the change.
        best: u64,
    },
    /// Reports that the turn passed to another side.
    TurnChanged {
        /// Side now acting.
        turn: Side,
        /// Current turn number.
        turn_number: u32,
    },
    /// Reports that a unit advanced a level.
    UnitLeveledUp {
        /// Unit that leveled up.
        unit: UnitId,
        /// Level reached.
        level: u32,
    },
    /// Announces that the match was lost.
    GameOver,
    /// Announces that the match was won.
    GameCompleted,
    /// Reports that a command was refused without mutating state.
    CommandRejected {
        /// Why the command was refused.
        reason: RejectionReason,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The match is over or completed.
    MatchInactive,
    /// The acting side does not hold the turn.
    NotYourTurn,
    /// No unit with the provided identifier exists.
    UnknownUnit,
    /// The unit belongs to the other side.
    WrongSide,
    /// The cell lies outside the board.
    OutOfBounds,
    /// The cell already holds a unit.
    Occupied,
    /// The cell lies beyond the unit's range.
    OutOfRange,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MatchInactive => "the match is not active",
            Self::NotYourTurn => "it is not that side's turn",
            Self::UnknownUnit => "no such unit",
            Self::WrongSide => "the unit belongs to the other side",
            Self::OutOfBounds => "the cell is off the board",
            Self::Occupied => "the cell is occupied",
            Self::OutOfRange => "the cell is out of range",
        };
        f.write_str(text)
    }
}

/// Immutable representation of a placed unit used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedUnitSnapshot {
    /// Identifier allocated to the unit.
    pub id: UnitId,
    /// Side owning the unit.
    pub side: Side,
    /// Current statistics of the unit.
    pub unit: Unit,
    /// Cell the unit occupies.
    pub cell: CellIndex,
}

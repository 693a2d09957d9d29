#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state management for Skirmish.
//!
//! The world owns every unit, both rosters, board occupancy and the match
//! state machine. It is mutated exclusively through [`apply`] and read through
//! the [`query`] module.

mod restore;
mod roster;
mod state;

use skirmish_core::{
    distance, BoardSize, CellIndex, Command, Event, RejectionReason, Side, Unit, UnitId,
};

pub use restore::RestoreError;
pub use state::{MatchState, Selection};

use roster::UnitRegistry;

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    board: BoardSize,
    state: MatchState,
    units: UnitRegistry,
}

impl Default for World {
    fn default() -> Self {
        Self::new(BoardSize::default())
    }
}

impl World {
    /// Creates an empty level-one world on a board of the provided size.
    #[must_use]
    pub fn new(board: BoardSize) -> Self {
        Self {
            board,
            state: MatchState::new(),
            units: UnitRegistry::new(board),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Refused commands leave the world untouched and report
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if !matches!(command, Command::ResetMatch { .. }) && !world.state.is_active() {
        out_events.push(Event::CommandRejected {
            reason: RejectionReason::MatchInactive,
        });
        return;
    }

    let outcome = match command {
        Command::ResetMatch { level } => {
            world.state.reset(level);
            world.units.clear();
            out_events.push(Event::MatchReset {
                level: world.state.level(),
            });
            Ok(())
        }
        Command::DeployUnit { side, unit, cell } => deploy(world, side, unit, cell, out_events),
        Command::SelectUnit { unit } => select(world, unit, out_events),
        Command::ClearSelection => {
            world.state.deselect();
            out_events.push(Event::SelectionCleared);
            Ok(())
        }
        Command::MoveUnit { unit, to } => move_unit(world, unit, to, out_events),
        Command::ApplyDamage { target, amount } => damage(world, target, amount, out_events),
        Command::AwardScore { points } => {
            world.state.add_score(points);
            out_events.push(Event::ScoreChanged {
                score: world.state.score(),
                best: world.state.best_score(),
            });
            Ok(())
        }
        Command::EndTurn => {
            world.state.switch_turn();
            out_events.push(Event::TurnChanged {
                turn: world.state.turn(),
                turn_number: world.state.turn_number(),
            });
            Ok(())
        }
        Command::LevelUpSurvivors { side } => {
            let members = world.units.roster(side).members().to_vec();
            for id in members {
                if let Some(state) = world.units.get_mut(id) {
                    state.unit.level_up();
                    out_events.push(Event::UnitLeveledUp {
                        unit: id,
                        level: state.unit.level(),
                    });
                }
            }
            Ok(())
        }
        Command::SetGameOver => {
            world.state.set_game_over();
            out_events.push(Event::GameOver);
            Ok(())
        }
        Command::SetGameCompleted => {
            world.state.set_game_completed();
            out_events.push(Event::GameCompleted);
            Ok(())
        }
    };

    if let Err(reason) = outcome {
        out_events.push(Event::CommandRejected { reason });
    }
}

fn deploy(
    world: &mut World,
    side: Side,
    unit: Unit,
    cell: CellIndex,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    if unit.side() != side {
        return Err(RejectionReason::WrongSide);
    }
    if !world.board.contains(cell) {
        return Err(RejectionReason::OutOfBounds);
    }
    let id = world
        .units
        .insert(side, unit, cell)
        .ok_or(RejectionReason::Occupied)?;
    out_events.push(Event::UnitDeployed {
        unit: id,
        side,
        cell,
    });
    Ok(())
}

fn select(
    world: &mut World,
    id: UnitId,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    if !world.state.is_player_turn() {
        return Err(RejectionReason::NotYourTurn);
    }
    let placed = world.units.get(id).ok_or(RejectionReason::UnknownUnit)?;
    if placed.side != Side::Player {
        return Err(RejectionReason::WrongSide);
    }
    let cell = placed.cell;
    if !world.state.select(id, cell) {
        return Err(RejectionReason::NotYourTurn);
    }
    out_events.push(Event::UnitSelected { unit: id, cell });
    Ok(())
}

fn move_unit(
    world: &mut World,
    id: UnitId,
    to: CellIndex,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let placed = *world.units.get(id).ok_or(RejectionReason::UnknownUnit)?;
    if placed.side != world.state.turn() {
        return Err(RejectionReason::NotYourTurn);
    }
    if !world.board.contains(to) {
        return Err(RejectionReason::OutOfBounds);
    }
    if world.units.occupant(to).is_some() {
        return Err(RejectionReason::Occupied);
    }
    if distance(placed.cell, to, world.board) > placed.unit.move_range() {
        return Err(RejectionReason::OutOfRange);
    }

    let from = world
        .units
        .relocate(id, to)
        .ok_or(RejectionReason::Occupied)?;
    world.state.follow_selection(id, to);
    out_events.push(Event::UnitMoved { unit: id, from, to });
    Ok(())
}

fn damage(
    world: &mut World,
    id: UnitId,
    amount: f64,
    out_events: &mut Vec<Event>,
) -> Result<(), RejectionReason> {
    let placed = world.units.get_mut(id).ok_or(RejectionReason::UnknownUnit)?;
    let remaining = placed.unit.take_damage(amount.max(0.0));
    let (side, cell) = (placed.side, placed.cell);
    out_events.push(Event::UnitDamaged {
        unit: id,
        cell,
        amount,
        remaining,
    });

    if remaining > 0.0 {
        return Ok(());
    }

    let _ = world.units.remove(id);
    world.state.forget_unit(id);
    out_events.push(Event::UnitDied {
        unit: id,
        side,
        cell,
    });
    if world.units.roster(side).is_empty() {
        out_events.push(Event::RosterEliminated { side });
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{
        attack_cells, movement_cells, BoardSize, CellIndex, MatchSnapshot, PlacedRecord,
        PlacedUnitSnapshot, Side, Unit, UnitId, UnitRecord,
    };

    use super::{MatchState, World};

    /// Provides read-only access to the match state machine.
    #[must_use]
    pub fn match_state(world: &World) -> &MatchState {
        &world.state
    }

    /// Size of the board the world was created with.
    #[must_use]
    pub fn board(world: &World) -> BoardSize {
        world.board
    }

    /// Current statistics of a unit, if it is still on the board.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<Unit> {
        world.units.get(id).map(|state| state.unit)
    }

    /// Captures a placed unit together with its side and cell.
    #[must_use]
    pub fn placed(world: &World, id: UnitId) -> Option<PlacedUnitSnapshot> {
        world.units.get(id).map(|state| PlacedUnitSnapshot {
            id,
            side: state.side,
            unit: state.unit,
            cell: state.cell,
        })
    }

    /// Captures every placed unit of a side in roster order.
    #[must_use]
    pub fn placed_units(world: &World, side: Side) -> Vec<PlacedUnitSnapshot> {
        roster(world, side)
            .iter()
            .filter_map(|id| placed(world, *id))
            .collect()
    }

    /// Unit handles of a side in insertion order.
    #[must_use]
    pub fn roster(world: &World, side: Side) -> &[UnitId] {
        world.units.roster(side).members()
    }

    /// Unit standing on the cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellIndex) -> Option<UnitId> {
        world.units.occupant(cell)
    }

    /// Whether any unit stands on the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellIndex) -> bool {
        occupant(world, cell).is_some()
    }

    /// Cell the unit stands on.
    #[must_use]
    pub fn cell_of(world: &World, id: UnitId) -> Option<CellIndex> {
        world.units.get(id).map(|state| state.cell)
    }

    /// Free cells the unit could move to, in row-major order.
    #[must_use]
    pub fn reachable_cells(world: &World, id: UnitId) -> Vec<CellIndex> {
        let Some(state) = world.units.get(id) else {
            return Vec::new();
        };
        movement_cells(state.cell, state.unit.move_range(), world.board)
            .into_iter()
            .filter(|cell| !is_occupied(world, *cell))
            .collect()
    }

    /// Cells within the unit's attack range that hold an enemy, in row-major order.
    #[must_use]
    pub fn attack_targets(world: &World, id: UnitId) -> Vec<CellIndex> {
        let Some(state) = world.units.get(id) else {
            return Vec::new();
        };
        attack_cells(state.cell, state.unit.attack_range(), world.board)
            .into_iter()
            .filter(|cell| {
                occupant(world, *cell)
                    .and_then(|other| world.units.get(other))
                    .is_some_and(|other| other.side != state.side)
            })
            .collect()
    }

    /// Captures the persisted form of the current match.
    #[must_use]
    pub fn snapshot(world: &World) -> MatchSnapshot {
        let records = |side: Side| -> Vec<PlacedRecord> {
            placed_units(world, side)
                .iter()
                .map(|placed| PlacedRecord {
                    unit: UnitRecord::from(&placed.unit),
                    board_index: placed.cell,
                })
                .collect()
        };
        let state = &world.state;
        MatchSnapshot {
            turn: state.turn(),
            turn_number: state.turn_number(),
            score: state.score(),
            best_score: state.best_score(),
            game_over: state.game_over(),
            game_completed: state.game_completed(),
            level: state.level(),
            player_placed: records(Side::Player),
            enemy_placed: records(Side::Computer),
        }
    }
}

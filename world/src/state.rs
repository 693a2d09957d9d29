//! Turn, selection and scoring state machine.

use skirmish_core::{CellIndex, Side, UnitId};

/// A selected player unit together with the cell it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Selected unit.
    pub unit: UnitId,
    /// Cell the selected unit occupies.
    pub cell: CellIndex,
}

/// Match-level bookkeeping owned by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchState {
    turn: Side,
    selection: Option<Selection>,
    turn_number: u32,
    score: u64,
    best_score: u64,
    game_over: bool,
    game_completed: bool,
    level: u32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Creates the state of a fresh level-one match.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turn: Side::Player,
            selection: None,
            turn_number: 1,
            score: 0,
            best_score: 0,
            game_over: false,
            game_completed: false,
            level: 1,
        }
    }

    pub(crate) fn restored(
        turn: Side,
        turn_number: u32,
        score: u64,
        best_score: u64,
        game_over: bool,
        game_completed: bool,
        level: u32,
    ) -> Self {
        Self {
            turn,
            selection: None,
            turn_number: turn_number.max(1),
            score,
            best_score: best_score.max(score),
            game_over,
            game_completed,
            level: level.max(1),
        }
    }

    /// Selects a unit. Only possible while active and on the player's turn.
    pub(crate) fn select(&mut self, unit: UnitId, cell: CellIndex) -> bool {
        if !self.is_active() || !self.is_player_turn() {
            return false;
        }
        self.selection = Some(Selection { unit, cell });
        true
    }

    pub(crate) fn deselect(&mut self) {
        self.selection = None;
    }

    pub(crate) fn follow_selection(&mut self, unit: UnitId, cell: CellIndex) {
        if let Some(selection) = self.selection.as_mut() {
            if selection.unit == unit {
                selection.cell = cell;
            }
        }
    }

    pub(crate) fn forget_unit(&mut self, unit: UnitId) {
        if self.selection.map(|selection| selection.unit) == Some(unit) {
            self.selection = None;
        }
    }

    /// Hands the turn to the other side.
    ///
    /// The turn number only advances when the player regains the turn.
    pub(crate) fn switch_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.selection = None;
        if self.turn == Side::Player {
            self.turn_number = self.turn_number.saturating_add(1);
        }
    }

    pub(crate) fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        self.best_score = self.best_score.max(self.score);
    }

    pub(crate) fn set_game_over(&mut self) {
        self.game_over = true;
        self.best_score = self.best_score.max(self.score);
    }

    pub(crate) fn set_game_completed(&mut self) {
        self.game_completed = true;
        self.best_score = self.best_score.max(self.score);
    }

    /// Returns every field to its initial value except the best score.
    pub(crate) fn reset(&mut self, level: u32) {
        *self = Self {
            best_score: self.best_score,
            level: level.max(1),
            ..Self::new()
        };
    }

    /// Whether gameplay mutations are still accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.game_over && !self.game_completed
    }

    /// Whether the player holds the turn.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.turn == Side::Player
    }

    /// Side holding the turn.
    #[must_use]
    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// Current selection, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Current turn number, starting at one.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Best score ever observed.
    #[must_use]
    pub const fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Whether the match was lost.
    #[must_use]
    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    /// Whether the match was won.
    #[must_use]
    pub const fn game_completed(&self) -> bool {
        self.game_completed
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn sequencing for Skirmish matches.
//!
//! [`MatchController`] turns presenter input into world commands, runs the
//! computer's reply, moves between levels and keeps the saved match current.
//! Every suspension point (computer thinking, damage effects, round endings)
//! happens inside a single `&mut self` call, so actions never interleave.

mod config;

pub use config::{ConfigError, MatchConfig};

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    Archetype, CellIndex, Command, Event, MatchSnapshot, PlacedUnitSnapshot, Side, Unit,
};
use skirmish_persistence::Store;
use skirmish_presentation::{unit_info, Cursor, Highlight, MatchStats, Presenter, UserInput};
use skirmish_system_combat::{
    round_outcome, victory_bonus, Combat, RoundOutcome, COMPLETION_BONUS,
};
use skirmish_system_opponent::{Decision, Opponent};
use skirmish_system_roster::{
    generate_roster, Config as DeploymentConfig, Deployment, RosterError,
};
use skirmish_world::{self as world, query, Selection, World};
use tokio::time::{sleep, timeout};

const NOTICE_OPPONENT_TURN: &str = "It is the opponent's turn.";
const NOTICE_OUT_OF_REACH: &str = "That cell is out of reach.";
const NOTICE_SELECT_OWN: &str = "Select one of your units.";
const NOTICE_OUT_OF_RANGE: &str = "That unit is out of range.";
const NOTICE_ONLY_OWN: &str = "You can only select your own units.";
const NOTICE_LOAD_FAILED: &str = "Could not load the saved game. Starting a new one.";
const NOTICE_SAVE_FAILED: &str = "Could not save the game.";
const NOTICE_CLEAR_FAILED: &str = "Could not delete the saved game.";
const MESSAGE_GAME_OVER: &str = "Game over! Press New Game to play again.";
const MESSAGE_COMPLETED: &str = "Congratulations! You have completed every level.";

/// Drives a match between the player and the computer.
#[derive(Debug)]
pub struct MatchController<P, S> {
    world: World,
    config: MatchConfig,
    rng: ChaCha8Rng,
    deployment: Deployment,
    combat: Combat,
    opponent: Opponent,
    presenter: P,
    store: S,
    highlighted: Vec<CellIndex>,
}

impl<P: Presenter, S: Store> MatchController<P, S> {
    /// Creates a controller with an empty board. Call [`Self::init`] next.
    #[must_use]
    pub fn new(config: MatchConfig, presenter: P, store: S) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            world: World::new(config.board()),
            deployment: Deployment::new(DeploymentConfig::new(config.placement_attempts)),
            combat: Combat::new(),
            opponent: Opponent::new(),
            config,
            rng,
            presenter,
            store,
            highlighted: Vec::new(),
        }
    }

    /// Current world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the controller runs with.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Presenter collaborator.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Mutable access to the presenter collaborator.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Store collaborator.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resumes the saved match or starts a new one.
    pub async fn init(&mut self) {
        let Some(restored) = self.load_saved() else {
            self.start_new_game();
            return;
        };

        self.world = restored;
        let state = query::match_state(&self.world);
        info!(
            "[Controller] resumed level {} on turn {} ({})",
            state.level(),
            state.turn_number(),
            state.turn()
        );
        let theme = self.config.theme_for_level(state.level());
        self.presenter.draw_board(theme, query::board(&self.world));
        self.redraw_stats();
        self.redraw_units();

        let state = query::match_state(&self.world);
        if state.is_active() && !state.is_player_turn() {
            self.computer_turn().await;
        }
    }

    /// Routes a presenter interaction to its handler.
    pub async fn handle_input(&mut self, input: UserInput) {
        match input {
            UserInput::CellClick(cell) => self.on_cell_click(cell).await,
            UserInput::CellHoverEnter(cell) => self.on_cell_hover_enter(cell),
            UserInput::CellHoverLeave(cell) => self.on_cell_hover_leave(cell),
            UserInput::NewGame => self.on_new_game_requested(),
        }
    }

    /// Selects, moves or attacks depending on what the clicked cell holds.
    pub async fn on_cell_click(&mut self, cell: CellIndex) {
        let state = query::match_state(&self.world);
        if !state.is_active() {
            debug!("[Controller] ignoring click on cell {cell}: match is over");
            return;
        }
        if !state.is_player_turn() {
            self.presenter.show_notice(NOTICE_OPPONENT_TURN);
            return;
        }
        let selection = state.selection();

        let clicked = query::occupant(&self.world, cell)
            .and_then(|id| query::placed(&self.world, id));
        match (clicked, selection) {
            (Some(own), _) if own.side == Side::Player => self.select(own),
            (None, Some(selected)) => {
                if query::reachable_cells(&self.world, selected.unit).contains(&cell) {
                    self.move_selected(selected, cell).await;
                } else {
                    self.presenter.show_notice(NOTICE_OUT_OF_REACH);
                }
            }
            (None, None) => self.presenter.show_notice(NOTICE_SELECT_OWN),
            (Some(enemy), Some(selected)) => {
                if query::attack_targets(&self.world, selected.unit).contains(&cell) {
                    self.player_attack(selected, enemy).await;
                } else {
                    self.presenter.show_notice(NOTICE_OUT_OF_RANGE);
                }
            }
            (Some(_), None) => self.presenter.show_notice(NOTICE_ONLY_OWN),
        }
    }

    /// Shows the tooltip of a hovered unit and picks the matching cursor.
    ///
    /// Once the match is over only the default cursor is shown.
    pub fn on_cell_hover_enter(&mut self, cell: CellIndex) {
        if !query::match_state(&self.world).is_active() {
            self.presenter.set_cursor(Cursor::Auto);
            return;
        }

        let hovered = query::occupant(&self.world, cell)
            .and_then(|id| query::placed(&self.world, id));
        if let Some(placed) = &hovered {
            self.presenter.show_tooltip(&unit_info(&placed.unit), cell);
        }

        let state = query::match_state(&self.world);
        let cursor = if hovered.is_some_and(|placed| placed.side == Side::Player) {
            Cursor::Pointer
        } else if let Some(selected) = state.selection() {
            if query::reachable_cells(&self.world, selected.unit).contains(&cell) {
                Cursor::Pointer
            } else if query::attack_targets(&self.world, selected.unit).contains(&cell) {
                Cursor::Crosshair
            } else {
                Cursor::NotAllowed
            }
        } else {
            Cursor::Auto
        };
        self.presenter.set_cursor(cursor);
    }

    /// Hides the tooltip and restores the default cursor.
    pub fn on_cell_hover_leave(&mut self, cell: CellIndex) {
        self.presenter.hide_tooltip(cell);
        self.presenter.set_cursor(Cursor::Auto);
    }

    /// Forgets the saved match and starts over at level one.
    pub fn on_new_game_requested(&mut self) {
        if let Err(error) = self.store.clear() {
            warn!("[Controller] failed to clear saved match: {error}");
            self.presenter.show_notice(NOTICE_CLEAR_FAILED);
        }
        self.start_new_game();
    }

    /// Saves the current match.
    pub fn persist(&mut self) {
        let payload = match query::snapshot(&self.world).to_json() {
            Ok(payload) => payload,
            Err(error) => {
                error!("[Controller] failed to encode match: {error}");
                return;
            }
        };
        if let Err(error) = self.store.save(&payload) {
            warn!("[Controller] {error}");
            self.presenter.show_notice(NOTICE_SAVE_FAILED);
        }
    }

    fn load_saved(&mut self) -> Option<World> {
        let payload = match self.store.load() {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(error) => {
                warn!("[Controller] {error}");
                self.presenter.show_notice(NOTICE_LOAD_FAILED);
                return None;
            }
        };
        let snapshot = match MatchSnapshot::from_json(&payload) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("[Controller] discarding saved match: {error}");
                self.presenter.show_notice(NOTICE_LOAD_FAILED);
                return None;
            }
        };
        if !is_resumable(&snapshot) {
            debug!("[Controller] saved match has nothing left to play");
            return None;
        }
        match World::from_snapshot(&snapshot, self.config.board()) {
            Ok(world) => Some(world),
            Err(error) => {
                warn!("[Controller] discarding saved match: {error}");
                self.presenter.show_notice(NOTICE_LOAD_FAILED);
                None
            }
        }
    }

    fn start_new_game(&mut self) {
        self.clear_highlights();
        let _ = self.execute(vec![Command::ResetMatch { level: 1 }]);
        self.start_level(Vec::new());
    }

    /// Fields both rosters for the current level. `carried` are player units
    /// surviving the previous level.
    fn start_level(&mut self, carried: Vec<Unit>) {
        let level = query::match_state(&self.world).level();
        let board = query::board(&self.world);
        let theme = self.config.theme_for_level(level);
        self.presenter.draw_board(theme, board);
        self.redraw_stats();

        if let Err(error) = self.deploy_rosters(level, carried) {
            warn!("[Controller] survivors do not fit level {level} ({error}), recruiting afresh");
            let _ = self.execute(vec![Command::ResetMatch { level }]);
            if let Err(error) = self.deploy_rosters(level, Vec::new()) {
                error!("[Controller] failed to field rosters for level {level}: {error}");
            }
        }
        info!("[Controller] level {level} started on the {theme} board");

        self.redraw_units();
        self.persist();
    }

    fn deploy_rosters(&mut self, level: u32, mut player: Vec<Unit>) -> Result<(), RosterError> {
        let board = query::board(&self.world);
        let roster_size = self.config.roster_size;

        player.truncate(roster_size);
        let recruits = roster_size.saturating_sub(player.len());
        player.extend(generate_roster(&Archetype::PLAYER, level, recruits, &mut self.rng)?);
        let computer = generate_roster(&Archetype::COMPUTER, level, roster_size, &mut self.rng)?;

        let mut commands = Vec::new();
        self.deployment
            .plan(Side::Player, &player, &[], board, &mut self.rng, &mut commands)?;
        let events = self.execute(commands);
        let occupied: Vec<CellIndex> = events
            .iter()
            .filter_map(|event| match event {
                Event::UnitDeployed { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();

        let mut commands = Vec::new();
        self.deployment.plan(
            Side::Computer,
            &computer,
            &occupied,
            board,
            &mut self.rng,
            &mut commands,
        )?;
        let _ = self.execute(commands);
        Ok(())
    }

    fn select(&mut self, placed: PlacedUnitSnapshot) {
        self.clear_highlights();
        let events = self.execute(vec![Command::SelectUnit { unit: placed.id }]);
        if rejected(&events) {
            return;
        }

        self.mark(placed.cell, Highlight::Selected);
        for cell in query::reachable_cells(&self.world, placed.id) {
            self.mark(cell, Highlight::Movement);
        }
        for cell in query::attack_targets(&self.world, placed.id) {
            self.mark(cell, Highlight::Attack);
        }
    }

    async fn move_selected(&mut self, selected: Selection, to: CellIndex) {
        self.clear_highlights();
        let events = self.execute(vec![Command::MoveUnit {
            unit: selected.unit,
            to,
        }]);
        if rejected(&events) {
            error!("[Controller] move of unit {} to {to} refused", selected.unit.get());
            return;
        }
        self.redraw_units();
        self.end_player_turn().await;
    }

    async fn player_attack(&mut self, selected: Selection, enemy: PlacedUnitSnapshot) {
        self.clear_highlights();
        let Some(attacker) = query::unit(&self.world, selected.unit) else {
            error!("[Controller] selected unit {} is not on the board", selected.unit.get());
            return;
        };

        let mut commands = Vec::new();
        let strike = self
            .combat
            .strike(Side::Player, &attacker, enemy.id, &enemy.unit, &mut commands);
        let events = self.execute(commands);
        debug!(
            "[Controller] player dealt {:.1} to unit {} for {} points",
            strike.damage,
            enemy.id.get(),
            strike.points
        );
        self.redraw_stats();
        self.play_damage_effect(enemy.cell, strike.damage).await;
        self.redraw_units();

        if self.resolve_round(&events).await {
            return;
        }
        let _ = self.execute(vec![Command::ClearSelection]);
        self.end_player_turn().await;
    }

    async fn end_player_turn(&mut self) {
        let _ = self.execute(vec![Command::EndTurn]);
        self.persist();
        self.computer_turn().await;
    }

    async fn computer_turn(&mut self) {
        sleep(self.config.thinking_delay()).await;
        let state = query::match_state(&self.world);
        if !state.is_active() || state.is_player_turn() {
            return;
        }

        let decision = self.opponent.decide(
            &query::placed_units(&self.world, Side::Computer),
            &query::placed_units(&self.world, Side::Player),
            query::board(&self.world),
        );
        match decision {
            Some(decision) => {
                if self.carry_out(decision).await {
                    return;
                }
            }
            None => info!("[Controller] computer has no reachable target and passes"),
        }

        let _ = self.execute(vec![Command::EndTurn]);
        self.persist();
    }

    /// Performs the computer's chosen action. Returns whether the round ended.
    async fn carry_out(&mut self, decision: Decision) -> bool {
        if let Some(to) = decision.move_to {
            let events = self.execute(vec![Command::MoveUnit {
                unit: decision.unit,
                to,
            }]);
            if rejected(&events) {
                error!(
                    "[Controller] computer move of unit {} to {to} refused",
                    decision.unit.get()
                );
                return false;
            }
            self.redraw_units();
            sleep(self.config.move_delay()).await;
        }

        let (Some(attacker), Some(target)) = (
            query::unit(&self.world, decision.unit),
            query::unit(&self.world, decision.target),
        ) else {
            error!(
                "[Controller] computer strike between units {} and {} lost a participant",
                decision.unit.get(),
                decision.target.get()
            );
            return false;
        };

        let mut commands = Vec::new();
        let strike = self
            .combat
            .strike(Side::Computer, &attacker, decision.target, &target, &mut commands);
        let events = self.execute(commands);
        debug!(
            "[Controller] computer dealt {:.1} to unit {}",
            strike.damage,
            decision.target.get()
        );
        self.play_damage_effect(decision.target_cell, strike.damage).await;
        self.redraw_units();
        self.redraw_stats();

        self.resolve_round(&events).await
    }

    /// Closes the round when a roster was eliminated. Returns whether it did.
    async fn resolve_round(&mut self, events: &[Event]) -> bool {
        match round_outcome(events) {
            Some(RoundOutcome::PlayerWon) => {
                self.player_won().await;
                true
            }
            Some(RoundOutcome::ComputerWon) => {
                self.computer_won().await;
                true
            }
            None => false,
        }
    }

    async fn player_won(&mut self) {
        let level = query::match_state(&self.world).level();
        let _ = self.execute(vec![Command::AwardScore {
            points: victory_bonus(level),
        }]);
        self.redraw_stats();
        sleep(self.config.round_end_delay()).await;
        let _ = self.execute(vec![Command::LevelUpSurvivors { side: Side::Player }]);

        if level >= self.config.max_level {
            let _ = self.execute(vec![
                Command::AwardScore {
                    points: COMPLETION_BONUS,
                },
                Command::SetGameCompleted,
            ]);
            info!(
                "[Controller] match completed with {} points",
                query::match_state(&self.world).score()
            );
            self.redraw_units();
            self.redraw_stats();
            self.persist();
            self.presenter.show_end_of_level_message(MESSAGE_COMPLETED);
            return;
        }

        let survivors: Vec<Unit> = query::placed_units(&self.world, Side::Player)
            .into_iter()
            .map(|placed| placed.unit)
            .collect();
        let next = level + 1;
        let _ = self.execute(vec![Command::ResetMatch { level: next }]);
        self.start_level(survivors);
        self.presenter
            .show_end_of_level_message(&format!("Victory! Advancing to level {next}."));
    }

    async fn computer_won(&mut self) {
        sleep(self.config.round_end_delay()).await;
        let _ = self.execute(vec![Command::SetGameOver]);
        info!(
            "[Controller] game over on level {}",
            query::match_state(&self.world).level()
        );
        self.redraw_stats();
        self.persist();
        self.presenter.show_end_of_level_message(MESSAGE_GAME_OVER);
    }

    async fn play_damage_effect(&mut self, cell: CellIndex, amount: f64) {
        let signal = match self.presenter.show_damage_effect(cell, amount) {
            Ok(signal) => signal,
            Err(error) => {
                warn!("[Controller] damage effect at cell {cell} failed to start: {error:#}");
                return;
            }
        };
        match timeout(self.config.effect_timeout(), signal.wait()).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!("[Controller] damage effect at cell {cell}: {error:#}"),
            Err(_) => warn!("[Controller] damage effect at cell {cell} timed out"),
        }
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        for event in &events {
            if let Event::CommandRejected { reason } = event {
                debug!("[Controller] command rejected: {reason}");
            }
        }
        events
    }

    fn mark(&mut self, cell: CellIndex, highlight: Highlight) {
        self.presenter.highlight_cell(cell, highlight);
        self.highlighted.push(cell);
    }

    fn clear_highlights(&mut self) {
        for cell in std::mem::take(&mut self.highlighted) {
            self.presenter.clear_highlight(cell);
        }
    }

    fn redraw_stats(&mut self) {
        let state = query::match_state(&self.world);
        self.presenter.redraw_stats(MatchStats {
            level: state.level(),
            score: state.score(),
            best_score: state.best_score(),
        });
    }

    fn redraw_units(&mut self) {
        let mut units = query::placed_units(&self.world, Side::Player);
        units.extend(query::placed_units(&self.world, Side::Computer));
        self.presenter.redraw_placed_units(&units);
    }
}

/// A saved match is worth resuming when the player still has units and, while
/// play continues, the computer does too.
fn is_resumable(snapshot: &MatchSnapshot) -> bool {
    let alive = |side: Side| {
        snapshot
            .placed(side)
            .iter()
            .any(|record| record.unit.health > 0.0)
    };
    let finished = snapshot.game_over || snapshot.game_completed;
    alive(Side::Player) && (finished || alive(Side::Computer))
}

fn rejected(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. }))
}

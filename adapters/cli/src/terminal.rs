//! ANSI terminal presenter.

use std::{
    collections::BTreeMap,
    fmt,
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result as AnyResult};
use log::{debug, warn};
use skirmish_core::{tile_kind, BoardSize, CellIndex, PlacedUnitSnapshot, Side, TileKind};
use skirmish_presentation::{
    Color, Cursor, EffectSignal, HealthLevel, Highlight, MatchStats, Presenter, Theme,
};

const EFFECT_DURATION: Duration = Duration::from_millis(250);
const RESET: &str = "\x1b[0m";

/// Presenter printing the board as colored text.
///
/// Messages are written as they arrive; the board itself is only printed by
/// [`TerminalPresenter::render`].
#[derive(Debug)]
pub(crate) struct TerminalPresenter<W> {
    out: W,
    board: BoardSize,
    theme: Theme,
    stats: MatchStats,
    units: BTreeMap<CellIndex, PlacedUnitSnapshot>,
    highlights: BTreeMap<CellIndex, Highlight>,
    cursor: Cursor,
}

impl<W: Write> TerminalPresenter<W> {
    /// Creates a presenter writing to `out`.
    pub(crate) fn new(out: W, board: BoardSize) -> Self {
        Self {
            out,
            board,
            theme: Theme::default(),
            stats: MatchStats::default(),
            units: BTreeMap::new(),
            highlights: BTreeMap::new(),
            cursor: Cursor::Auto,
        }
    }

    /// Prints the stats line and the board.
    pub(crate) fn render(&mut self) -> io::Result<()> {
        let edge = self.board.edge();
        writeln!(
            self.out,
            "Level {}  Score {}  Best {}  ({})",
            self.stats.level, self.stats.score, self.stats.best_score, self.theme
        )?;

        write!(self.out, "     ")?;
        for column in 0..edge {
            write!(self.out, "{column:^3}")?;
        }
        writeln!(self.out)?;

        for row in 0..edge {
            write!(self.out, "{:>4} ", row * edge)?;
            for column in 0..edge {
                let Some(cell) = self.board.index_of(row, column) else {
                    continue;
                };
                let background = self.background(cell);
                let (glyph, foreground) = match self.units.get(&cell) {
                    Some(placed) => (glyph(placed), health_color(placed)),
                    None => (' ', Color::from_rgb(0, 0, 0)),
                };
                write!(
                    self.out,
                    "{}{}{glyph:^3}{RESET}",
                    Ansi::Background(background),
                    Ansi::Foreground(foreground)
                )?;
            }
            writeln!(self.out)?;
        }

        if self.cursor != Cursor::Auto {
            writeln!(self.out, "[{}]", self.cursor.name())?;
        }
        self.out.flush()
    }

    fn background(&self, cell: CellIndex) -> Color {
        match self.highlights.get(&cell) {
            Some(highlight) => highlight.color(),
            None => shade(self.theme.tile_color(), tile_kind(cell, self.board)),
        }
    }

    fn say(&mut self, line: fmt::Arguments<'_>) {
        if let Err(error) = writeln!(self.out, "{line}") {
            warn!("[Terminal] failed to write to the terminal: {error}");
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn draw_board(&mut self, theme: Theme, board: BoardSize) {
        self.theme = theme;
        self.board = board;
        self.units.clear();
        self.highlights.clear();
    }

    fn redraw_stats(&mut self, stats: MatchStats) {
        self.stats = stats;
    }

    fn redraw_placed_units(&mut self, units: &[PlacedUnitSnapshot]) {
        self.units = units.iter().map(|placed| (placed.cell, *placed)).collect();
    }

    fn highlight_cell(&mut self, cell: CellIndex, highlight: Highlight) {
        let _ = self.highlights.insert(cell, highlight);
    }

    fn clear_highlight(&mut self, cell: CellIndex) {
        let _ = self.highlights.remove(&cell);
    }

    fn show_tooltip(&mut self, text: &str, cell: CellIndex) {
        self.say(format_args!("cell {cell}: {text}"));
    }

    fn hide_tooltip(&mut self, cell: CellIndex) {
        debug!("[Terminal] tooltip over cell {cell} hidden");
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn show_notice(&mut self, text: &str) {
        self.say(format_args!("! {text}"));
    }

    fn show_damage_effect(&mut self, cell: CellIndex, amount: f64) -> AnyResult<EffectSignal> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("no async runtime to time the damage effect")?;
        self.say(format_args!("* cell {cell} takes {amount:.1} damage"));

        let (signal, handle) = EffectSignal::pending();
        let _ = runtime.spawn(async move {
            tokio::time::sleep(EFFECT_DURATION).await;
            handle.complete();
        });
        Ok(signal)
    }

    fn show_end_of_level_message(&mut self, text: &str) {
        self.say(format_args!("== {text} =="));
    }
}

/// Uppercase initial for the player, lowercase for the computer.
fn glyph(placed: &PlacedUnitSnapshot) -> char {
    let initial = placed
        .unit
        .archetype()
        .name()
        .chars()
        .next()
        .unwrap_or('?');
    match placed.side {
        Side::Player => initial.to_ascii_uppercase(),
        Side::Computer => initial,
    }
}

fn health_color(placed: &PlacedUnitSnapshot) -> Color {
    match HealthLevel::of(placed.unit.health()) {
        HealthLevel::Critical => Color::from_rgb(0xff, 0x30, 0x30),
        HealthLevel::Normal => Color::from_rgb(0xff, 0xd0, 0x40),
        HealthLevel::High => Color::from_rgb(0xff, 0xff, 0xff),
    }
}

/// Edges are drawn darker than the interior, corners darker still.
fn shade(color: Color, kind: TileKind) -> Color {
    let percent: u16 = match kind {
        TileKind::Center => 100,
        TileKind::Top | TileKind::Bottom | TileKind::Left | TileKind::Right => 85,
        TileKind::TopLeft | TileKind::TopRight | TileKind::BottomLeft | TileKind::BottomRight => {
            70
        }
    };
    let scale = |channel: u8| (u16::from(channel) * percent / 100) as u8;
    Color::from_rgb(scale(color.red), scale(color.green), scale(color.blue))
}

enum Ansi {
    Foreground(Color),
    Background(Color),
}

impl fmt::Display for Ansi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (code, color) = match self {
            Self::Foreground(color) => (38, color),
            Self::Background(color) => (48, color),
        };
        write!(f, "\x1b[{code};2;{};{};{}m", color.red, color.green, color.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Archetype, Unit, UnitId};

    fn presenter() -> TerminalPresenter<Vec<u8>> {
        TerminalPresenter::new(Vec::new(), BoardSize::default())
    }

    fn output(presenter: &TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8_lossy(&presenter.out).into_owned()
    }

    fn placed(archetype: Archetype, cell: u32) -> PlacedUnitSnapshot {
        PlacedUnitSnapshot {
            id: UnitId::new(cell),
            side: archetype.side(),
            unit: Unit::new(archetype),
            cell: CellIndex::new(cell),
        }
    }

    #[test]
    fn render_shows_stats_and_units() {
        let mut presenter = presenter();
        presenter.draw_board(Theme::Desert, BoardSize::default());
        presenter.redraw_stats(MatchStats {
            level: 2,
            score: 40,
            best_score: 90,
        });
        presenter.redraw_placed_units(&[
            placed(Archetype::Bowman, 3),
            placed(Archetype::Vampire, 60),
        ]);
        presenter.render().expect("render");

        let text = output(&presenter);
        assert!(text.starts_with("Level 2  Score 40  Best 90  (desert)"));
        assert!(text.contains(" B "));
        assert!(text.contains(" v "));
        assert!(text.contains("  56 "));
    }

    #[test]
    fn highlights_override_tile_colors() {
        let mut presenter = presenter();
        let cell = CellIndex::new(9);
        presenter.highlight_cell(cell, Highlight::Attack);
        assert_eq!(presenter.background(cell), Highlight::Attack.color());

        presenter.clear_highlight(cell);
        assert_eq!(presenter.background(cell), Theme::Prairie.tile_color());
        assert_ne!(
            presenter.background(CellIndex::new(0)),
            Theme::Prairie.tile_color()
        );
    }

    #[test]
    fn corners_are_darker_than_edges() {
        let color = Color::from_rgb(200, 100, 50);
        assert_eq!(shade(color, TileKind::Center), color);
        assert_eq!(shade(color, TileKind::Top), Color::from_rgb(170, 85, 42));
        assert_eq!(shade(color, TileKind::BottomRight), Color::from_rgb(140, 70, 35));
    }

    #[test]
    fn messages_are_written_immediately() {
        let mut presenter = presenter();
        presenter.show_notice("Select one of your units.");
        presenter.show_end_of_level_message("Victory!");
        presenter.set_cursor(Cursor::Crosshair);
        presenter.render().expect("render");

        let text = output(&presenter);
        assert!(text.starts_with("! Select one of your units.\n== Victory! ==\n"));
        assert!(text.ends_with("[crosshair]\n"));
    }

    #[test]
    fn damage_effect_needs_a_runtime() {
        let mut presenter = presenter();
        assert!(presenter
            .show_damage_effect(CellIndex::new(4), 12.0)
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn damage_effect_completes_after_its_duration() {
        let mut presenter = presenter();
        let started = tokio::time::Instant::now();
        presenter
            .show_damage_effect(CellIndex::new(4), 12.0)
            .expect("effect")
            .wait()
            .await
            .expect("completed");
        assert!(started.elapsed() >= EFFECT_DURATION);
        assert!(output(&presenter).contains("cell 4 takes 12.0 damage"));
    }
}

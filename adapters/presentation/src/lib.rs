#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Skirmish adapters.
//!
//! The controller drives a [`Presenter`] to draw the board, highlight cells,
//! show tooltips and play damage effects. Input flows back as [`UserInput`]
//! values.

use std::fmt;

use anyhow::{anyhow, Result as AnyResult};
use serde::{Deserialize, Serialize};
use skirmish_core::{BoardSize, CellIndex, PlacedUnitSnapshot, Unit};
use tokio::sync::oneshot;

const CRITICAL_HEALTH: f64 = 15.0;
const NORMAL_HEALTH: f64 = 50.0;

/// Visual theme of the board. One per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Grassland tiles.
    #[default]
    Prairie,
    /// Sand tiles.
    Desert,
    /// Snow tiles.
    Arctic,
    /// Rock tiles.
    Mountain,
}

impl Theme {
    /// Every theme in level order.
    pub const ALL: [Theme; 4] = [Theme::Prairie, Theme::Desert, Theme::Arctic, Theme::Mountain];

    /// Lowercase name of the theme.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prairie => "prairie",
            Self::Desert => "desert",
            Self::Arctic => "arctic",
            Self::Mountain => "mountain",
        }
    }

    /// Base tile color used by text-mode presenters.
    #[must_use]
    pub const fn tile_color(self) -> Color {
        match self {
            Self::Prairie => Color::from_rgb(0x5a, 0x8f, 0x3c),
            Self::Desert => Color::from_rgb(0xc2, 0xa6, 0x5a),
            Self::Arctic => Color::from_rgb(0xb8, 0xd8, 0xe8),
            Self::Mountain => Color::from_rgb(0x6e, 0x6a, 0x66),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Creates a color from byte RGB values.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Cell highlight kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// The selected unit's cell.
    Selected,
    /// A cell the selected unit can move to.
    Movement,
    /// A cell holding an enemy the selected unit can strike.
    Attack,
}

impl Highlight {
    /// Color used to mark the cell.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Selected => Color::from_rgb(0xff, 0xd7, 0x00),
            Self::Movement => Color::from_rgb(0x2e, 0xa0, 0x43),
            Self::Attack => Color::from_rgb(0xd7, 0x26, 0x26),
        }
    }
}

/// Pointer shapes a presenter can show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Default pointer.
    #[default]
    Auto,
    /// The cell can be selected or moved to.
    Pointer,
    /// The cell holds an enemy in range.
    Crosshair,
    /// The cell cannot be acted on.
    NotAllowed,
}

impl Cursor {
    /// CSS-style name of the cursor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Pointer => "pointer",
            Self::Crosshair => "crosshair",
            Self::NotAllowed => "not-allowed",
        }
    }
}

/// Score line shown next to the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Current level.
    pub level: u32,
    /// Current score.
    pub score: u64,
    /// Best score ever observed.
    pub best_score: u64,
}

/// Interactions reported by a presenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserInput {
    /// A board cell was clicked.
    CellClick(CellIndex),
    /// The pointer entered a board cell.
    CellHoverEnter(CellIndex),
    /// The pointer left a board cell.
    CellHoverLeave(CellIndex),
    /// A new game was requested.
    NewGame,
}

/// Health bands used to color health bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthLevel {
    /// Below 15.
    Critical,
    /// Below 50.
    Normal,
    /// 50 and above.
    High,
}

impl HealthLevel {
    /// Classifies a health value.
    #[must_use]
    pub fn of(health: f64) -> Self {
        if health < CRITICAL_HEALTH {
            Self::Critical
        } else if health < NORMAL_HEALTH {
            Self::Normal
        } else {
            Self::High
        }
    }
}

/// Tooltip text describing a unit.
#[must_use]
pub fn unit_info(unit: &Unit) -> String {
    format!(
        "\u{1F396}{} \u{2694}{} \u{1F6E1}{} \u{2764}{}",
        unit.level(),
        unit.attack(),
        unit.defence(),
        unit.health()
    )
}

/// Completion signal of a damage effect.
///
/// Presenters that animate return a pending signal and complete it through the
/// paired [`EffectHandle`] once the animation ends.
#[derive(Debug)]
pub struct EffectSignal {
    receiver: oneshot::Receiver<()>,
}

/// Completes a pending [`EffectSignal`].
#[derive(Debug)]
pub struct EffectHandle {
    sender: oneshot::Sender<()>,
}

impl EffectSignal {
    /// A signal that has already resolved.
    #[must_use]
    pub fn completed() -> Self {
        let (signal, handle) = Self::pending();
        handle.complete();
        signal
    }

    /// A signal that resolves when the returned handle completes.
    #[must_use]
    pub fn pending() -> (Self, EffectHandle) {
        let (sender, receiver) = oneshot::channel();
        (Self { receiver }, EffectHandle { sender })
    }

    /// Waits for the effect to finish.
    ///
    /// Fails when the handle is dropped without completing.
    pub async fn wait(self) -> AnyResult<()> {
        self.receiver
            .await
            .map_err(|_| anyhow!("damage effect was abandoned before completing"))
    }
}

impl EffectHandle {
    /// Marks the effect as finished.
    pub fn complete(self) {
        let _ = self.sender.send(());
    }
}

/// Rendering and input collaborator driven by the match controller.
pub trait Presenter {
    /// Draws an empty board using the provided theme.
    fn draw_board(&mut self, theme: Theme, board: BoardSize);

    /// Updates the level and score line.
    fn redraw_stats(&mut self, stats: MatchStats);

    /// Redraws every unit on the board.
    fn redraw_placed_units(&mut self, units: &[PlacedUnitSnapshot]);

    /// Marks a cell.
    fn highlight_cell(&mut self, cell: CellIndex, highlight: Highlight);

    /// Removes any mark from a cell.
    fn clear_highlight(&mut self, cell: CellIndex);

    /// Shows a tooltip over a cell.
    fn show_tooltip(&mut self, text: &str, cell: CellIndex);

    /// Hides the tooltip over a cell.
    fn hide_tooltip(&mut self, cell: CellIndex);

    /// Changes the pointer shape.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Shows a short message to the player.
    fn show_notice(&mut self, text: &str);

    /// Starts a damage effect over a cell.
    fn show_damage_effect(&mut self, cell: CellIndex, amount: f64) -> AnyResult<EffectSignal>;

    /// Shows the message closing a level or the match.
    fn show_end_of_level_message(&mut self, text: &str);
}

//! Square board indexing and range geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Board edge length used when no configuration overrides it.
pub const DEFAULT_BOARD_SIZE: u32 = 8;

/// Row-major index of a cell on the board (`row * size + column`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Wraps a raw row-major index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw row-major index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge length of a square board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSize(u32);

impl Default for BoardSize {
    fn default() -> Self {
        Self(DEFAULT_BOARD_SIZE)
    }
}

impl BoardSize {
    /// Creates a board size with the provided edge length.
    #[must_use]
    pub const fn new(edge: u32) -> Self {
        Self(edge)
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn edge(&self) -> u32 {
        self.0
    }

    /// Total number of cells on the board. Saturates at `u32::MAX`.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.0.saturating_mul(self.0)
    }

    /// Reports whether the index addresses a cell on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellIndex) -> bool {
        cell.get() < self.cell_count()
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn row_of(&self, cell: CellIndex) -> u32 {
        cell.get() / self.0
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn column_of(&self, cell: CellIndex) -> u32 {
        cell.get() % self.0
    }

    /// Index of the cell at `row` and `column`, if both lie on the board.
    #[must_use]
    pub const fn index_of(&self, row: u32, column: u32) -> Option<CellIndex> {
        if row < self.0 && column < self.0 {
            Some(CellIndex::new(row * self.0 + column))
        } else {
            None
        }
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> {
        (0..self.cell_count()).map(CellIndex::new)
    }
}

/// Chebyshev (king-move) distance between two cells.
#[must_use]
pub fn distance(from: CellIndex, to: CellIndex, board: BoardSize) -> u32 {
    let rows = board.row_of(from).abs_diff(board.row_of(to));
    let columns = board.column_of(from).abs_diff(board.column_of(to));
    rows.max(columns)
}

/// Cells a unit at `origin` could move to, ignoring occupancy.
///
/// The caller removes occupied cells.
#[must_use]
pub fn movement_cells(origin: CellIndex, range: u32, board: BoardSize) -> Vec<CellIndex> {
    cells_within(origin, range, board)
}

/// Cells a unit at `origin` could strike, ignoring occupancy.
///
/// The caller keeps only cells that hold an enemy.
#[must_use]
pub fn attack_cells(origin: CellIndex, range: u32, board: BoardSize) -> Vec<CellIndex> {
    cells_within(origin, range, board)
}

fn cells_within(origin: CellIndex, range: u32, board: BoardSize) -> Vec<CellIndex> {
    if !board.contains(origin) {
        return Vec::new();
    }

    let row = board.row_of(origin);
    let column = board.column_of(origin);
    let last = board.edge() - 1;
    let rows = row.saturating_sub(range)..=row.saturating_add(range).min(last);
    let columns = column.saturating_sub(range)..=column.saturating_add(range).min(last);

    let mut cells = Vec::new();
    for r in rows {
        for c in columns.clone() {
            if let Some(cell) = board.index_of(r, c) {
                if cell != origin {
                    cells.push(cell);
                }
            }
        }
    }
    cells
}

/// Position of a cell relative to the board edges. Used for styling only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Cell at row 0, column 0.
    TopLeft,
    /// Cell at row 0, last column.
    TopRight,
    /// Cell at the last row, column 0.
    BottomLeft,
    /// Cell at the last row and column.
    BottomRight,
    /// Any other cell on row 0.
    Top,
    /// Any other cell on the last row.
    Bottom,
    /// Any other cell on column 0.
    Left,
    /// Any other cell on the last column.
    Right,
    /// Interior cell.
    Center,
}

impl TileKind {
    /// Kebab-case name of the tile kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a cell by its row/column membership in `{0, N-1}`.
#[must_use]
pub fn tile_kind(cell: CellIndex, board: BoardSize) -> TileKind {
    let last = board.edge().saturating_sub(1);
    let row = board.row_of(cell);
    let column = board.column_of(cell);

    if row == 0 {
        if column == 0 {
            TileKind::TopLeft
        } else if column == last {
            TileKind::TopRight
        } else {
            TileKind::Top
        }
    } else if row == last {
        if column == 0 {
            TileKind::BottomLeft
        } else if column == last {
            TileKind::BottomRight
        } else {
            TileKind::Bottom
        }
    } else if column == 0 {
        TileKind::Left
    } else if column == last {
        TileKind::Right
    } else {
        TileKind::Center
    }
}

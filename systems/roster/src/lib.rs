#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Roster generation and home-band deployment.
//!
//! Units are drawn from an allowed archetype list with a uniformly random
//! level, then placed on free cells of their side's two home rows. The system
//! never touches the world directly: deployment is expressed as a batch of
//! [`Command::DeployUnit`] values.

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng};
use skirmish_core::{Archetype, BoardSize, CellIndex, Command, Side, Unit};
use thiserror::Error;

const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 50;

/// Reasons a roster cannot be generated or deployed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    /// No archetype was allowed for the draw.
    #[error("no archetypes allowed for the roster")]
    EmptyArchetypes,
    /// The maximum level was zero.
    #[error("maximum roster level must be at least one")]
    ZeroMaxLevel,
    /// Every cell of the side's home band is taken.
    #[error("no free cell left in the {side} home band")]
    BandFull {
        /// Side whose band is full.
        side: Side,
    },
}

/// Endless stream of randomly drawn units.
///
/// Each unit picks its archetype uniformly from the allowed list and its level
/// uniformly from `1..=max_level`.
#[derive(Debug)]
pub struct UnitDraws<'a, R> {
    allowed: &'a [Archetype],
    max_level: u32,
    rng: &'a mut R,
}

impl<'a, R: Rng> UnitDraws<'a, R> {
    /// Creates a draw stream over the allowed archetypes.
    pub fn new(
        allowed: &'a [Archetype],
        max_level: u32,
        rng: &'a mut R,
    ) -> Result<Self, RosterError> {
        if allowed.is_empty() {
            return Err(RosterError::EmptyArchetypes);
        }
        if max_level == 0 {
            return Err(RosterError::ZeroMaxLevel);
        }
        Ok(Self {
            allowed,
            max_level,
            rng,
        })
    }
}

impl<R: Rng> Iterator for UnitDraws<'_, R> {
    type Item = Unit;

    fn next(&mut self) -> Option<Unit> {
        let archetype = *self.allowed.choose(&mut *self.rng)?;
        let level = self.rng.gen_range(1..=self.max_level);
        Some(Unit::at_level(archetype, level))
    }
}

/// Draws exactly `count` units.
pub fn generate_roster<R: Rng>(
    allowed: &[Archetype],
    max_level: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Unit>, RosterError> {
    Ok(UnitDraws::new(allowed, max_level, rng)?.take(count).collect())
}

/// The two rows a side deploys into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeBand {
    cells: Vec<CellIndex>,
}

impl HomeBand {
    /// Rows 0 and 1 for the player, the last two rows for the computer.
    #[must_use]
    pub fn for_side(side: Side, board: BoardSize) -> Self {
        let last = board.edge().saturating_sub(1);
        let rows = match side {
            Side::Player => 0..=last.min(1),
            Side::Computer => last.saturating_sub(1)..=last,
        };
        let cells = rows
            .flat_map(|row| {
                (0..board.edge()).filter_map(move |column| board.index_of(row, column))
            })
            .collect();
        Self { cells }
    }

    /// Cells of the band in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    /// Whether the cell belongs to the band.
    #[must_use]
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.contains(&cell)
    }
}

/// Configuration parameters required to construct the deployment system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    placement_attempts: u32,
}

impl Config {
    /// Creates a configuration with the number of random draws tried per unit
    /// before falling back to a linear scan.
    #[must_use]
    pub const fn new(placement_attempts: u32) -> Self {
        Self { placement_attempts }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEMENT_ATTEMPTS)
    }
}

/// Pure system that assigns free home-band cells to freshly generated units.
#[derive(Debug)]
pub struct Deployment {
    placement_attempts: u32,
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Deployment {
    /// Creates a new deployment system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            placement_attempts: config.placement_attempts,
        }
    }

    /// Emits one deploy command per unit, each on a distinct free band cell.
    ///
    /// Nothing is emitted when the band runs out of free cells.
    pub fn plan<R: Rng>(
        &self,
        side: Side,
        units: &[Unit],
        occupied: &[CellIndex],
        board: BoardSize,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Result<(), RosterError> {
        let band = HomeBand::for_side(side, board);
        let mut taken: BTreeSet<CellIndex> = occupied.iter().copied().collect();
        let mut planned = Vec::with_capacity(units.len());

        for unit in units {
            let cell = self
                .random_free_cell(&band, &taken, rng)
                .or_else(|| first_free_cell(&band, &taken))
                .ok_or(RosterError::BandFull { side })?;
            let _ = taken.insert(cell);
            planned.push(Command::DeployUnit {
                side,
                unit: *unit,
                cell,
            });
        }

        out.extend(planned);
        Ok(())
    }

    fn random_free_cell<R: Rng>(
        &self,
        band: &HomeBand,
        taken: &BTreeSet<CellIndex>,
        rng: &mut R,
    ) -> Option<CellIndex> {
        for _ in 0..self.placement_attempts {
            let cell = *band.cells().choose(rng)?;
            if !taken.contains(&cell) {
                return Some(cell);
            }
        }
        None
    }
}

fn first_free_cell(band: &HomeBand, taken: &BTreeSet<CellIndex>) -> Option<CellIndex> {
    band.cells()
        .iter()
        .copied()
        .find(|cell| !taken.contains(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn home_bands_cover_two_edge_rows() {
        let board = BoardSize::default();
        let player = HomeBand::for_side(Side::Player, board);
        assert_eq!(player.cells().len(), 16);
        assert_eq!(player.cells().first(), Some(&CellIndex::new(0)));
        assert_eq!(player.cells().last(), Some(&CellIndex::new(15)));

        let computer = HomeBand::for_side(Side::Computer, board);
        assert_eq!(computer.cells().first(), Some(&CellIndex::new(48)));
        assert_eq!(computer.cells().last(), Some(&CellIndex::new(63)));
        assert!(!computer.contains(CellIndex::new(47)));
    }

    #[test]
    fn draws_reject_degenerate_inputs() {
        let mut rng = StepRng::new(0, 1);
        assert_eq!(
            generate_roster(&[], 2, 2, &mut rng).err(),
            Some(RosterError::EmptyArchetypes)
        );
        assert_eq!(
            generate_roster(&Archetype::PLAYER, 0, 2, &mut rng).err(),
            Some(RosterError::ZeroMaxLevel)
        );
    }

    #[test]
    fn zero_attempts_fall_back_to_linear_scan() {
        let deployment = Deployment::new(Config::new(0));
        let mut rng = StepRng::new(0, 1);
        let mut out = Vec::new();
        let units = [Unit::new(Archetype::Bowman), Unit::new(Archetype::Magician)];
        deployment
            .plan(
                Side::Player,
                &units,
                &[CellIndex::new(0)],
                BoardSize::default(),
                &mut rng,
                &mut out,
            )
            .expect("plan");

        let cells: Vec<_> = out
            .iter()
            .map(|command| match command {
                Command::DeployUnit { cell, .. } => *cell,
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(cells, vec![CellIndex::new(1), CellIndex::new(2)]);
    }
}

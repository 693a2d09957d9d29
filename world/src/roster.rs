//! Unit arena, per-side rosters and board occupancy.

use std::collections::BTreeMap;

use skirmish_core::{BoardSize, CellIndex, Side, Unit, UnitId};

/// A unit stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UnitState {
    pub(crate) side: Side,
    pub(crate) unit: Unit,
    pub(crate) cell: CellIndex,
}

/// Ordered set of unit handles belonging to one side.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roster {
    members: Vec<UnitId>,
}

impl Roster {
    /// Adds the handle unless already present.
    pub(crate) fn insert(&mut self, id: UnitId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != id);
        self.members.len() != before
    }

    pub(crate) fn members(&self) -> &[UnitId] {
        &self.members
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Registry that stores units and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, UnitState>,
    player: Roster,
    computer: Roster,
    occupancy: Vec<Option<UnitId>>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    /// Creates an empty registry sized for the board.
    pub(crate) fn new(board: BoardSize) -> Self {
        let cells = usize::try_from(board.cell_count()).unwrap_or(0);
        Self {
            entries: BTreeMap::new(),
            player: Roster::default(),
            computer: Roster::default(),
            occupancy: vec![None; cells],
            next_unit_id: UnitId::new(0),
        }
    }

    /// Drops every unit. Identifiers keep counting upward.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.player = Roster::default();
        self.computer = Roster::default();
        self.occupancy.iter_mut().for_each(|slot| *slot = None);
    }

    /// Stores a unit on a free cell and returns its new handle.
    ///
    /// Returns `None` when the cell is off the board or taken.
    pub(crate) fn insert(&mut self, side: Side, unit: Unit, cell: CellIndex) -> Option<UnitId> {
        let id = self.next_unit_id;
        let slot = self.slot_mut(cell)?;
        if slot.is_some() {
            return None;
        }

        *slot = Some(id);
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, UnitState { side, unit, cell });
        let _ = self.roster_mut(side).insert(id);
        Some(id)
    }

    /// Removes a unit from the arena, its roster and the board.
    pub(crate) fn remove(&mut self, id: UnitId) -> Option<UnitState> {
        let state = self.entries.remove(&id)?;
        let _ = self.roster_mut(state.side).remove(id);
        if let Some(slot) = self.slot_mut(state.cell) {
            *slot = None;
        }
        Some(state)
    }

    /// Relocates a unit to a free cell.
    pub(crate) fn relocate(&mut self, id: UnitId, to: CellIndex) -> Option<CellIndex> {
        if self.occupant(to).is_some() || self.index(to).is_none() {
            return None;
        }
        let from = self.entries.get(&id)?.cell;
        if let Some(slot) = self.slot_mut(from) {
            *slot = None;
        }
        if let Some(slot) = self.slot_mut(to) {
            *slot = Some(id);
        }
        if let Some(state) = self.entries.get_mut(&id) {
            state.cell = to;
        }
        Some(from)
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&UnitState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn occupant(&self, cell: CellIndex) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    pub(crate) fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Player => &self.player,
            Side::Computer => &self.computer,
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Player => &mut self.player,
            Side::Computer => &mut self.computer,
        }
    }

    fn index(&self, cell: CellIndex) -> Option<usize> {
        let index = usize::try_from(cell.get()).ok()?;
        (index < self.occupancy.len()).then_some(index)
    }

    fn slot_mut(&mut self, cell: CellIndex) -> Option<&mut Option<UnitId>> {
        let index = self.index(cell)?;
        self.occupancy.get_mut(index)
    }
}

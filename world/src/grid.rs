//! Dense cell arena and occupant registry backing the world.

use cleaning_sim_core::{AgentId, CellCoord, OccupantKind, StationId};

use crate::navigation;

/// Stable handle into the occupant registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct OccupantId(u32);

/// Entity registered on a cell. Occupants are never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Occupant {
    Obstacle,
    Dirt { dirty: bool },
    Station(StationId),
    Cleaner(AgentId),
}

impl Occupant {
    pub(crate) fn kind(&self) -> OccupantKind {
        match self {
            Self::Obstacle => OccupantKind::Obstacle,
            Self::Dirt { .. } => OccupantKind::DirtyCell,
            Self::Station(_) => OccupantKind::ChargingStation,
            Self::Cleaner(_) => OccupantKind::Cleaner,
        }
    }

    /// Obstacles are the only occupants a cleaner can never share a cell with.
    fn blocks_traversal(&self) -> bool {
        matches!(self, Self::Obstacle)
    }
}

/// Row-major grid of cells, each holding handles into the occupant registry.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Vec<OccupantId>>,
    occupants: Vec<Occupant>,
}

impl Grid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![Vec::new(); capacity],
            occupants: Vec::new(),
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Registers a new occupant on the cell and returns its handle.
    pub(crate) fn place(&mut self, cell: CellCoord, occupant: Occupant) -> OccupantId {
        let index = self
            .index(cell)
            .unwrap_or_else(|| panic!("cell {cell:?} lies outside the grid"));
        let id = OccupantId(self.occupants.len() as u32);
        self.occupants.push(occupant);
        self.cells[index].push(id);
        id
    }

    /// Moves an occupant handle between two cells.
    pub(crate) fn relocate(&mut self, id: OccupantId, from: CellCoord, to: CellCoord) {
        let (Some(from_index), Some(to_index)) = (self.index(from), self.index(to)) else {
            debug_assert!(false, "relocation outside the grid: {from:?} -> {to:?}");
            return;
        };

        let source = &mut self.cells[from_index];
        if let Some(position) = source.iter().position(|candidate| *candidate == id) {
            let _ = source.remove(position);
        }
        self.cells[to_index].push(id);
    }

    /// Iterates the occupants registered on the cell; empty when out of bounds.
    pub(crate) fn occupants(&self, cell: CellCoord) -> impl Iterator<Item = Occupant> + '_ {
        self.index(cell)
            .map(|index| self.cells[index].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|id| self.occupants[id.0 as usize])
    }

    pub(crate) fn is_empty(&self, cell: CellCoord) -> bool {
        self.occupants(cell).next().is_none()
    }

    /// Evaluated on every query because cleaners move between calls.
    pub(crate) fn is_traversable(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.occupants(cell).any(|occupant| occupant.blocks_traversal())
    }

    pub(crate) fn has_station(&self, cell: CellCoord) -> bool {
        self.station_at(cell).is_some()
    }

    pub(crate) fn station_at(&self, cell: CellCoord) -> Option<StationId> {
        self.occupants(cell).find_map(|occupant| match occupant {
            Occupant::Station(station) => Some(station),
            _ => None,
        })
    }

    /// Cleaners standing on the cell, sorted by identifier.
    pub(crate) fn cleaners_at(&self, cell: CellCoord) -> Vec<AgentId> {
        let mut agents: Vec<AgentId> = self
            .occupants(cell)
            .filter_map(|occupant| match occupant {
                Occupant::Cleaner(agent) => Some(agent),
                _ => None,
            })
            .collect();
        agents.sort();
        agents
    }

    pub(crate) fn dirt(&self, cell: CellCoord) -> Option<bool> {
        self.occupants(cell).find_map(|occupant| match occupant {
            Occupant::Dirt { dirty } => Some(dirty),
            _ => None,
        })
    }

    /// Flips a dirty floor tile to clean, reporting whether anything changed.
    pub(crate) fn clean(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };

        for id in &self.cells[index] {
            if let Occupant::Dirt { dirty } = &mut self.occupants[id.0 as usize] {
                if *dirty {
                    *dirty = false;
                    return true;
                }
            }
        }
        false
    }

    pub(crate) fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        navigation::neighbors(cell, self.width, self.height)
    }
}

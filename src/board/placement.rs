//! Placement board: grid cells holding units before a battle
//!
//! The board owns what stands on each cell. While locked (a battle is
//! running) every placement command is rejected without touching
//! occupancy.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::config::BoardConfig;
use crate::core::error::PlacementError;
use crate::core::types::GridCoord;
use crate::units::stats::{Team, UnitStats};

/// A unit standing on a board cell
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedUnit {
    pub stats: Arc<UnitStats>,
}

impl PlacedUnit {
    pub fn team(&self) -> Team {
        self.stats.team
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementBoard {
    cells: BTreeMap<GridCoord, Option<PlacedUnit>>,
    locked: bool,
}

impl PlacementBoard {
    /// Rectangular board of `width` x `height` cells
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_cells((0..height).flat_map(|y| (0..width).map(move |x| GridCoord::new(x, y))))
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Board over an arbitrary set of cells
    pub fn with_cells(cells: impl IntoIterator<Item = GridCoord>) -> Self {
        Self {
            cells: cells.into_iter().map(|c| (c, None)).collect(),
            locked: false,
        }
    }

    /// Put a unit on an empty cell
    pub fn place(&mut self, cell: GridCoord, stats: Arc<UnitStats>) -> Result<(), PlacementError> {
        if self.locked {
            return Err(PlacementError::Locked);
        }
        let slot = self
            .cells
            .get_mut(&cell)
            .ok_or(PlacementError::UnknownCell(cell))?;
        if slot.is_some() {
            return Err(PlacementError::AlreadyOccupied(cell));
        }
        *slot = Some(PlacedUnit { stats });
        Ok(())
    }

    /// Take the unit off a cell
    pub fn remove(&mut self, cell: GridCoord) -> Result<PlacedUnit, PlacementError> {
        if self.locked {
            return Err(PlacementError::Locked);
        }
        let slot = self
            .cells
            .get_mut(&cell)
            .ok_or(PlacementError::UnknownCell(cell))?;
        slot.take().ok_or(PlacementError::Empty(cell))
    }

    pub fn occupant(&self, cell: GridCoord) -> Option<&PlacedUnit> {
        self.cells.get(&cell).and_then(|slot| slot.as_ref())
    }

    pub fn contains(&self, cell: GridCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn is_occupied(&self, cell: GridCoord) -> bool {
        self.occupant(cell).is_some()
    }

    /// Occupied cells in coordinate order
    pub fn occupied_cells(&self) -> Vec<GridCoord> {
        self.cells
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(&c, _)| c)
            .collect()
    }

    /// Free cells in coordinate order
    pub fn free_cells(&self) -> Vec<GridCoord> {
        self.cells
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(&c, _)| c)
            .collect()
    }

    /// Occupants of one team with their cells, in coordinate order
    pub fn occupants(&self, team: Team) -> impl Iterator<Item = (GridCoord, &PlacedUnit)> {
        self.cells.iter().filter_map(move |(&c, slot)| match slot {
            Some(unit) if unit.team() == team => Some((c, unit)),
            _ => None,
        })
    }

    pub fn count(&self, team: Team) -> usize {
        self.occupants(team).count()
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Empty every cell, regardless of the lock
    pub fn clear_all(&mut self) {
        for slot in self.cells.values_mut() {
            *slot = None;
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

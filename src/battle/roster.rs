//! Indexed roster of the units taking part in a battle
//!
//! Roster order is creation order and is stable across removals, so every
//! per-tick pass walks units in the same sequence. Targets are stored as
//! `UnitId`s and resolved here; removing a unit invalidates every stale
//! reference to it without any bookkeeping on the referrers.

use std::sync::Arc;

use ahash::AHashMap;

use crate::core::types::{GridCoord, UnitId, Vec2};
use crate::units::combat_unit::{CombatUnit, UnitState};
use crate::units::stats::{Team, UnitStats};

/// Read-only view of a unit as it stood at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub team: Team,
    pub position: Vec2,
    pub state: UnitState,
}

impl UnitSnapshot {
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }
}

impl From<&CombatUnit> for UnitSnapshot {
    fn from(unit: &CombatUnit) -> Self {
        Self {
            id: unit.id,
            team: unit.team(),
            position: unit.position,
            state: unit.state(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<CombatUnit>,
    index: AHashMap<UnitId, usize>,
    next_id: u32,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit at the end of the roster
    pub fn spawn(
        &mut self,
        stats: Arc<UnitStats>,
        position: Vec2,
        origin_cell: Option<GridCoord>,
    ) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;

        let mut unit = CombatUnit::new(id, stats, position);
        unit.origin_cell = origin_cell;

        self.index.insert(id, self.units.len());
        self.units.push(unit);
        id
    }

    pub fn get(&self, id: UnitId) -> Option<&CombatUnit> {
        self.index.get(&id).map(|&i| &self.units[i])
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut CombatUnit> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.units[i]),
            None => None,
        }
    }

    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn units(&self) -> &[CombatUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [CombatUnit] {
        &mut self.units
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &CombatUnit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.iter_alive().filter(|u| u.team() == team).count()
    }

    /// Remove every unit matching the predicate, returning their ids
    pub fn remove_where(&mut self, mut pred: impl FnMut(&CombatUnit) -> bool) -> Vec<UnitId> {
        let removed: Vec<UnitId> = self.units.iter().filter(|u| pred(u)).map(|u| u.id).collect();
        if removed.is_empty() {
            return removed;
        }
        self.units.retain(|u| !removed.contains(&u.id));
        self.rebuild_index();
        removed
    }

    pub fn clear(&mut self) {
        self.units.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Positions and states of every unit, in roster order
    pub fn snapshot(&self) -> Vec<UnitSnapshot> {
        self.units.iter().map(UnitSnapshot::from).collect()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, u) in self.units.iter().enumerate() {
            self.index.insert(u.id, i);
        }
    }
}

//! Enemy waves placed onto the board before a battle
//!
//! A wave lists enemy unit names with either a fixed cell or a random one.
//! Random cells come from the spawn zone when it has room, else from
//! anywhere free on the board. A failed entry is reported and skipped;
//! it never aborts the rest of the wave.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::placement::PlacementBoard;
use crate::core::config::BoardConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::GridCoord;
use crate::units::catalog::UnitCatalog;
use crate::units::stats::Team;

/// One enemy in a wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Catalog name of the unit
    pub unit: String,
    /// Fixed cell; `None` picks a random free cell
    #[serde(default)]
    pub cell: Option<GridCoord>,
}

impl EnemySpawn {
    pub fn at(unit: impl Into<String>, cell: GridCoord) -> Self {
        Self {
            unit: unit.into(),
            cell: Some(cell),
        }
    }

    pub fn random(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            cell: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub name: String,
    #[serde(default = "default_wave_number")]
    pub number: u32,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
}

fn default_wave_number() -> u32 {
    1
}

impl WaveConfig {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Self {
            name: name.into(),
            number,
            enemies: Vec::new(),
        }
    }

    pub fn with_enemy(mut self, spawn: EnemySpawn) -> Self {
        self.enemies.push(spawn);
        self
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }
}

/// An entry that could not be placed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnFailure {
    pub unit: String,
    pub cell: Option<GridCoord>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaveSpawnReport {
    pub wave: String,
    pub spawned: Vec<GridCoord>,
    pub failed: Vec<SpawnFailure>,
}

/// Places waves of enemies onto a board, in order
#[derive(Debug, Clone)]
pub struct WaveSpawner {
    waves: Vec<WaveConfig>,
    current: Option<usize>,
    zone: BoardConfig,
    rng: ChaCha8Rng,
}

impl WaveSpawner {
    pub fn new(waves: Vec<WaveConfig>, zone: BoardConfig, seed: u64) -> Self {
        Self {
            waves,
            current: None,
            zone,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Index of the wave spawned last, if any
    pub fn current_wave_index(&self) -> Option<usize> {
        self.current
    }

    pub fn waves(&self) -> &[WaveConfig] {
        &self.waves
    }

    /// Spawn the wave at `index` onto the board
    pub fn spawn_wave(
        &mut self,
        index: usize,
        board: &mut PlacementBoard,
        catalog: &UnitCatalog,
    ) -> Result<WaveSpawnReport> {
        let wave = self
            .waves
            .get(index)
            .cloned()
            .ok_or_else(|| BattleError::ConfigurationMissing(format!("wave {}", index)))?;
        self.current = Some(index);

        tracing::info!("Spawning wave '{}' ({} enemies)", wave.name, wave.enemy_count());

        let mut report = WaveSpawnReport {
            wave: wave.name.clone(),
            ..Default::default()
        };

        for entry in &wave.enemies {
            let cell = entry.cell.unwrap_or_else(|| self.pick_random_cell(board));
            match self.spawn_entry(entry, cell, board, catalog) {
                Ok(()) => report.spawned.push(cell),
                Err(err) => {
                    tracing::warn!("Could not spawn '{}' at {}: {}", entry.unit, cell, err);
                    report.failed.push(SpawnFailure {
                        unit: entry.unit.clone(),
                        cell: Some(cell),
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Wave '{}' done: {} spawned, {} failed",
            report.wave,
            report.spawned.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Spawn the wave after the current one; `None` once all are used up
    pub fn spawn_next_wave(
        &mut self,
        board: &mut PlacementBoard,
        catalog: &UnitCatalog,
    ) -> Result<Option<WaveSpawnReport>> {
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.waves.len() {
            tracing::info!("All waves spawned");
            return Ok(None);
        }
        self.spawn_wave(next, board, catalog).map(Some)
    }

    fn spawn_entry(
        &self,
        entry: &EnemySpawn,
        cell: GridCoord,
        board: &mut PlacementBoard,
        catalog: &UnitCatalog,
    ) -> Result<()> {
        let stats = catalog.resolve(&entry.unit)?.on_team(Team::Enemy);
        board.place(cell, Arc::new(stats))?;
        Ok(())
    }

    /// Random free cell, preferring the spawn zone
    ///
    /// With no free cell at all this returns the zone centre, which the
    /// placement then rejects.
    fn pick_random_cell(&mut self, board: &PlacementBoard) -> GridCoord {
        let free = board.free_cells();
        let in_zone: Vec<GridCoord> = free
            .iter()
            .copied()
            .filter(|&c| self.zone.in_spawn_zone(c))
            .collect();

        in_zone
            .choose(&mut self.rng)
            .or_else(|| free.choose(&mut self.rng))
            .copied()
            .unwrap_or_else(|| self.zone.spawn_zone_center())
    }
}

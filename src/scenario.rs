//! Scenario files: unit templates, hero placements and enemy waves
//!
//! ```toml
//! [config.round]
//! fade_enabled = false
//!
//! [[units]]
//! name = "Knight"
//! max_health = 120
//! damage = 12
//! attack_speed = 1.0
//! attack_range = 40.0
//! move_speed = 60.0
//!
//! [[heroes]]
//! unit = "Knight"
//! cell = { x = 1, y = 2 }
//!
//! [[waves]]
//! name = "Wave 1"
//! enemies = [{ unit = "Goblin" }, { unit = "Goblin", cell = { x = 7, y = 3 } }]
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::waves::{WaveConfig, WaveSpawner};
use crate::core::config::BattleConfig;
use crate::core::error::Result;
use crate::core::types::GridCoord;
use crate::round::lifecycle::BattleSimulation;
use crate::units::catalog::UnitCatalog;
use crate::units::stats::{Team, UnitStats};

/// A hero the player has put on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroPlacement {
    pub unit: String,
    pub cell: GridCoord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: BattleConfig,
    pub units: Vec<UnitStats>,
    pub heroes: Vec<HeroPlacement>,
    pub waves: Vec<WaveConfig>,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Catalog of every unit template, validated
    pub fn catalog(&self) -> Result<UnitCatalog> {
        UnitCatalog::from_stats(self.units.iter().cloned())
    }

    /// Simulation with the heroes placed, plus a spawner for the waves
    ///
    /// Heroes that cannot be placed are logged and left out.
    pub fn build(&self, seed: u64) -> Result<(BattleSimulation, WaveSpawner, UnitCatalog)> {
        let catalog = self.catalog()?;
        let mut sim = BattleSimulation::new(self.config.clone())?;

        for hero in &self.heroes {
            let stats = match catalog.resolve(&hero.unit) {
                Ok(stats) => stats.on_team(Team::Friendly),
                Err(err) => {
                    tracing::warn!("Skipping hero at {}: {}", hero.cell, err);
                    continue;
                }
            };
            if let Err(err) = sim.place(hero.cell, Arc::new(stats)) {
                tracing::warn!("Skipping hero '{}': {}", hero.unit, err);
            }
        }

        let spawner = WaveSpawner::new(self.waves.clone(), self.config.board.clone(), seed);
        Ok((sim, spawner, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        [config.round]
        fade_enabled = false

        [[units]]
        name = "Knight"
        max_health = 120
        damage = 12
        attack_speed = 1.0
        attack_range = 40.0
        move_speed = 60.0

        [[units]]
        name = "Goblin"
        max_health = 40
        damage = 5
        attack_speed = 1.5
        attack_range = 40.0
        move_speed = 70.0
        team = "enemy"

        [[heroes]]
        unit = "Knight"
        cell = { x = 1, y = 2 }

        [[heroes]]
        unit = "Paladin"
        cell = { x = 2, y = 2 }

        [[waves]]
        name = "Wave 1"
        enemies = [{ unit = "Goblin", cell = { x = 7, y = 3 } }, { unit = "Goblin" }]
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml_str(SMALL).unwrap();
        assert_eq!(scenario.units.len(), 2);
        assert_eq!(scenario.units[1].team, Team::Enemy);
        assert!(!scenario.config.round.fade_enabled);
        assert_eq!(scenario.waves[0].number, 1);
        assert_eq!(scenario.waves[0].enemies[0].cell, Some(GridCoord::new(7, 3)));
        assert_eq!(scenario.waves[0].enemies[1].cell, None);
    }

    #[test]
    fn test_build_skips_unknown_hero() {
        let scenario = Scenario::from_toml_str(SMALL).unwrap();
        let (sim, spawner, catalog) = scenario.build(1).unwrap();
        assert_eq!(sim.board().occupied_cells(), vec![GridCoord::new(1, 2)]);
        assert_eq!(spawner.wave_count(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let bad = r#"
            [[units]]
            name = "Statue"
            max_health = 10
            damage = 1
            attack_speed = 0.0
            attack_range = 1.0
            move_speed = 1.0
        "#;
        let scenario = Scenario::from_toml_str(bad).unwrap();
        assert!(scenario.catalog().is_err());
    }
}

//! Battle configuration with documented constants
//!
//! All tunable numbers for separation, combat, the round cycle and the
//! board live here. Every field has a default, so a TOML file only needs
//! to name the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};
use crate::core::types::{GridCoord, Seconds};

/// Ally repulsion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Neighbors farther than this (world units) exert no push
    pub avoidance_radius: f32,

    /// Inside this distance the push strength is doubled
    ///
    /// Must not exceed `avoidance_radius`.
    pub personal_space: f32,

    /// Multiplier turning the averaged strength into a velocity
    pub avoidance_force: f32,

    /// Only same-team units push each other when set
    pub avoid_only_allies: bool,

    /// Pairs closer than this contribute nothing
    ///
    /// Two units on the exact same spot have no meaningful direction to
    /// push along.
    pub min_separation_distance: f32,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            avoidance_radius: 50.0,
            personal_space: 30.0,
            avoidance_force: 100.0,
            avoid_only_allies: true,
            min_separation_distance: 0.1,
        }
    }
}

/// Per-unit combat settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds a corpse stays in the roster before removal (0 = never)
    pub corpse_retention: Seconds,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            corpse_retention: 3.0,
        }
    }
}

/// Timing of the victory resolution sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Pause after the last enemy falls before the screen fades
    pub victory_delay: Seconds,

    /// Pause after the board is cleared and unlocked
    pub settle_delay: Seconds,

    /// Pause after each hero respawn
    pub respawn_delay: Seconds,

    /// Pause after the last respawn before fading back in
    pub post_respawn_delay: Seconds,

    /// Whether the resolution waits on an external fade effect
    pub fade_enabled: bool,

    /// Give up waiting on a fade after this long (None = wait forever)
    pub fade_timeout: Option<Seconds>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            victory_delay: 2.0,
            settle_delay: 0.3,
            respawn_delay: 0.5,
            post_respawn_delay: 0.2,
            fade_enabled: true,
            fade_timeout: Some(5.0),
        }
    }
}

/// Board geometry and the enemy spawn zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,

    /// Diamond tile width in world units
    pub tile_width: f32,

    /// Diamond tile height in world units (usually half the width)
    pub tile_height: f32,

    /// Inclusive x range random enemy spawns prefer
    pub spawn_zone_x: (i32, i32),

    /// Inclusive y range random enemy spawns prefer
    pub spawn_zone_y: (i32, i32),
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            tile_width: 64.0,
            tile_height: 32.0,
            spawn_zone_x: (5, 9),
            spawn_zone_y: (0, 9),
        }
    }
}

impl BoardConfig {
    pub fn in_spawn_zone(&self, coord: GridCoord) -> bool {
        coord.x >= self.spawn_zone_x.0
            && coord.x <= self.spawn_zone_x.1
            && coord.y >= self.spawn_zone_y.0
            && coord.y <= self.spawn_zone_y.1
    }

    pub fn spawn_zone_center(&self) -> GridCoord {
        GridCoord::new(
            (self.spawn_zone_x.0 + self.spawn_zone_x.1) / 2,
            (self.spawn_zone_y.0 + self.spawn_zone_y.1) / 2,
        )
    }
}

/// Complete configuration for one battle simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub separation: SeparationConfig,
    pub combat: CombatConfig,
    pub round: RoundConfig,
    pub board: BoardConfig,
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let sep = &self.separation;
        if sep.avoidance_radius <= 0.0 || sep.personal_space < 0.0 {
            return Err(BattleError::InvalidConfig(
                "separation radii must be positive".into(),
            ));
        }
        if sep.personal_space > sep.avoidance_radius {
            return Err(BattleError::InvalidConfig(format!(
                "personal_space ({}) should be <= avoidance_radius ({})",
                sep.personal_space, sep.avoidance_radius
            )));
        }
        if sep.avoidance_force < 0.0 {
            return Err(BattleError::InvalidConfig(
                "avoidance_force must not be negative".into(),
            ));
        }

        if self.combat.corpse_retention < 0.0 {
            return Err(BattleError::InvalidConfig(
                "corpse_retention must not be negative".into(),
            ));
        }

        let round = &self.round;
        let delays = [
            round.victory_delay,
            round.settle_delay,
            round.respawn_delay,
            round.post_respawn_delay,
        ];
        if delays.iter().any(|d| *d < 0.0) || round.fade_timeout.is_some_and(|t| t < 0.0) {
            return Err(BattleError::InvalidConfig(
                "round delays must not be negative".into(),
            ));
        }

        let board = &self.board;
        if board.width <= 0 || board.height <= 0 {
            return Err(BattleError::InvalidConfig(format!(
                "board must have positive size, got {}x{}",
                board.width, board.height
            )));
        }
        if board.tile_width <= 0.0 || board.tile_height <= 0.0 {
            return Err(BattleError::InvalidConfig(
                "tile dimensions must be positive".into(),
            ));
        }
        let (x0, x1) = board.spawn_zone_x;
        let (y0, y1) = board.spawn_zone_y;
        if x0 > x1 || y0 > y1 || x0 < 0 || y0 < 0 || x1 >= board.width || y1 >= board.height {
            return Err(BattleError::InvalidConfig(format!(
                "spawn zone x{:?} y{:?} must lie inside the {}x{} board",
                board.spawn_zone_x, board.spawn_zone_y, board.width, board.height
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_separation_values() {
        let config = BattleConfig::default();
        assert_eq!(config.separation.avoidance_radius, 50.0);
        assert_eq!(config.separation.personal_space, 30.0);
        assert_eq!(config.separation.avoidance_force, 100.0);
        assert!(config.separation.avoid_only_allies);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BattleConfig::from_toml_str(
            r#"
            [round]
            victory_delay = 1.0
            fade_enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.round.victory_delay, 1.0);
        assert!(!config.round.fade_enabled);
        assert_eq!(config.round.respawn_delay, 0.5);
        assert_eq!(config.board.width, 10);
    }

    #[test]
    fn test_personal_space_larger_than_radius_rejected() {
        let mut config = BattleConfig::default();
        config.separation.personal_space = 80.0;
        assert!(matches!(
            config.validate(),
            Err(BattleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_spawn_zone_outside_board_rejected() {
        let mut config = BattleConfig::default();
        config.board.spawn_zone_x = (5, 12);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spawn_zone_center() {
        let board = BoardConfig::default();
        assert_eq!(board.spawn_zone_center(), GridCoord::new(7, 4));
        assert!(board.in_spawn_zone(GridCoord::new(5, 0)));
        assert!(!board.in_spawn_zone(GridCoord::new(4, 0)));
    }
}

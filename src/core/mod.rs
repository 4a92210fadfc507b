pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, BoardConfig, CombatConfig, RoundConfig, SeparationConfig};
pub use error::{BattleError, PlacementError, Result};
pub use types::{GridCoord, Seconds, UnitId, Vec2};

//! Combat units: stats templates and live per-battle units

pub mod catalog;
pub mod combat_unit;
pub mod stats;

pub use catalog::UnitCatalog;
pub use combat_unit::{CombatUnit, DamageOutcome, UnitState};
pub use stats::{Archetype, Team, UnitStats};

//! Round cycle: placement, battle and the victory resolution

pub mod lifecycle;
pub mod resolution;

pub use lifecycle::{BattleSimulation, PlacementRecord, RoundPhase};
pub use resolution::{ResolutionAction, ResolutionSchedule, ResolutionStep};

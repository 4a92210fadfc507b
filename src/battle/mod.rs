//! Battle system - per-tick combat between two teams
//!
//! Units pick the nearest enemy, close to attack range and strike on a
//! cooldown. Allies moving together push each other apart. The battle ends
//! when one side has no living units left.

pub mod constants;
pub mod events;
pub mod execution;
pub mod roster;
pub mod separation;
pub mod spatial;
pub mod targeting;

pub use constants::*;
pub use events::{
    AnimationCue, BattleEvent, BattleEventLog, BattleEventType, BattleOutcome, FadeDirection,
};
pub use execution::{check_battle_end, BattleState};
pub use roster::{Roster, UnitSnapshot};
pub use separation::{
    compute_separation, compute_separation_indexed, is_path_clear, separation_displacement,
};
pub use spatial::SparseHashGrid;
pub use targeting::{is_eligible, NearestEnemy, TargetingPolicy};

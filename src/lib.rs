//! Grid Autobattler - combat simulation and round lifecycle
//!
//! Heroes are placed on an isometric board, a wave of enemies is spawned
//! against them and the battle resolves on its own, tick by tick. Winning
//! puts the heroes back where they stood for the next round.

pub mod battle;
pub mod board;
pub mod core;
pub mod round;
pub mod scenario;
pub mod units;

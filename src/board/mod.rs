//! Placement board: cells, isometric layout and enemy waves

pub mod layout;
pub mod placement;
pub mod waves;

pub use layout::IsoLayout;
pub use placement::{PlacedUnit, PlacementBoard};
pub use waves::{EnemySpawn, SpawnFailure, WaveConfig, WaveSpawnReport, WaveSpawner};

use thiserror::Error;

use crate::core::types::GridCoord;

/// Rejection of a placement board command
///
/// None of these change board state; callers decide whether to retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Cell {0} is already occupied")]
    AlreadyOccupied(GridCoord),

    #[error("Cell {0} is empty")]
    Empty(GridCoord),

    #[error("Placement is locked while a battle is in progress")]
    Locked,

    #[error("No cell at {0}")]
    UnknownCell(GridCoord),
}

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid stats for '{name}': {reason}")]
    InvalidStats { name: String, reason: String },

    #[error("Placement rejected: {0}")]
    Placement(#[from] PlacementError),

    #[error("Invalid phase: expected {expected}, round is {actual}")]
    InvalidPhase {
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;

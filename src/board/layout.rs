//! Isometric projection between board cells and world positions

use crate::core::config::BoardConfig;
use crate::core::types::{GridCoord, Vec2};

/// Diamond-grid geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoLayout {
    pub tile_width: f32,
    pub tile_height: f32,
    /// World position of cell (0, 0)
    pub origin: Vec2,
}

impl IsoLayout {
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        Self {
            tile_width,
            tile_height,
            origin: Vec2::ZERO,
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.tile_width, config.tile_height)
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Centre of a cell in world space
    pub fn cell_to_world(&self, cell: GridCoord) -> Vec2 {
        let x = (cell.x - cell.y) as f32 * (self.tile_width / 2.0);
        let y = (cell.x + cell.y) as f32 * (self.tile_height / 2.0);
        self.origin + Vec2::new(x, y)
    }

    /// Cell whose diamond contains a world position
    pub fn world_to_cell(&self, pos: Vec2) -> GridCoord {
        let local = pos - self.origin;
        let a = local.x / (self.tile_width / 2.0);
        let b = local.y / (self.tile_height / 2.0);
        // a = x - y, b = x + y
        GridCoord::new(((a + b) / 2.0).round() as i32, ((b - a) / 2.0).round() as i32)
    }
}

impl Default for IsoLayout {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

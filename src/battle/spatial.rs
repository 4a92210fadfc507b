//! Sparse hash grid for neighbor queries over a tick snapshot

use ahash::AHashMap;

use crate::battle::roster::UnitSnapshot;
use crate::core::types::Vec2;

/// Buckets snapshot indices by world-space cell
///
/// With `cell_size` at least the query radius, a 3x3 neighborhood always
/// covers every candidate.
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl SparseHashGrid {
    fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
        }
    }

    /// Build a grid over the living units of a snapshot
    pub fn from_snapshot(cell_size: f32, snapshot: &[UnitSnapshot]) -> Self {
        let mut grid = Self::new(cell_size);
        for (i, unit) in snapshot.iter().enumerate() {
            if unit.is_alive() {
                grid.insert(i, unit.position);
            }
        }
        grid
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    fn insert(&mut self, index: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(index);
    }

    /// Query all indices in neighboring cells (3x3 neighborhood)
    pub fn query_neighbors(&self, pos: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Indices strictly within `radius` of `center`, in ascending order
    pub fn query_radius(&self, center: Vec2, radius: f32, snapshot: &[UnitSnapshot]) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .query_neighbors(center)
            .filter(|&i| {
                snapshot
                    .get(i)
                    .map(|u| center.distance(&u.position) < radius)
                    .unwrap_or(false)
            })
            .collect();
        found.sort_unstable();
        found
    }
}

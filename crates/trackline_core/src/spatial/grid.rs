//! Uniform spatial hash grid over the ground plane (`x`, `z`).

use std::collections::HashMap;

/// Integer cell coordinate: `(floor(x / cell_size), floor(z / cell_size))`.
pub type CellKey = (i32, i32);

/// Offsets of the 3x3 block around a cell, in query order.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Spatial hash grid mapping cells to the runner ids inside them.
///
/// With `cell_size >= min_separation`, any two runners closer than
/// `min_separation` sit in the same or adjacent cells, so a 3x3 query around
/// one of them always returns the other.
///
/// Bucket vectors are parked in a spare pool on [`clear`](Self::clear) and
/// handed out again on [`insert`](Self::insert), so a steady-state rebuild does
/// not allocate.
#[derive(Debug)]
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<u32>>,
    spare: Vec<Vec<u32>>,
    len: usize,
}

impl SpatialHashGrid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not finite and positive.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self::with_capacity(cell_size, 0)
    }

    /// Creates an empty grid with room for `cells` occupied cells.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not finite and positive.
    #[must_use]
    pub fn with_capacity(cell_size: f32, cells: usize) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be finite and positive"
        );
        Self {
            cell_size,
            cells: HashMap::with_capacity(cells),
            spare: Vec::with_capacity(cells),
            len: 0,
        }
    }

    /// Edge length of a cell.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of ids inserted since the last clear.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if nothing was inserted since the last clear.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells.
    #[inline]
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing the point `(x, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, x: f32, z: f32) -> CellKey {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Empties every cell, keeping the bucket allocations for reuse.
    pub fn clear(&mut self) {
        for (_, mut bucket) in self.cells.drain() {
            bucket.clear();
            self.spare.push(bucket);
        }
        self.len = 0;
    }

    /// Adds `id` to the cell containing `(x, z)`.
    pub fn insert(&mut self, id: u32, x: f32, z: f32) {
        let key = self.cell_of(x, z);
        let spare = &mut self.spare;
        self.cells
            .entry(key)
            .or_insert_with(|| spare.pop().unwrap_or_default())
            .push(id);
        self.len += 1;
    }

    /// Ids of the cell at `key`, empty if unoccupied.
    #[inline]
    #[must_use]
    pub fn cell(&self, key: CellKey) -> &[u32] {
        self.cells.get(&key).map_or(&[][..], Vec::as_slice)
    }

    /// Collects the ids in the 3x3 block of cells around `(x, z)` into `out`.
    ///
    /// `out` is cleared first. Cells are visited in a fixed order and each
    /// cell keeps insertion order, so the result is deterministic for a given
    /// insertion sequence. Each id appears at most once.
    pub fn query_neighbors(&self, x: f32, z: f32, out: &mut Vec<u32>) {
        out.clear();
        let (cx, cz) = self.cell_of(x, z);
        for (dx, dz) in NEIGHBOR_OFFSETS {
            let key = (cx.saturating_add(dx), cz.saturating_add(dz));
            if let Some(bucket) = self.cells.get(&key) {
                out.extend_from_slice(bucket);
            }
        }
    }
}

//! # Collision System
//!
//! Keeps runners from overlapping by pushing the trailing runner of each
//! close pair sideways, then lets everybody drift back toward the inside
//! lane. Collisions never slow anybody down and never move the leader.
//!
//! Candidate pairs come from a [`SpatialHashGrid`] rebuilt every tick from
//! the world positions written by path mapping.

use trackline_core::{ColumnsMut, SpatialHashGrid};
use trackline_shared::constants::{clamp_lane, MIN_LANE};

use crate::config::CollisionConfig;

/// Per-tick collision counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Pairs that survived the cheap distance/lane gate.
    pub candidate_pairs: u32,
    /// Pairs found closer than the minimum separation.
    pub overlapping_pairs: u32,
}

/// The collision pass. Owns the grid and the query scratch buffer so a
/// steady-state tick does not allocate.
#[derive(Debug)]
pub struct CollisionSystem {
    config: CollisionConfig,
    grid: SpatialHashGrid,
    neighbors: Vec<u32>,
}

impl CollisionSystem {
    /// Creates the system, sizing the grid for `capacity` runners.
    ///
    /// # Panics
    ///
    /// Panics if `config.cell_size` is not finite and positive.
    #[must_use]
    pub fn new(config: CollisionConfig, capacity: usize) -> Self {
        let grid = SpatialHashGrid::with_capacity(config.cell_size, capacity);
        Self {
            config,
            grid,
            neighbors: Vec::with_capacity(capacity),
        }
    }

    /// Returns the tuning in use.
    #[must_use]
    pub const fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// The grid as built by the last update.
    #[must_use]
    pub const fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    /// Rebuilds the grid, separates overlapping pairs, applies inward drift.
    #[allow(clippy::cast_possible_truncation)]
    pub fn update(&mut self, cols: &mut ColumnsMut<'_>, delta: f32) -> CollisionStats {
        let cfg = &self.config;
        let positions = &mut *cols.positions;

        self.grid.clear();
        for (id, pos) in positions.iter().enumerate() {
            self.grid.insert(id as u32, pos.world_x, pos.world_z);
        }

        let min_separation = cfg.min_separation();
        let push_scale = cfg.push_strength * delta;
        let mut stats = CollisionStats::default();

        for i in 0..positions.len() {
            let (x, z) = (positions[i].world_x, positions[i].world_z);
            self.grid.query_neighbors(x, z, &mut self.neighbors);

            // Each id shows up once per query and only j > i is taken, so every
            // pair is handled at most once per tick.
            for &j in &self.neighbors {
                let j = j as usize;
                if j <= i {
                    continue;
                }

                let a = positions[i];
                let b = positions[j];
                if (a.distance - b.distance).abs() > cfg.distance_gate
                    || (a.lane - b.lane).abs() > cfg.lane_gate
                {
                    continue;
                }
                stats.candidate_pairs += 1;

                let d = a.planar_distance_squared(&b).sqrt();
                if d <= cfg.epsilon || d >= min_separation {
                    continue;
                }
                stats.overlapping_pairs += 1;

                // On a distance tie the higher id trails.
                let (trail, lead) = if a.distance < b.distance { (i, j) } else { (j, i) };
                let lead_lane = positions[lead].lane;
                let trailing = &mut positions[trail];
                let push = (min_separation - d) * push_scale;
                trailing.lane = if trailing.lane >= lead_lane {
                    clamp_lane(trailing.lane + push)
                } else if trailing.lane - push >= MIN_LANE {
                    trailing.lane - push
                } else {
                    // No room inside the leader: go round the outside.
                    clamp_lane((trailing.lane + push).max(lead_lane))
                };
            }
        }

        let drift = cfg.drift_speed * delta;
        for pos in positions.iter_mut() {
            if pos.lane > MIN_LANE {
                pos.lane = (pos.lane - drift * pos.lane).max(MIN_LANE);
            }
        }

        stats
    }
}

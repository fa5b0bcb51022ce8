//! # Spatial Indexing
//!
//! Per-tick acceleration structure for neighbor queries on the ground plane.
//! Rebuilt from scratch every tick; nothing survives between ticks except the
//! recycled bucket allocations.

mod grid;

pub use grid::{CellKey, SpatialHashGrid};

//! # TRACKLINE Core
//!
//! Fixed-capacity runner storage and neighbor search for the race simulation:
//! - O(100) runners ticked every frame
//! - Zero allocations once the race is set up
//! - State laid out so a render consumer can read it without copying
//!
//! ## Architecture Rules
//!
//! 1. **Capacity is fixed** - arrays are sized once, `add` only moves a cursor
//! 2. **Data-oriented design** - every component is its own dense array
//! 3. **Deterministic** - all randomness comes from a seeded `ChaCha8Rng`
//!
//! ## Example
//!
//! ```rust,ignore
//! use trackline_core::{ComponentStore, RaceProfile};
//!
//! let mut store = ComponentStore::new(100, 5, 0x5EED);
//! let profile = RaceProfile::new(vec![180.0, 360.0, 540.0, 720.0, 900.0])?;
//! let id = store.add_entity(&profile, 1.0, true)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod spatial;

pub use ecs::{
    Animation, ColumnsMut, Component, ComponentStorage, ComponentStore, EntityId, Position,
    ProfileTable, RaceProfile, StatusFlags, Velocity,
};
pub use error::{CoreError, CoreResult};
pub use spatial::{CellKey, SpatialHashGrid};

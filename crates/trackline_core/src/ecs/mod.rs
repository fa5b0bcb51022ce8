//! # Entity Component Store
//!
//! A fixed-capacity, structure-of-arrays store for runner state.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated when the race is set up
//! - Each component lives in its own dense array, indexed by entity id
//! - Entity IDs are plain indices; runners are added, reset, never removed
//! - No dynamic dispatch in hot paths

mod component;
mod entity;
mod storage;
mod store;

pub use component::{Animation, Component, Position, RaceProfile, StatusFlags, Velocity};
pub use entity::EntityId;
pub use storage::ComponentStorage;
pub use store::{ColumnsMut, ComponentStore, ProfileTable};

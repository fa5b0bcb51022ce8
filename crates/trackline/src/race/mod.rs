//! # Race Session
//!
//! Everything around the per-frame tick that makes it a race: a generated
//! field, the start formation, countdown, race clock, finish order, heats.

pub mod field;
mod session;

pub use session::{GameState, RaceResult, RaceSession};

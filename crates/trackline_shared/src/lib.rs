//! # TRACKLINE Shared
//!
//! Common types used by the core, the simulation crate and external consumers
//! (render loop, snapshot adapters, replay tools).
//!
//! ## CRITICAL RULE
//!
//! This crate holds data only. No systems, no ticking, no I/O.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod protocol;

pub use constants::{LANE_OVERFLOW, MAX_LANE, MIN_LANE, TICK_RATE};
pub use math::Vec3;
pub use protocol::{RaceSnapshot, RaceStatus, RunnerSnapshot};

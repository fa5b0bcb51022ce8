//! # Simulation Systems
//!
//! Stateless-per-tick passes over the component columns. Each system runs
//! over every active runner in id order, which keeps results deterministic.

pub mod collision;
pub mod movement;

pub use collision::{CollisionStats, CollisionSystem};
pub use movement::MovementSystem;

use crate::error::{SimError, SimResult};

/// Per-tick input handed to every system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInput {
    /// Wall-clock seconds since the previous tick.
    pub delta: f32,
    /// Distance at which a runner counts as finished (meters).
    pub race_distance: f32,
    /// Race-clock seconds per wall-clock second.
    pub time_scale: f32,
}

impl TickInput {
    /// Creates a tick input.
    #[inline]
    #[must_use]
    pub const fn new(delta: f32, race_distance: f32, time_scale: f32) -> Self {
        Self {
            delta,
            race_distance,
            time_scale,
        }
    }

    /// Checks the preconditions every system relies on.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidTickInput`] if a value is non-finite or not positive.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(SimError::InvalidTickInput("delta must be finite and positive"));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(SimError::InvalidTickInput(
                "time scale must be finite and positive",
            ));
        }
        if !(self.race_distance.is_finite() && self.race_distance > 0.0) {
            return Err(SimError::InvalidTickInput(
                "race distance must be finite and positive",
            ));
        }
        Ok(())
    }
}

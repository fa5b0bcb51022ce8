//! # Track & Pacing Constants
//!
//! Values every participant must agree on. Lane values are expressed in lane
//! widths measured from the inside edge of the route; the path provider turns
//! them into meters.

// =============================================================================
// LANES
// =============================================================================

/// Innermost lane position a runner may occupy.
pub const MIN_LANE: f32 = 0.75;

/// Outermost regular lane position.
pub const MAX_LANE: f32 = 2.0;

/// How far past [`MAX_LANE`] a collision push or a start formation may place a
/// runner. The hard upper bound is `MAX_LANE + LANE_OVERFLOW`.
pub const LANE_OVERFLOW: f32 = 0.25;

/// Clamps a lane position into `[MIN_LANE, MAX_LANE + LANE_OVERFLOW]`.
#[inline]
#[must_use]
pub fn clamp_lane(lane: f32) -> f32 {
    lane.clamp(MIN_LANE, MAX_LANE + LANE_OVERFLOW)
}

// =============================================================================
// PACING
// =============================================================================

/// Reference race distance the pacing tables are tuned for (meters).
pub const REFERENCE_DISTANCE: f32 = 5000.0;

/// Speed at which the stride animation runs at 1x (a 10 minute 5K).
pub const BASE_ANIMATION_SPEED: f32 = REFERENCE_DISTANCE / 600.0;

/// How far ahead the path is sampled to derive the facing angle (meters).
pub const FACING_LOOKAHEAD: f32 = 2.0;

// =============================================================================
// FRAME TIMING
// =============================================================================

/// Nominal host frame rate (updates per second).
pub const TICK_RATE: u32 = 60;

/// Rolling window used for tick time averages (one second at [`TICK_RATE`]).
pub const TICK_HISTORY: usize = TICK_RATE as usize;

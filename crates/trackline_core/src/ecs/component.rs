//! # Component Types
//!
//! Components are pure data containers with no behavior.
//! They must be Copy and have a fixed size for zero-allocation storage.

use bytemuck::{Pod, Zeroable};

use crate::error::{CoreError, CoreResult};

/// Marker trait for components stored in a [`ComponentStorage`](super::ComponentStorage).
///
/// Components must be:
/// - `Copy`: No heap allocations, bitwise copyable
/// - `Pod`: Plain old data, readable as raw bytes by a render consumer
/// - `Default`: Must have a default value for pre-allocation
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {}

/// Where a runner is, along the route and in the world.
///
/// `distance` and `lane` are simulation state. The world coordinates and
/// `facing` are derived: the orchestrator writes them once per tick from the
/// path provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// Meters travelled along the route.
    pub distance: f32,
    /// Continuous lane offset from the inside edge.
    pub lane: f32,
    /// World X.
    pub world_x: f32,
    /// World Y (height).
    pub world_y: f32,
    /// World Z.
    pub world_z: f32,
    /// Heading around the vertical axis, radians.
    pub facing: f32,
}

impl Component for Position {}

impl Position {
    /// Creates a position on the route with no world mapping yet.
    #[inline]
    #[must_use]
    pub const fn on_route(distance: f32, lane: f32) -> Self {
        Self {
            distance,
            lane,
            world_x: 0.0,
            world_y: 0.0,
            world_z: 0.0,
            facing: 0.0,
        }
    }

    /// Squared distance to another runner on the ground plane.
    ///
    /// This avoids the sqrt call for distance comparisons.
    #[inline]
    #[must_use]
    pub fn planar_distance_squared(&self, other: &Self) -> f32 {
        let dx = self.world_x - other.world_x;
        let dz = self.world_z - other.world_z;
        dx * dx + dz * dz
    }

    /// True when every field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.distance.is_finite()
            && self.lane.is_finite()
            && self.world_x.is_finite()
            && self.world_y.is_finite()
            && self.world_z.is_finite()
            && self.facing.is_finite()
    }
}

/// Speed along the route (m/s). Both values are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// Speed actually applied this tick.
    pub current: f32,
    /// Speed the pacing plan asks for.
    pub target: f32,
}

impl Component for Velocity {}

/// Stride animation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Animation {
    /// Unbounded phase accumulator; consumers take it mod 1.
    pub phase: f32,
    /// Per-runner cadence multiplier, sampled once at creation.
    pub stride: f32,
}

impl Component for Animation {}

/// Runner status bitset.
///
/// A runner can hold several states at once (finished *and* incapacitated),
/// hence bits instead of an enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct StatusFlags(u8);

impl Component for StatusFlags {}

impl StatusFlags {
    /// Crossed the race distance.
    pub const FINISHED: Self = Self(1);
    /// Knocked over / out of action (visual state for the consumer).
    pub const INCAPACITATED: Self = Self(1 << 1);
    /// The runner the host player controls or follows. Survives resets.
    pub const PRIMARY: Self = Self(1 << 2);

    const ALL: u8 = 0b111;

    /// No flags set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds flags from raw bits, dropping unknown ones.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// True if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Sets or clears the bits of `other`.
    #[inline]
    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    /// Crossed the line?
    #[inline]
    #[must_use]
    pub const fn is_finished(self) -> bool {
        self.contains(Self::FINISHED)
    }

    /// Out of action?
    #[inline]
    #[must_use]
    pub const fn is_incapacitated(self) -> bool {
        self.contains(Self::INCAPACITATED)
    }

    /// Host-controlled runner?
    #[inline]
    #[must_use]
    pub const fn is_primary(self) -> bool {
        self.contains(Self::PRIMARY)
    }
}

impl std::ops::BitOr for StatusFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Validated pacing plan for one runner.
///
/// `splits[k]` is the race clock (seconds) at which the runner should reach
/// the end of segment `k`. The last split is the planned finish time.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceProfile {
    splits: Vec<f32>,
}

impl RaceProfile {
    /// Validates a split table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProfile`] if the table is empty, holds a
    /// non-finite value, starts at or below zero, or is not strictly
    /// increasing. Any of those would give a segment a non-finite pace.
    pub fn new(splits: Vec<f32>) -> CoreResult<Self> {
        let Some(&first) = splits.first() else {
            return Err(CoreError::InvalidProfile("split table is empty"));
        };
        if splits.iter().any(|t| !t.is_finite()) {
            return Err(CoreError::InvalidProfile("split time is not finite"));
        }
        if first <= 0.0 {
            return Err(CoreError::InvalidProfile("first split must be positive"));
        }
        if splits.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CoreError::InvalidProfile("split times must strictly increase"));
        }
        Ok(Self { splits })
    }

    /// Split timestamps, one per segment.
    #[inline]
    #[must_use]
    pub fn splits(&self) -> &[f32] {
        &self.splits
    }

    /// Number of distance segments.
    #[inline]
    #[must_use]
    pub fn segments(&self) -> usize {
        self.splits.len()
    }

    /// Planned finish time (the last split).
    #[inline]
    #[must_use]
    pub fn final_time(&self) -> f32 {
        // Non-empty by construction.
        self.splits[self.splits.len() - 1]
    }
}

//! Snapshot protocol shared by the simulation and its consumers.
//!
//! A snapshot is a complete, owned copy of per-runner state. The local
//! simulation produces them for IPC/replay, and an out-of-process authoritative
//! simulation can feed them back in to drive the core.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Race lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceStatus {
    /// Field is set up, nobody is moving
    #[default]
    NotStarted,
    /// Start countdown is running
    Countdown,
    /// Race clock is running
    Racing,
    /// Every runner has crossed the line
    Finished,
}

/// Compact per-runner state
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    /// Runner id (index in the component store)
    pub id: u32,
    /// Meters travelled along the route
    pub distance: f32,
    /// Lane offset from the inside edge
    pub lane: f32,
    /// Current speed (m/s)
    pub speed: f32,
    /// Animation phase accumulator
    pub animation_phase: f32,
    /// Raw status flag bits
    pub flags: u32,
}

/// Complete race snapshot for IPC transfer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    /// Frame counter of the producing simulation
    pub frame: u64,
    /// Race status
    pub status: RaceStatus,
    /// Race clock (in-race seconds, already time-scaled)
    pub elapsed_time: f32,
    /// Countdown remaining (seconds)
    pub countdown: f32,
    /// Number of runners that crossed the line
    pub finisher_count: u32,
    /// Runners ordered by id
    pub runners: Vec<RunnerSnapshot>,
}

impl RaceSnapshot {
    /// Returns the runner furthest along the route, if any.
    #[must_use]
    pub fn leader(&self) -> Option<&RunnerSnapshot> {
        self.runners
            .iter()
            .max_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

//! # Simulation Sources
//!
//! Where runner state comes from each tick. Chosen once at setup:
//!
//! - [`LocalSimulation`]: movement and collision run in-process.
//! - [`SnapshotSource`]: an authoritative simulation elsewhere (another
//!   process, a replay file, a server) sends [`RaceSnapshot`]s through a
//!   [`SnapshotFeed`]; the newest one overwrites local state.
//!
//! Path mapping runs between the two phases either way, so the render
//! consumer never sees a difference.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};
use trackline_core::{ComponentStore, EntityId, StatusFlags};
use trackline_shared::constants::clamp_lane;
use trackline_shared::RaceSnapshot;

use crate::config::SimConfig;
use crate::systems::{CollisionStats, CollisionSystem, MovementSystem, TickInput};

/// Strategy producing runner state for the orchestrator.
pub trait SimulationSource {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Phase 1: advance distance, speed, animation and status.
    ///
    /// Runners that finished during this call are appended to `finished`.
    fn integrate(
        &mut self,
        store: &mut ComponentStore,
        input: &TickInput,
        finished: &mut Vec<EntityId>,
    );

    /// Phase 3: lateral resolution, after world positions are fresh.
    fn resolve(&mut self, _store: &mut ComponentStore, _input: &TickInput) -> CollisionStats {
        CollisionStats::default()
    }
}

/// In-process simulation: the movement and collision systems.
#[derive(Debug)]
pub struct LocalSimulation {
    movement: MovementSystem,
    collision: CollisionSystem,
}

impl LocalSimulation {
    /// Creates the local source from explicit systems.
    #[must_use]
    pub const fn new(movement: MovementSystem, collision: CollisionSystem) -> Self {
        Self {
            movement,
            collision,
        }
    }

    /// Creates the local source from a config.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            MovementSystem::new(config.movement.clone()),
            CollisionSystem::new(config.collision.clone(), config.store.capacity),
        )
    }

    /// The collision system, with the grid of the last tick.
    #[must_use]
    pub const fn collision(&self) -> &CollisionSystem {
        &self.collision
    }
}

impl SimulationSource for LocalSimulation {
    fn name(&self) -> &'static str {
        "local"
    }

    fn integrate(
        &mut self,
        store: &mut ComponentStore,
        input: &TickInput,
        finished: &mut Vec<EntityId>,
    ) {
        self.movement.update(&mut store.columns_mut(), input, finished);
    }

    fn resolve(&mut self, store: &mut ComponentStore, input: &TickInput) -> CollisionStats {
        self.collision.update(&mut store.columns_mut(), input.delta)
    }
}

/// Producer half of a snapshot channel.
///
/// Cheap to clone; hand it to whatever thread receives the authoritative
/// state.
#[derive(Clone, Debug)]
pub struct SnapshotFeed {
    sender: Sender<RaceSnapshot>,
}

impl SnapshotFeed {
    /// Queues a snapshot (non-blocking).
    ///
    /// Returns `false` if the channel is full or the source is gone. A full
    /// channel only means the consumer is behind; it will catch up to the
    /// newest snapshot it does receive.
    #[inline]
    pub fn push(&self, snapshot: RaceSnapshot) -> bool {
        match self.sender.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Simulation source fed by external snapshots.
///
/// Each tick drains the channel and applies only the newest snapshot.
/// Without a new snapshot the runners hold their last state.
#[derive(Debug)]
pub struct SnapshotSource {
    receiver: Receiver<RaceSnapshot>,
    last_frame: Option<u64>,
}

impl SnapshotSource {
    /// Creates a bounded feed/source pair.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Snapshots in flight before [`SnapshotFeed::push`]
    ///   starts refusing. Must be at least 1.
    #[must_use]
    pub fn channel(capacity: usize) -> (SnapshotFeed, Self) {
        let (sender, receiver) = bounded(capacity.max(1));
        (
            SnapshotFeed { sender },
            Self {
                receiver,
                last_frame: None,
            },
        )
    }

    /// Producer frame of the last applied snapshot.
    #[must_use]
    pub const fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    fn apply(&self, store: &mut ComponentStore, snapshot: &RaceSnapshot, finished: &mut Vec<EntityId>) {
        let active = store.active_count();
        let mut cols = store.columns_mut();

        for runner in &snapshot.runners {
            let idx = runner.id as usize;
            if idx >= active {
                warn!(
                    id = runner.id,
                    active, "snapshot names a runner outside the field, ignored"
                );
                continue;
            }

            let pos = &mut cols.positions[idx];
            pos.distance = runner.distance;
            pos.lane = clamp_lane(runner.lane);

            let speed = runner.speed.max(0.0);
            let vel = &mut cols.velocities[idx];
            vel.current = speed;
            vel.target = speed;

            cols.animations[idx].phase = runner.animation_phase;

            // Identity stays local; status comes from the producer.
            #[allow(clippy::cast_possible_truncation)]
            let mut incoming = StatusFlags::from_bits_truncate(runner.flags as u8);
            let flags = &mut cols.flags[idx];
            incoming.set(StatusFlags::PRIMARY, flags.is_primary());
            if incoming.is_finished() && !flags.is_finished() {
                finished.push(EntityId::new(runner.id));
            }
            *flags = incoming;
        }
    }
}

impl SimulationSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn integrate(
        &mut self,
        store: &mut ComponentStore,
        _input: &TickInput,
        finished: &mut Vec<EntityId>,
    ) {
        let Some(snapshot) = self.receiver.try_iter().last() else {
            return;
        };
        if self.last_frame.is_some_and(|frame| snapshot.frame < frame) {
            debug!(frame = snapshot.frame, "stale snapshot dropped");
            return;
        }
        self.apply(store, &snapshot, finished);
        self.last_frame = Some(snapshot.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackline_core::RaceProfile;
    use trackline_shared::{RaceStatus, RunnerSnapshot};

    fn store(runners: usize) -> ComponentStore {
        let profile = RaceProfile::new(vec![100.0, 200.0]).unwrap();
        let mut store = ComponentStore::new(4, 2, 1);
        for i in 0..runners {
            store.add_entity(&profile, 1.0, i == 0).unwrap();
        }
        store
    }

    fn runner(id: u32, distance: f32, flags: u32) -> RunnerSnapshot {
        RunnerSnapshot {
            id,
            distance,
            lane: 1.4,
            speed: 3.5,
            animation_phase: 7.25,
            flags,
        }
    }

    fn snapshot(frame: u64, runners: Vec<RunnerSnapshot>) -> RaceSnapshot {
        RaceSnapshot {
            frame,
            status: RaceStatus::Racing,
            runners,
            ..RaceSnapshot::default()
        }
    }

    #[test]
    fn test_newest_snapshot_wins() {
        let mut store = store(2);
        let (feed, mut source) = SnapshotSource::channel(4);
        assert!(feed.push(snapshot(1, vec![runner(0, 10.0, 0)])));
        assert!(feed.push(snapshot(2, vec![runner(0, 20.0, 0)])));

        let mut finished = Vec::new();
        source.integrate(&mut store, &TickInput::new(0.1, 100.0, 1.0), &mut finished);

        assert_eq!(source.last_frame(), Some(2));
        let pos = store.positions()[0];
        assert!((pos.distance - 20.0).abs() < f32::EPSILON);
        assert!((pos.lane - 1.4).abs() < f32::EPSILON);
        assert!((store.velocities()[0].current - 3.5).abs() < f32::EPSILON);
        assert!((store.animations()[0].phase - 7.25).abs() < f32::EPSILON);
        // Runner 1 was not in the snapshot.
        assert!((store.positions()[1].distance).abs() < f32::EPSILON);
    }

    #[test]
    fn test_holds_state_without_snapshot() {
        let mut store = store(1);
        let (feed, mut source) = SnapshotSource::channel(2);
        feed.push(snapshot(5, vec![runner(0, 42.0, 0)]));

        let input = TickInput::new(0.1, 100.0, 1.0);
        let mut finished = Vec::new();
        source.integrate(&mut store, &input, &mut finished);
        source.integrate(&mut store, &input, &mut finished);
        assert!((store.positions()[0].distance - 42.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_finish_reported_once_and_primary_kept() {
        let mut store = store(2);
        let (feed, mut source) = SnapshotSource::channel(4);
        let finished_bits = u32::from(StatusFlags::FINISHED.bits());
        let input = TickInput::new(0.1, 100.0, 1.0);
        let mut finished = Vec::new();

        feed.push(snapshot(1, vec![runner(0, 100.0, finished_bits)]));
        source.integrate(&mut store, &input, &mut finished);
        feed.push(snapshot(2, vec![runner(0, 101.0, finished_bits)]));
        source.integrate(&mut store, &input, &mut finished);

        assert_eq!(finished, vec![EntityId::new(0)]);
        let flags = store.flags()[0];
        assert!(flags.is_finished());
        assert!(flags.is_primary());
    }

    #[test]
    fn test_out_of_range_runner_ignored() {
        let mut store = store(1);
        let (feed, mut source) = SnapshotSource::channel(1);
        feed.push(snapshot(1, vec![runner(3, 55.0, 0), runner(0, 5.0, 0)]));

        let mut finished = Vec::new();
        source.integrate(&mut store, &TickInput::new(0.1, 100.0, 1.0), &mut finished);
        assert_eq!(store.active_count(), 1);
        assert!((store.positions()[0].distance - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let mut store = store(1);
        let (feed, mut source) = SnapshotSource::channel(2);
        let input = TickInput::new(0.1, 100.0, 1.0);
        let mut finished = Vec::new();

        feed.push(snapshot(9, vec![runner(0, 90.0, 0)]));
        source.integrate(&mut store, &input, &mut finished);
        feed.push(snapshot(4, vec![runner(0, 40.0, 0)]));
        source.integrate(&mut store, &input, &mut finished);

        assert_eq!(source.last_frame(), Some(9));
        assert!((store.positions()[0].distance - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_local_simulation_runs_both_phases() {
        let mut store = store(2);
        {
            let mut cols = store.columns_mut();
            // Within the minimum separation of each other.
            cols.positions[0].world_x = 1.0;
            cols.positions[1].world_x = 1.3;
        }
        let mut local = LocalSimulation::from_config(&SimConfig::default());
        assert_eq!(local.name(), "local");

        let input = TickInput::new(0.1, 100.0, 1.0);
        let mut finished = Vec::new();
        local.integrate(&mut store, &input, &mut finished);
        assert!(finished.is_empty());
        assert!(store.positions().iter().all(|p| p.distance > 0.0));

        local.resolve(&mut store, &input);
        assert_eq!(local.collision().grid().len(), 2);
    }

    #[test]
    fn test_full_feed_refuses() {
        let (feed, _source) = SnapshotSource::channel(1);
        assert!(feed.push(RaceSnapshot::default()));
        assert!(!feed.push(RaceSnapshot::default()));
    }
}

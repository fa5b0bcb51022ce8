//! # Tick Orchestrator
//!
//! Owns the runner store and drives one tick at a time:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  INTEGRATE   │──>│ PATH MAPPING │──>│   RESOLVE    │──>│   PUBLISH    │
//! │ (source, p1) │   │  (provider)  │   │ (source, p3) │   │ stats + view │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Between ticks the arrays are only reachable through [`RenderView`], which
//! borrows the orchestrator; the borrow checker keeps consumers from reading
//! a half-written frame.

use std::time::Instant;

use tracing::{debug, error, warn};
use trackline_core::{
    Animation, ComponentStore, EntityId, Position, RaceProfile, StatusFlags, Velocity,
};
use trackline_shared::constants::FACING_LOOKAHEAD;
use trackline_shared::{RaceSnapshot, RunnerSnapshot};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::path::PathProvider;
use crate::source::{LocalSimulation, SimulationSource};
use crate::stats::{TickStats, TickStatsAccumulator, TICK_BUDGET};
use crate::systems::TickInput;

/// The per-frame driver.
pub struct Orchestrator {
    store: ComponentStore,
    provider: Option<Box<dyn PathProvider>>,
    source: Box<dyn SimulationSource>,
    frame: u64,
    last_stats: TickStats,
    accumulator: TickStatsAccumulator,
    /// Runners that finished during the last tick. Pre-sized to capacity.
    finished: Vec<EntityId>,
}

impl Orchestrator {
    /// Creates an orchestrator over an existing store.
    ///
    /// No path provider is set; inject one before the first tick.
    #[must_use]
    pub fn new(store: ComponentStore, source: Box<dyn SimulationSource>) -> Self {
        let capacity = store.capacity();
        debug!(capacity, source = source.name(), "orchestrator ready");
        Self {
            store,
            provider: None,
            source,
            frame: 0,
            last_stats: TickStats::default(),
            accumulator: TickStatsAccumulator::new(),
            finished: Vec::with_capacity(capacity),
        }
    }

    /// Creates an empty store and a local simulation from a config.
    ///
    /// The config is not validated here; run [`SimConfig::validate`] first
    /// for user-supplied files.
    ///
    /// # Panics
    ///
    /// Panics if `store.capacity` or `store.segments` is zero, if the
    /// capacity exceeds `u32::MAX`, or if `collision.cell_size` is not
    /// finite and positive.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        let store = ComponentStore::new(
            config.store.capacity,
            config.store.segments,
            config.store.seed,
        );
        Self::new(store, Box::new(LocalSimulation::from_config(config)))
    }

    /// Sets the path provider (builder style).
    #[must_use]
    pub fn with_path_provider(mut self, provider: impl PathProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Replaces the simulation source (builder style).
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn SimulationSource>) -> Self {
        debug!(source = source.name(), "simulation source selected");
        self.source = source;
        self
    }

    /// Sets or replaces the path provider.
    pub fn set_path_provider(&mut self, provider: Box<dyn PathProvider>) {
        self.provider = Some(provider);
    }

    /// True once a path provider is present.
    #[must_use]
    pub fn has_path_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Name of the active simulation source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Adds a runner at the start line.
    ///
    /// # Errors
    ///
    /// [`SimError::Core`] when the store is full or the profile has the wrong
    /// number of splits.
    pub fn add_runner(
        &mut self,
        profile: &RaceProfile,
        starting_lane: f32,
        is_primary: bool,
    ) -> SimResult<EntityId> {
        Ok(self.store.add_entity(profile, starting_lane, is_primary)?)
    }

    /// Puts a runner back at `distance` / `lane` for a new heat.
    pub fn reset_runner(&mut self, id: EntityId, distance: f32, lane: f32) {
        self.store.reset_entity(id, distance, lane);
    }

    /// Marks a runner as out of action (or back in). Movement is unaffected;
    /// the flag is for the consumer.
    pub fn set_incapacitated(&mut self, id: EntityId, incapacitated: bool) {
        self.store
            .set_flag(id, StatusFlags::INCAPACITATED, incapacitated);
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidTickInput`] for a non-finite or non-positive input.
    /// - [`SimError::MissingPathProvider`] if no provider was injected.
    ///
    /// On error nothing is mutated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, input: TickInput) -> SimResult<TickStats> {
        input.validate()?;
        let Some(provider) = self.provider.as_deref() else {
            error!(frame = self.frame, "tick without a path provider");
            return Err(SimError::MissingPathProvider);
        };

        let start = Instant::now();

        self.finished.clear();
        self.source
            .integrate(&mut self.store, &input, &mut self.finished);
        map_to_world(provider, &mut self.store);
        let collisions = self.source.resolve(&mut self.store, &input);

        self.frame += 1;
        let elapsed = start.elapsed();
        let stats = TickStats {
            frame: self.frame,
            runners: self.store.active_count() as u32,
            candidate_pairs: collisions.candidate_pairs,
            overlapping_pairs: collisions.overlapping_pairs,
            newly_finished: self.finished.len() as u32,
            tick_us: elapsed.as_micros() as u64,
        };
        self.accumulator.record(stats);
        self.last_stats = stats;

        if elapsed > TICK_BUDGET {
            warn!(
                frame = self.frame,
                tick_us = stats.tick_us,
                budget_us = TICK_BUDGET.as_micros() as u64,
                "tick exceeded frame budget"
            );
        }

        Ok(stats)
    }

    /// Runs path mapping alone, for runners placed before the first tick.
    ///
    /// # Errors
    ///
    /// [`SimError::MissingPathProvider`] if no provider was injected.
    pub fn refresh_world(&mut self) -> SimResult<()> {
        let Some(provider) = self.provider.as_deref() else {
            error!(frame = self.frame, "path mapping without a path provider");
            return Err(SimError::MissingPathProvider);
        };
        map_to_world(provider, &mut self.store);
        Ok(())
    }

    /// Read-only view of the current frame.
    #[must_use]
    pub fn view(&self) -> RenderView<'_> {
        RenderView {
            frame: self.frame,
            positions: self.store.positions(),
            velocities: self.store.velocities(),
            animations: self.store.animations(),
            flags: self.store.flags(),
        }
    }

    /// Owned copy of the current frame in protocol form.
    ///
    /// Race-level fields (status, clocks) are left at their defaults; the
    /// race session fills them in.
    #[must_use]
    pub fn snapshot(&self) -> RaceSnapshot {
        let view = self.view();
        let runners: Vec<RunnerSnapshot> = view.runners().collect();
        let finisher_count = view.flags.iter().filter(|f| f.is_finished()).count();
        RaceSnapshot {
            frame: self.frame,
            finisher_count: u32::try_from(finisher_count).unwrap_or(u32::MAX),
            runners,
            ..RaceSnapshot::default()
        }
    }

    /// Runners that finished during the last tick, in id order.
    #[must_use]
    pub fn finished_this_tick(&self) -> &[EntityId] {
        &self.finished
    }

    /// Statistics of the last tick.
    #[must_use]
    pub const fn stats(&self) -> TickStats {
        self.last_stats
    }

    /// Accumulated tick statistics.
    #[must_use]
    pub const fn accumulator(&self) -> &TickStatsAccumulator {
        &self.accumulator
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// The runner store.
    #[must_use]
    pub const fn store(&self) -> &ComponentStore {
        &self.store
    }
}

/// Writes world coordinates and facing for every active runner.
fn map_to_world(provider: &dyn PathProvider, store: &mut ComponentStore) {
    let mut cols = store.columns_mut();
    for pos in cols.positions.iter_mut() {
        let here = provider.position(pos.distance, pos.lane);
        let ahead = provider.position(pos.distance + FACING_LOOKAHEAD, pos.lane);

        pos.world_x = here.position.x;
        pos.world_y = here.position.y;
        pos.world_z = here.position.z;
        pos.facing = here
            .position
            .bearing_to(ahead.position)
            .or(here.rotation)
            .unwrap_or(pos.facing);
    }
}

/// Borrowed, read-only arrays of one consistent frame.
///
/// Index `i` in every slice is runner `i`.
#[derive(Clone, Copy, Debug)]
pub struct RenderView<'a> {
    /// Frame these arrays belong to.
    pub frame: u64,
    /// Route position, world position, facing.
    pub positions: &'a [Position],
    /// Current and target speed.
    pub velocities: &'a [Velocity],
    /// Stride phase and multiplier.
    pub animations: &'a [Animation],
    /// Status bits.
    pub flags: &'a [StatusFlags],
}

impl<'a> RenderView<'a> {
    /// Number of runners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the field is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position array as raw bytes, for upload into a GPU instance buffer.
    #[must_use]
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    /// Runner furthest along the route.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn leader(&self) -> Option<EntityId> {
        self.positions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))
            .map(|(i, _)| EntityId::new(i as u32))
    }

    /// Per-runner protocol records.
    #[allow(clippy::cast_possible_truncation)]
    pub fn runners(&self) -> impl Iterator<Item = RunnerSnapshot> + 'a {
        let (positions, velocities, animations, flags) =
            (self.positions, self.velocities, self.animations, self.flags);
        (0..positions.len()).map(move |i| RunnerSnapshot {
            id: i as u32,
            distance: positions[i].distance,
            lane: positions[i].lane,
            speed: velocities[i].current,
            animation_phase: animations[i].phase,
            flags: u32::from(flags[i].bits()),
        })
    }
}

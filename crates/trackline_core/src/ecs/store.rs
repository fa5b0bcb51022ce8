//! # Component Store
//!
//! The central container for all runner state.
//! Pre-allocates all memory at creation time.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use trackline_shared::constants::clamp_lane;

use super::component::{Animation, Position, RaceProfile, StatusFlags, Velocity};
use super::entity::EntityId;
use super::storage::ComponentStorage;
use crate::error::{CoreError, CoreResult};

/// Lowest stride multiplier handed out at creation.
const STRIDE_MIN: f32 = 0.85;
/// Width of the stride multiplier range.
const STRIDE_SPREAD: f32 = 0.3;

/// The runner store - parallel component arrays of one fixed capacity.
///
/// Runners occupy ids `[0, active_count)`. Adding a runner moves the cursor;
/// nothing ever shrinks or reallocates. Between races the same cast is reset
/// in place with [`reset_entity`](Self::reset_entity).
///
/// # Example
///
/// ```rust,ignore
/// let mut store = ComponentStore::new(100, 5, 42);
/// let id = store.add_entity(&profile, 1.0, false)?;
/// store.reset_entity(id, -3.0, 0.95);
/// ```
pub struct ComponentStore {
    /// Number of runners added so far.
    active_count: usize,
    /// Split times held per runner.
    segments: usize,

    // =========================================================================
    // Component Storages
    // =========================================================================
    /// Route and world position.
    positions: ComponentStorage<Position>,
    /// Current and target speed.
    velocities: ComponentStorage<Velocity>,
    /// Stride animation.
    animations: ComponentStorage<Animation>,
    /// Status bitsets.
    flags: ComponentStorage<StatusFlags>,
    /// Flattened split tables, `segments` entries per runner.
    split_times: Box<[f32]>,
    /// Planned finish time per runner.
    final_times: Box<[f32]>,

    /// Source of animation desync. Seeded, so runs replay exactly.
    rng: ChaCha8Rng,
}

impl ComponentStore {
    /// Creates a store for `capacity` runners with `segments` splits each.
    ///
    /// # Panics
    ///
    /// Panics if capacity or segments is zero, or capacity exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize, segments: usize, seed: u64) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(segments > 0, "A race profile needs at least one segment");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        debug!(capacity, segments, seed, "allocating component store");

        Self {
            active_count: 0,
            segments,
            positions: ComponentStorage::new(capacity),
            velocities: ComponentStorage::new(capacity),
            animations: ComponentStorage::new(capacity),
            flags: ComponentStorage::new(capacity),
            split_times: vec![0.0; capacity * segments].into_boxed_slice(),
            final_times: vec![0.0; capacity].into_boxed_slice(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.positions.capacity()
    }

    /// Returns the number of runners added so far.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Returns the number of split times held per runner.
    #[inline]
    #[must_use]
    pub const fn segments(&self) -> usize {
        self.segments
    }

    /// True when no further runner can be added.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.active_count == self.capacity()
    }

    /// Adds a runner at distance zero.
    ///
    /// The starting lane is clamped into the lane bounds. The stride multiplier
    /// and initial animation phase are drawn from the store's seeded RNG.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CapacityExceeded`] once every slot is taken.
    /// - [`CoreError::ProfileLength`] if the profile's split count differs
    ///   from the store's.
    // `new` guarantees capacity fits in u32.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_entity(
        &mut self,
        profile: &RaceProfile,
        starting_lane: f32,
        is_primary: bool,
    ) -> CoreResult<EntityId> {
        if self.is_full() {
            debug!(capacity = self.capacity(), "rejecting runner, store is full");
            return Err(CoreError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        if profile.segments() != self.segments {
            return Err(CoreError::ProfileLength {
                expected: self.segments,
                actual: profile.segments(),
            });
        }

        let idx = self.active_count;
        let seg = self.segments;
        self.split_times[idx * seg..(idx + 1) * seg].copy_from_slice(profile.splits());
        self.final_times[idx] = profile.final_time();

        self.positions
            .set(idx, Position::on_route(0.0, clamp_lane(starting_lane)));
        self.velocities.reset(idx);
        let stride = STRIDE_MIN + self.rng.gen::<f32>() * STRIDE_SPREAD;
        let phase = self.rng.gen::<f32>();
        self.animations.set(idx, Animation { phase, stride });
        let flags = if is_primary {
            StatusFlags::PRIMARY
        } else {
            StatusFlags::empty()
        };
        self.flags.set(idx, flags);

        self.active_count += 1;

        Ok(EntityId::new(idx as u32))
    }

    /// Puts a runner back on the start line for a new heat.
    ///
    /// Clears velocity and status (the `PRIMARY` identity bit is kept),
    /// reseeds the animation phase, keeps the race profile and stride.
    /// `id` must be an active runner.
    pub fn reset_entity(&mut self, id: EntityId, start_distance: f32, start_lane: f32) {
        let idx = id.index();
        debug_assert!(idx < self.active_count, "reset of inactive {id}");

        self.positions
            .set(idx, Position::on_route(start_distance, clamp_lane(start_lane)));
        self.velocities.reset(idx);

        let phase = self.rng.gen::<f32>();
        if let Some(anim) = self.animations.get_mut(idx) {
            anim.phase = phase;
        }
        if let Some(flags) = self.flags.get_mut(idx) {
            let primary = flags.is_primary();
            *flags = StatusFlags::empty();
            flags.set(StatusFlags::PRIMARY, primary);
        }
    }

    /// Sets or clears a status flag on an active runner.
    pub fn set_flag(&mut self, id: EntityId, flag: StatusFlags, on: bool) {
        debug_assert!(id.index() < self.active_count, "flag on inactive {id}");
        if let Some(flags) = self.flags.get_mut(id.index()) {
            flags.set(flag, on);
        }
    }

    /// Iterates over the ids of all active runners.
    #[allow(clippy::cast_possible_truncation)]
    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.active_count).map(|i| EntityId::new(i as u32))
    }

    /// Positions of active runners.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions.as_slice()[..self.active_count]
    }

    /// Velocities of active runners.
    #[inline]
    #[must_use]
    pub fn velocities(&self) -> &[Velocity] {
        &self.velocities.as_slice()[..self.active_count]
    }

    /// Animation state of active runners.
    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations.as_slice()[..self.active_count]
    }

    /// Status flags of active runners.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &[StatusFlags] {
        &self.flags.as_slice()[..self.active_count]
    }

    /// Split table of an active runner.
    #[inline]
    #[must_use]
    pub fn profile(&self, id: EntityId) -> &[f32] {
        self.profiles().splits(id.index())
    }

    /// Planned finish time of an active runner.
    #[inline]
    #[must_use]
    pub fn final_time(&self, id: EntityId) -> f32 {
        self.final_times[id.index()]
    }

    /// Read access to the split tables.
    #[inline]
    #[must_use]
    pub fn profiles(&self) -> ProfileTable<'_> {
        ProfileTable {
            splits: &self.split_times[..self.active_count * self.segments],
            final_times: &self.final_times[..self.active_count],
            segments: self.segments,
        }
    }

    /// Splits the store into disjoint mutable columns over the active range.
    ///
    /// Systems take this instead of `&mut ComponentStore` so they can write
    /// several components of the same runner at once.
    #[inline]
    pub fn columns_mut(&mut self) -> ColumnsMut<'_> {
        let n = self.active_count;
        ColumnsMut {
            positions: &mut self.positions.as_mut_slice()[..n],
            velocities: &mut self.velocities.as_mut_slice()[..n],
            animations: &mut self.animations.as_mut_slice()[..n],
            flags: &mut self.flags.as_mut_slice()[..n],
            profiles: ProfileTable {
                splits: &self.split_times[..n * self.segments],
                final_times: &self.final_times[..n],
                segments: self.segments,
            },
        }
    }
}

/// Read-only view of the flattened split tables.
#[derive(Clone, Copy, Debug)]
pub struct ProfileTable<'a> {
    splits: &'a [f32],
    final_times: &'a [f32],
    segments: usize,
}

impl<'a> ProfileTable<'a> {
    /// Splits per runner.
    #[inline]
    #[must_use]
    pub const fn segments(&self) -> usize {
        self.segments
    }

    /// Split table of runner `index`.
    #[inline]
    #[must_use]
    pub fn splits(&self, index: usize) -> &'a [f32] {
        &self.splits[index * self.segments..(index + 1) * self.segments]
    }

    /// Planned finish time of runner `index`.
    #[inline]
    #[must_use]
    pub fn final_time(&self, index: usize) -> f32 {
        self.final_times[index]
    }
}

/// Disjoint mutable columns of every active runner.
pub struct ColumnsMut<'a> {
    /// Route and world position.
    pub positions: &'a mut [Position],
    /// Current and target speed.
    pub velocities: &'a mut [Velocity],
    /// Stride animation.
    pub animations: &'a mut [Animation],
    /// Status bitsets.
    pub flags: &'a mut [StatusFlags],
    /// Split tables (read-only).
    pub profiles: ProfileTable<'a>,
}

impl ColumnsMut<'_> {
    /// Number of runners in the columns.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no runner has been added.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

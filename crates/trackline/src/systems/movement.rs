//! # Movement System
//!
//! Advances every runner along the route from its pacing plan:
//!
//! 1. flag runners that reached the race distance
//! 2. pick the target speed (segment pace, or cooldown once finished)
//! 3. move the current speed toward it, limited by the acceleration rate
//! 4. integrate distance
//! 5. advance the stride animation

use trackline_core::{ColumnsMut, EntityId, StatusFlags};

use super::TickInput;
use crate::config::MovementConfig;

/// Pace of the segment containing `distance`.
///
/// Segment `k = floor(distance / segment_length)`, clamped to the split table.
/// Negative distances (behind the start line) use the first segment.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn segment_pace(splits: &[f32], segment_length: f32, distance: f32, time_scale: f32) -> f32 {
    let last = splits.len() - 1;
    let k = ((distance.max(0.0) / segment_length) as usize).min(last);
    let start = if k == 0 { 0.0 } else { splits[k - 1] };
    segment_length / (splits[k] - start) / time_scale
}

/// Moves `current` toward `target` by at most `max_step`, never past it.
#[inline]
#[must_use]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    current + (target - current).clamp(-max_step, max_step)
}

/// The movement pass.
#[derive(Clone, Debug)]
pub struct MovementSystem {
    config: MovementConfig,
}

impl MovementSystem {
    /// Creates the system with the given tuning.
    #[must_use]
    pub const fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Returns the tuning in use.
    #[must_use]
    pub const fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Runs one movement step over every active runner.
    ///
    /// Runners that crossed the race distance since the previous call get
    /// [`StatusFlags::FINISHED`] and are appended to `finished` in id order.
    /// Returns how many finished during this call.
    #[allow(clippy::cast_possible_truncation)]
    pub fn update(
        &self,
        cols: &mut ColumnsMut<'_>,
        input: &TickInput,
        finished: &mut Vec<EntityId>,
    ) -> usize {
        let cfg = &self.config;
        let profiles = cols.profiles;
        let max_step = cfg.acceleration_rate * input.delta;
        let mut newly_finished = 0;

        for i in 0..cols.len() {
            let splits = profiles.splits(i);
            let pos = &mut cols.positions[i];
            let vel = &mut cols.velocities[i];
            let flags = &mut cols.flags[i];

            if !flags.is_finished() && pos.distance >= input.race_distance {
                flags.insert(StatusFlags::FINISHED);
                finished.push(EntityId::new(i as u32));
                newly_finished += 1;
            }

            vel.target = if flags.is_finished() {
                cfg.cooldown_factor
                    * segment_pace(
                        splits,
                        cfg.segment_length,
                        input.race_distance - 1.0,
                        input.time_scale,
                    )
            } else {
                segment_pace(splits, cfg.segment_length, pos.distance, input.time_scale)
            };

            vel.current = approach(vel.current, vel.target, max_step);
            pos.distance += vel.current * input.delta;

            let anim = &mut cols.animations[i];
            let rate = (vel.current / cfg.base_animation_speed).max(cfg.min_animation_scale);
            anim.phase += input.delta * rate * anim.stride;
        }

        newly_finished
    }
}

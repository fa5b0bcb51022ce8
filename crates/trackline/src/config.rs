//! # Simulation Configuration
//!
//! Tuning values loaded once at startup from TOML. Every section and field is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [store]
//! capacity = 128
//! segments = 5
//! seed = 0x5EED
//!
//! [collision]
//! collision_radius = 0.4
//! drift_speed = 0.15
//!
//! [race]
//! distance = 5000.0
//! runner_count = 100
//! fixed_step = 0.016666668
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use trackline_shared::constants::BASE_ANIMATION_SPEED;

/// Errors raised while loading or validating a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`SimConfig`].
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Component store sizing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Maximum runners, fixed for the lifetime of the store.
    pub capacity: usize,
    /// Split times per runner.
    pub segments: usize,
    /// Seed for stride and phase sampling.
    pub seed: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            segments: 5,
            seed: 0x5EED,
        }
    }
}

/// Pacing and animation tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementConfig {
    /// Route length covered by one split (meters).
    pub segment_length: f32,
    /// Max speed change per second (m/s²).
    pub acceleration_rate: f32,
    /// Speed at which the stride animation runs at 1x.
    pub base_animation_speed: f32,
    /// Cooldown speed as a fraction of the finishing pace.
    pub cooldown_factor: f32,
    /// Floor of the animation rate multiplier, so standing runners still breathe.
    pub min_animation_scale: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            segment_length: 1000.0,
            acceleration_rate: 2.0,
            base_animation_speed: BASE_ANIMATION_SPEED,
            cooldown_factor: 0.5,
            min_animation_scale: 0.3,
        }
    }
}

/// Lateral collision tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionConfig {
    /// Body radius; two runners overlap below twice this distance.
    pub collision_radius: f32,
    /// Lateral push per meter of overlap per second.
    pub push_strength: f32,
    /// Inward drift rate, proportional to the lane position.
    pub drift_speed: f32,
    /// Pairs further apart along the route skip the distance check.
    pub distance_gate: f32,
    /// Pairs further apart laterally skip the distance check.
    pub lane_gate: f32,
    /// Spatial grid cell edge. Must be at least the minimum separation.
    pub cell_size: f32,
    /// Pairs closer than this are treated as coincident and left alone.
    pub epsilon: f32,
}

impl CollisionConfig {
    /// Minimum center distance between two runners.
    #[inline]
    #[must_use]
    pub fn min_separation(&self) -> f32 {
        2.0 * self.collision_radius
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            collision_radius: 0.4,
            push_strength: 2.0,
            drift_speed: 0.15,
            distance_gate: 1.0,
            lane_gate: 1.0,
            cell_size: 1.0,
            epsilon: 1e-4,
        }
    }
}

/// Race setup and pacing of the session clock.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaceConfig {
    /// Race distance (meters).
    pub distance: f32,
    /// Runners in the field.
    pub runner_count: usize,
    /// Race-clock seconds per wall-clock second.
    pub time_scale: f32,
    /// Gap between formation rows (meters).
    pub formation_spread: f32,
    /// Countdown before the start (seconds).
    pub countdown: f32,
    /// Fixed simulation step. `None` ticks once per frame with the frame delta.
    pub fixed_step: Option<f32>,
    /// Frame deltas are clamped to this before use.
    pub max_frame_delta: f32,
    /// Capacity of the race event channel.
    pub event_capacity: usize,
    /// Index in the generated field of the host-controlled runner, if any.
    pub primary_runner: Option<usize>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            distance: 5000.0,
            runner_count: 100,
            time_scale: 10.0,
            formation_spread: 3.0,
            countdown: 3.0,
            fixed_step: None,
            max_frame_delta: 0.1,
            event_capacity: 1024,
            primary_runner: None,
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Store sizing.
    pub store: StoreConfig,
    /// Pacing and animation.
    pub movement: MovementConfig,
    /// Lateral collision.
    pub collision: CollisionConfig,
    /// Race setup.
    pub race: RaceConfig,
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = &self.store;
        if store.capacity == 0 || u32::try_from(store.capacity).is_err() {
            return invalid(format!("store.capacity {} out of range", store.capacity));
        }
        if store.segments == 0 {
            return invalid("store.segments must be at least 1".to_owned());
        }

        let movement = &self.movement;
        positive("movement.segment_length", movement.segment_length)?;
        positive("movement.acceleration_rate", movement.acceleration_rate)?;
        positive("movement.base_animation_speed", movement.base_animation_speed)?;
        positive("movement.cooldown_factor", movement.cooldown_factor)?;
        non_negative("movement.min_animation_scale", movement.min_animation_scale)?;

        let collision = &self.collision;
        positive("collision.collision_radius", collision.collision_radius)?;
        non_negative("collision.push_strength", collision.push_strength)?;
        non_negative("collision.drift_speed", collision.drift_speed)?;
        non_negative("collision.distance_gate", collision.distance_gate)?;
        non_negative("collision.lane_gate", collision.lane_gate)?;
        positive("collision.cell_size", collision.cell_size)?;
        positive("collision.epsilon", collision.epsilon)?;
        if collision.cell_size < collision.min_separation() {
            return invalid(format!(
                "collision.cell_size {} is smaller than the minimum separation {}",
                collision.cell_size,
                collision.min_separation()
            ));
        }

        let race = &self.race;
        positive("race.distance", race.distance)?;
        positive("race.time_scale", race.time_scale)?;
        non_negative("race.formation_spread", race.formation_spread)?;
        non_negative("race.countdown", race.countdown)?;
        positive("race.max_frame_delta", race.max_frame_delta)?;
        if let Some(step) = race.fixed_step {
            positive("race.fixed_step", step)?;
        }
        if race.runner_count > store.capacity {
            return invalid(format!(
                "race.runner_count {} exceeds store.capacity {}",
                race.runner_count, store.capacity
            ));
        }
        if race.primary_runner.is_some_and(|i| i >= race.runner_count) {
            return invalid(format!(
                "race.primary_runner must be below race.runner_count {}",
                race.runner_count
            ));
        }
        if race.event_capacity == 0 {
            return invalid("race.event_capacity must be at least 1".to_owned());
        }
        #[allow(clippy::cast_precision_loss)]
        let route = movement.segment_length * store.segments as f32;
        if (route - race.distance).abs() > race.distance * 1e-4 {
            return invalid(format!(
                "movement.segment_length {} x store.segments {} covers {route} m, \
                 race.distance is {}",
                movement.segment_length, store.segments, race.distance
            ));
        }

        Ok(())
    }
}

fn invalid(message: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message))
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be finite and positive, got {value}"))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be finite and non-negative, got {value}"))
    }
}

//! # TRACKLINE
//!
//! Per-frame race simulation for a field of runners on a route.
//!
//! ## Tick Pipeline
//!
//! ```text
//! tick(delta)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. INTEGRATE    simulation source (local: movement system)          │
//! │    └─ pace lookup, speed smoothing, distance, stride animation      │
//! │                                                                     │
//! │ 2. PATH MAPPING path provider: (distance, lane) -> world xyz, facing│
//! │                                                                     │
//! │ 3. RESOLVE      simulation source (local: collision system)         │
//! │    ├─ rebuild spatial hash grid                                     │
//! │    ├─ push overlapping trailing runners sideways                    │
//! │    └─ inward drift                                                  │
//! │                                                                     │
//! │ 4. PUBLISH      stats recorded, arrays readable via `view()`        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use trackline::{Orchestrator, SimConfig, StraightPath, TickInput};
//!
//! let config = SimConfig::default();
//! let mut sim = Orchestrator::from_config(&config)
//!     .with_path_provider(StraightPath::new(1.2));
//! sim.add_runner(&profile, 1.0, true)?;
//! let stats = sim.tick(TickInput::new(1.0 / 60.0, 5000.0, 10.0))?;
//! let view = sim.view();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod path;
pub mod race;
pub mod source;
pub mod stats;
pub mod systems;
pub mod timestep;

pub use config::{CollisionConfig, ConfigError, MovementConfig, RaceConfig, SimConfig, StoreConfig};
pub use error::{SimError, SimResult};
pub use events::{EventBus, EventReceiver, RaceEvent};
pub use orchestrator::{Orchestrator, RenderView};
pub use path::{PathProvider, PathSample, StraightPath};
pub use race::{GameState, RaceResult, RaceSession};
pub use source::{LocalSimulation, SimulationSource, SnapshotFeed, SnapshotSource};
pub use stats::{TickStats, TickStatsAccumulator};
pub use systems::{CollisionStats, CollisionSystem, MovementSystem, TickInput};
pub use timestep::FixedStep;

pub use trackline_core::{EntityId, RaceProfile, StatusFlags};

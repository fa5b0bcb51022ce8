//! # Simulation Error Types
//!
//! All errors the orchestrator and race session report.

use thiserror::Error;
use trackline_core::CoreError;

use crate::config::ConfigError;

/// Errors that can occur while setting up or ticking a race.
#[derive(Error, Debug)]
pub enum SimError {
    /// `tick` was called before a path provider was injected.
    #[error("no path provider configured")]
    MissingPathProvider,

    /// Tick input violates its preconditions.
    #[error("invalid tick input: {0}")]
    InvalidTickInput(&'static str),

    /// Store or profile error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Rejected configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

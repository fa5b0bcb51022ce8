//! # Core Error Types
//!
//! Everything the store can report back to its caller.

use thiserror::Error;

/// Errors reported by the component store and profile ingestion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Every pre-allocated slot is taken. Retrying with the same store fails again.
    #[error("component store full: capacity {capacity}")]
    CapacityExceeded {
        /// Fixed capacity of the store.
        capacity: usize,
    },

    /// The profile has a different number of split times than the store holds per runner.
    #[error("race profile has {actual} splits, store expects {expected}")]
    ProfileLength {
        /// Splits per runner the store was created with.
        expected: usize,
        /// Splits in the rejected profile.
        actual: usize,
    },

    /// The split table cannot produce a finite pace.
    #[error("invalid race profile: {0}")]
    InvalidProfile(&'static str),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

//! Unified error type for Arenakit.

use arenakit_arena::ArenaError;
use arenakit_tick::SchedulerError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ArenakitError {
    /// A scheduling error (negative delay or interval).
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// An arena-level error (full, not found, invalid state).
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

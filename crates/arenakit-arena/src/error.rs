//! Error types for the arena layer.

use arenakit_tick::SchedulerError;
use arenakit_types::{ArenaId, PlayerId};

/// Errors that can occur during arena operations.
///
/// Races between movement and deferred checks are not errors; the region
/// monitor reports them as outcomes. These variants are what an arena's own
/// `join`/`remove`/`start` contract rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// The arena does not exist.
    #[error("arena {0} not found")]
    NotFound(ArenaId),

    /// No free player slot.
    #[error("arena {0} is full")]
    ArenaFull(ArenaId),

    #[error("player {0} already in arena {1}")]
    AlreadyInArena(PlayerId, ArenaId),

    #[error("player {0} not in arena {1}")]
    NotInArena(PlayerId, ArenaId),

    /// The player is not connected to the arena's world.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The arena is in a state that doesn't allow this operation, such as
    /// starting an arena that is already running.
    #[error("invalid arena state for this operation: {0}")]
    InvalidState(String),

    /// No spawnpoint matches the player's context and team.
    #[error("arena {0} has no usable spawnpoint")]
    NoSpawnpoint(ArenaId),

    /// The arena's command channel is full or closed.
    #[error("arena {0} is unavailable")]
    Unavailable(ArenaId),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

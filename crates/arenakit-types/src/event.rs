//! Transient notifications.
//!
//! None of these are persisted. A [`BoundaryEvent`] is consumed by the
//! region monitor in the same call that produced it; an [`ArenaEvent`] is
//! broadcast to whoever observes the arena and then dropped.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    AddPlayerReason, ArenaId, ArenaRelation, ArenaTeam, OutOfBoundsPolicy,
    PlayerId, RemovePlayerReason,
};

/// Which way a player crossed the region surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryDirection {
    Enter,
    Leave,
}

/// One observed crossing of an arena's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryEvent {
    pub player: PlayerId,
    pub direction: BoundaryDirection,
    pub arena: ArenaId,
    /// When the crossing was observed.
    pub at: Instant,
}

impl BoundaryEvent {
    pub fn new(player: PlayerId, direction: BoundaryDirection, arena: ArenaId) -> Self {
        Self {
            player,
            direction,
            arena,
            at: Instant::now(),
        }
    }
}

/// Something that happened in an arena, broadcast after the state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaEvent {
    /// A new session began.
    Started { arena: ArenaId, players: usize },
    /// The running session ended.
    Ended {
        arena: ArenaId,
        winner: Option<PlayerId>,
    },
    PlayerJoined {
        arena: ArenaId,
        player: PlayerId,
        relation: ArenaRelation,
        team: ArenaTeam,
        reason: AddPlayerReason,
    },
    PlayerRemoved {
        arena: ArenaId,
        player: PlayerId,
        reason: RemovePlayerReason,
    },
    WinnerDeclared { arena: ArenaId, player: PlayerId },
    /// A non-member walked into the running arena's region.
    EnteredRegion { arena: ArenaId, player: PlayerId },
    /// A member walked out of the running arena's region.
    LeftRegion {
        arena: ArenaId,
        player: PlayerId,
        policy: OutOfBoundsPolicy,
    },
    /// Seconds left on the match clock.
    ClockTick { arena: ArenaId, remaining_secs: u64 },
}

impl ArenaEvent {
    /// The arena this event belongs to.
    pub fn arena(&self) -> ArenaId {
        match self {
            Self::Started { arena, .. }
            | Self::Ended { arena, .. }
            | Self::PlayerJoined { arena, .. }
            | Self::PlayerRemoved { arena, .. }
            | Self::WinnerDeclared { arena, .. }
            | Self::EnteredRegion { arena, .. }
            | Self::LeftRegion { arena, .. }
            | Self::ClockTick { arena, .. } => *arena,
        }
    }
}

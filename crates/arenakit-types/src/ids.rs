//! Identity newtypes.
//!
//! Both ids wrap a `u64`. The wrapper exists so a function like
//! `fn remove(player: PlayerId)` can never be handed an `ArenaId` by
//! mistake, even though both are plain integers underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a player connected to the host server.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for one configured arena.
///
/// The id names the arena definition, not a single run of it. Two
/// consecutive matches on the same arena share an `ArenaId` but get
/// different session tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

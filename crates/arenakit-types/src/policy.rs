//! Policy enums and player/arena relations.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Region policies
// ---------------------------------------------------------------------------

/// What to do when a non-participant walks into a running arena's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsiderPolicy {
    /// Leave them alone.
    #[default]
    None,
    /// Add them to the arena.
    Join,
    /// Teleport them to the arena's removal point.
    Kick,
}

/// What to do when an active-game participant walks out of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfBoundsPolicy {
    #[default]
    None,
    /// Remove the player from the arena.
    Kick,
    /// Leaving the bounds wins the game (race/escape arenas).
    Win,
    /// Leaving the bounds loses the game.
    Lose,
    /// Put the player back at a game spawnpoint.
    Respawn,
}

impl fmt::Display for OutsiderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Join => "join",
            Self::Kick => "kick",
        };
        f.write_str(s)
    }
}

impl fmt::Display for OutOfBoundsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Kick => "kick",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Respawn => "respawn",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

/// A player's context within the arena they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaRelation {
    /// Waiting for the next match.
    Lobby,
    /// Playing the running match.
    Game,
    /// Watching the running match.
    Spectator,
}

impl fmt::Display for ArenaRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lobby => "lobby",
            Self::Game => "game",
            Self::Spectator => "spectator",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// Why a player is being added to an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddPlayerReason {
    /// The player asked to join (command, sign, or walking in under
    /// [`OutsiderPolicy::Join`]).
    PlayerJoin,
    /// Another arena handed the player over.
    Forwarding,
}

/// Why a player is being removed from an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovePlayerReason {
    /// The player asked to leave.
    PlayerLeave,
    /// Removed for leaving the bounds under [`OutOfBoundsPolicy::Kick`].
    Kick,
    /// Lost the match.
    Lose,
    /// Disconnected from the server.
    Logout,
    /// The match ended and everyone was released.
    ArenaEnded,
    /// Another arena took the player over.
    Forwarding,
}

impl RemovePlayerReason {
    /// Message shown to the removed player.
    pub fn message(self) -> &'static str {
        match self {
            Self::PlayerLeave => "You left the arena.",
            Self::Kick => "Kicked for leaving the arena bounds.",
            Self::Lose => "You lost.",
            Self::Logout => "Disconnected.",
            Self::ArenaEnded => "The match has ended.",
            Self::Forwarding => "Forwarded to another arena.",
        }
    }
}

impl fmt::Display for RemovePlayerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PlayerLeave => "player_leave",
            Self::Kick => "kick",
            Self::Lose => "lose",
            Self::Logout => "logout",
            Self::ArenaEnded => "arena_ended",
            Self::Forwarding => "forwarding",
        };
        f.write_str(s)
    }
}

//! Named spawnpoints.

use serde::{Deserialize, Serialize};

use crate::{ArenaRelation, ArenaTeam, Position};

/// Which context a spawnpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Lobby,
    Game,
    Spectator,
}

impl From<ArenaRelation> for SpawnKind {
    fn from(relation: ArenaRelation) -> Self {
        match relation {
            ArenaRelation::Lobby => Self::Lobby,
            ArenaRelation::Game => Self::Game,
            ArenaRelation::Spectator => Self::Spectator,
        }
    }
}

/// A named location players are placed at.
///
/// A spawnpoint with team [`ArenaTeam::None`] is usable by anyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawnpoint {
    pub name: String,
    pub kind: SpawnKind,
    #[serde(default)]
    pub team: ArenaTeam,
    pub position: Position,
}

impl Spawnpoint {
    pub fn new(name: impl Into<String>, kind: SpawnKind, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            team: ArenaTeam::None,
            position,
        }
    }

    /// Restricts the spawnpoint to one team.
    pub fn with_team(mut self, team: ArenaTeam) -> Self {
        self.team = team;
        self
    }

    /// Lowercased name, used for case-insensitive lookups.
    pub fn search_name(&self) -> String {
        self.name.to_lowercase()
    }
}

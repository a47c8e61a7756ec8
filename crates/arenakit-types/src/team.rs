//! The fixed palette of team identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A team a player can be assigned to.
///
/// `None` marks "no team" (free-for-all arenas, team-less spawnpoints).
/// Every other variant carries a color id in `0..=15` that hosts use to
/// pick a team block or banner color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaTeam {
    #[default]
    None,
    Gold,
    Sky,
    Yellow,
    Emerald,
    Pink,
    Dark,
    Gray,
    Aqua,
    Purple,
    Blue,
    Green,
    Red,
    Black,
}

impl ArenaTeam {
    /// Every real team, in palette order. Excludes [`ArenaTeam::None`].
    pub const ALL: [ArenaTeam; 13] = [
        Self::Gold,
        Self::Sky,
        Self::Yellow,
        Self::Emerald,
        Self::Pink,
        Self::Dark,
        Self::Gray,
        Self::Aqua,
        Self::Purple,
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Black,
    ];

    /// Color id of the team, or `None` for the team-less marker.
    pub fn color_id(self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::Gold => Some(1),
            Self::Sky => Some(3),
            Self::Yellow => Some(4),
            Self::Emerald => Some(5),
            Self::Pink => Some(6),
            Self::Dark => Some(7),
            Self::Gray => Some(8),
            Self::Aqua => Some(9),
            Self::Purple => Some(10),
            Self::Blue => Some(11),
            Self::Green => Some(13),
            Self::Red => Some(14),
            Self::Black => Some(15),
        }
    }

    /// Human-readable team name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Gold => "Gold Team",
            // Light and dark blue both read as "Blue Team"; same for greens.
            Self::Sky | Self::Blue => "Blue Team",
            Self::Yellow => "Yellow Team",
            Self::Emerald | Self::Green => "Green Team",
            Self::Pink => "Pink Team",
            Self::Dark => "Dark Team",
            Self::Gray => "Gray Team",
            Self::Aqua => "Aqua Team",
            Self::Purple => "Purple Team",
            Self::Red => "Red Team",
            Self::Black => "Black Team",
        }
    }

    /// Returns `true` for any variant except [`ArenaTeam::None`].
    pub fn is_team(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for ArenaTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

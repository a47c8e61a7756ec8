//! Arena configuration.

use arenakit_tick::{TickConfig, Ticks};
use arenakit_types::{
    ArenaTeam, OutOfBoundsPolicy, OutsiderPolicy, Position, Region, Spawnpoint,
};
use serde::{Deserialize, Serialize};

/// Configuration for one arena.
///
/// Values usually come from persisted storage. Every field has a default,
/// so a partial document deserializes fine:
///
/// ```
/// let settings: arenakit_arena::ArenaSettings =
///     serde_json::from_str(r#"{ "name": "pit", "out_of_bounds_policy": "lose" }"#).unwrap();
/// assert_eq!(settings.min_players, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub name: String,

    /// Lobby players needed before the arena can start.
    pub min_players: usize,

    /// Lobby plus game players allowed. Spectators don't count.
    pub max_players: usize,

    /// Applied when a non-member walks into the running arena's region.
    pub outsider_policy: OutsiderPolicy,

    /// Applied when a game player walks out of the running arena's region.
    pub out_of_bounds_policy: OutOfBoundsPolicy,

    /// Where kicked outsiders are sent.
    pub remove_location: Position,

    pub region: Region,

    /// Teams handed out on join. Empty means no teams.
    pub teams: Vec<ArenaTeam>,

    pub spawnpoints: Vec<Spawnpoint>,

    /// Players joining a running arena become spectators when late join is
    /// off.
    pub allow_spectators: bool,

    /// Players joining a running arena go straight into the game.
    pub allow_late_join: bool,

    /// Ticks to wait before re-checking a player who walked in. Gives a
    /// player who is on their way out time to be removed first.
    pub recheck_delay_ticks: u64,

    pub tick_rate_hz: u32,

    /// Optional match clock. The arena ends itself when it runs out.
    pub time_limit_secs: Option<u64>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            name: "arena".to_string(),
            min_players: 2,
            max_players: 16,
            outsider_policy: OutsiderPolicy::None,
            out_of_bounds_policy: OutOfBoundsPolicy::None,
            remove_location: Position::ORIGIN,
            region: Region::default(),
            teams: Vec::new(),
            spawnpoints: Vec::new(),
            allow_spectators: true,
            allow_late_join: false,
            recheck_delay_ticks: 5,
            tick_rate_hz: TickConfig::DEFAULT_RATE_HZ,
            time_limit_secs: None,
        }
    }
}

impl ArenaSettings {
    /// Fixes values that would make the arena unusable.
    ///
    /// - `min_players` is at least 1.
    /// - `max_players` is at least `min_players`.
    /// - [`ArenaTeam::None`] entries are dropped from `teams`.
    /// - `region` corners are normalized.
    pub fn validated(mut self) -> Self {
        if self.min_players == 0 {
            tracing::warn!(arena = %self.name, "min_players is 0, using 1");
            self.min_players = 1;
        }
        if self.max_players < self.min_players {
            tracing::warn!(
                arena = %self.name,
                min = self.min_players,
                max = self.max_players,
                "max_players below min_players, raising"
            );
            self.max_players = self.min_players;
        }
        self.teams.retain(|team| team.is_team());
        self.region = Region::new(self.region.min(), self.region.max());
        self
    }

    /// The re-check delay as a scheduler tick count.
    pub fn recheck_delay(&self) -> Ticks {
        Ticks::try_from(self.recheck_delay_ticks).unwrap_or(Ticks::MAX)
    }

    pub fn tick_config(&self) -> TickConfig {
        TickConfig::with_rate(self.tick_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ArenaSettings::default();
        assert_eq!(s.min_players, 2);
        assert_eq!(s.max_players, 16);
        assert_eq!(s.recheck_delay_ticks, 5);
        assert_eq!(s.tick_rate_hz, 20);
        assert_eq!(s.outsider_policy, OutsiderPolicy::None);
        assert!(s.teams.is_empty());
    }

    #[test]
    fn test_validated_fixes_player_limits() {
        let s = ArenaSettings {
            min_players: 0,
            max_players: 0,
            ..ArenaSettings::default()
        }
        .validated();
        assert_eq!(s.min_players, 1);
        assert_eq!(s.max_players, 1);
    }

    #[test]
    fn test_validated_drops_none_team() {
        let s = ArenaSettings {
            teams: vec![ArenaTeam::Red, ArenaTeam::None, ArenaTeam::Blue],
            ..ArenaSettings::default()
        }
        .validated();
        assert_eq!(s.teams, vec![ArenaTeam::Red, ArenaTeam::Blue]);
    }

    #[test]
    fn test_partial_json() {
        let s: ArenaSettings = serde_json::from_str(
            r#"{ "outsider_policy": "join", "teams": ["red", "gold"], "time_limit_secs": 90 }"#,
        )
        .unwrap();
        assert_eq!(s.outsider_policy, OutsiderPolicy::Join);
        assert_eq!(s.teams, vec![ArenaTeam::Red, ArenaTeam::Gold]);
        assert_eq!(s.time_limit_secs, Some(90));
        assert_eq!(s.max_players, 16);
    }
}

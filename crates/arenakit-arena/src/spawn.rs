//! Spawnpoint selection.

use arenakit_types::{ArenaTeam, SpawnKind, Spawnpoint};
use rand::seq::IndexedRandom;

pub fn filter_by_kind(kind: SpawnKind, spawns: &[Spawnpoint]) -> Vec<&Spawnpoint> {
    spawns.iter().filter(|s| s.kind == kind).collect()
}

pub fn filter_by_team(team: ArenaTeam, spawns: &[Spawnpoint]) -> Vec<&Spawnpoint> {
    spawns.iter().filter(|s| s.team == team).collect()
}

/// Spawns of `kind` that belong to `team`.
pub fn filter(kind: SpawnKind, team: ArenaTeam, spawns: &[Spawnpoint]) -> Vec<&Spawnpoint> {
    spawns
        .iter()
        .filter(|s| s.kind == kind && s.team == team)
        .collect()
}

/// Spawns a player of `team` may use in `kind`: the team's own first, the
/// team-less ones if it has none.
pub fn candidates(kind: SpawnKind, team: ArenaTeam, spawns: &[Spawnpoint]) -> Vec<&Spawnpoint> {
    let own = filter(kind, team, spawns);
    if own.is_empty() && team.is_team() {
        filter(kind, ArenaTeam::None, spawns)
    } else {
        own
    }
}

pub fn random<'a>(spawns: &[&'a Spawnpoint]) -> Option<&'a Spawnpoint> {
    spawns.choose(&mut rand::rng()).copied()
}

pub fn find_by_name<'a>(name: &str, spawns: &'a [Spawnpoint]) -> Option<&'a Spawnpoint> {
    let name = name.to_lowercase();
    spawns.iter().find(|s| s.search_name() == name)
}

#[cfg(test)]
mod tests {
    use arenakit_types::Position;

    use super::*;

    fn spawns() -> Vec<Spawnpoint> {
        vec![
            Spawnpoint::new("lobby", SpawnKind::Lobby, Position::new(0.0, 64.0, 0.0)),
            Spawnpoint::new("red1", SpawnKind::Game, Position::new(10.0, 64.0, 0.0))
                .with_team(ArenaTeam::Red),
            Spawnpoint::new("red2", SpawnKind::Game, Position::new(12.0, 64.0, 0.0))
                .with_team(ArenaTeam::Red),
            Spawnpoint::new("any", SpawnKind::Game, Position::new(0.0, 64.0, 10.0)),
        ]
    }

    #[test]
    fn test_filter_by_kind() {
        let all = spawns();
        assert_eq!(filter_by_kind(SpawnKind::Game, &all).len(), 3);
        assert_eq!(filter_by_kind(SpawnKind::Spectator, &all).len(), 0);
    }

    #[test]
    fn test_filter_by_team() {
        let all = spawns();
        assert_eq!(filter_by_team(ArenaTeam::Red, &all).len(), 2);
        assert_eq!(filter_by_team(ArenaTeam::None, &all).len(), 2);
    }

    #[test]
    fn test_candidates_fall_back_to_teamless() {
        let all = spawns();
        let red = candidates(SpawnKind::Game, ArenaTeam::Red, &all);
        assert!(red.iter().all(|s| s.team == ArenaTeam::Red));

        let blue = candidates(SpawnKind::Game, ArenaTeam::Blue, &all);
        assert_eq!(blue.len(), 1);
        assert_eq!(blue[0].name, "any");
    }

    #[test]
    fn test_random_picks_a_candidate() {
        let all = spawns();
        let red = candidates(SpawnKind::Game, ArenaTeam::Red, &all);
        for _ in 0..20 {
            let pick = random(&red).unwrap();
            assert!(pick.name.starts_with("red"));
        }
        assert!(random(&[]).is_none());
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let all = spawns();
        assert_eq!(find_by_name("RED2", &all).unwrap().name, "red2");
        assert!(find_by_name("blue", &all).is_none());
    }
}

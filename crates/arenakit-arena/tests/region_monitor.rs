//! Region monitor behavior against the in-process arena.
//!
//! Scheduling is driven by hand with `SessionScheduler::advance`, one call
//! per tick, so every deferred re-check fires at a known point.

use arenakit_arena::{
    Arena, ArenaError, ArenaSettings, ArenaWorld, BoundaryOutcome, EntryOutcome, LeaveOutcome,
    LocalArena, LocalPlayer, LocalWorld, OUTSIDER_KICK_MESSAGE, Player, RecheckOutcome,
    RegionMonitor, recheck_entry,
};
use arenakit_tick::SessionScheduler;
use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, BoundaryDirection, BoundaryEvent,
    OutOfBoundsPolicy, OutsiderPolicy, PlayerId, Position, RemovePlayerReason, SpawnKind,
    Spawnpoint,
};

const ARENA: ArenaId = ArenaId(1);
const INSIDE: Position = Position::new(0.0, 64.0, 0.0);
const OUTSIDE: Position = Position::new(100.0, 64.0, 0.0);
const EXIT: Position = Position::new(-200.0, 70.0, -200.0);

fn settings(outsider: OutsiderPolicy, oob: OutOfBoundsPolicy) -> ArenaSettings {
    ArenaSettings {
        outsider_policy: outsider,
        out_of_bounds_policy: oob,
        remove_location: EXIT,
        ..ArenaSettings::default()
    }
}

/// World with players 1 and 2 in the game and player 3 connected outside.
fn running(settings: ArenaSettings) -> LocalWorld {
    let mut world = LocalWorld::new(LocalArena::new(ARENA, settings));
    for id in 1..=2 {
        world.connect(LocalPlayer::new(PlayerId(id), INSIDE));
        world
            .arena_mut()
            .join(PlayerId(id), AddPlayerReason::PlayerJoin)
            .unwrap();
    }
    world.connect(LocalPlayer::new(PlayerId(3), OUTSIDE));
    world.arena_mut().start().unwrap();
    world.arena_mut().drain_events();
    world
}

fn tick(scheduler: &mut SessionScheduler<LocalWorld>, world: &mut LocalWorld, n: usize) {
    for _ in 0..n {
        scheduler.advance(world);
    }
}

/// Moves player 3 inside and fires the entry handler.
fn walk_in(
    monitor: &RegionMonitor,
    world: &mut LocalWorld,
    scheduler: &mut SessionScheduler<LocalWorld>,
) -> EntryOutcome {
    world.move_player(PlayerId(3), INSIDE).unwrap();
    monitor.on_enter(world, scheduler, PlayerId(3)).unwrap()
}

fn joins(events: &[ArenaEvent], player: PlayerId) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ArenaEvent::PlayerJoined { player: p, .. } if *p == player))
        .count()
}

// =========================================================================
// Crossing detection
// =========================================================================

#[test]
fn test_observe_move_reports_crossings_when_armed() {
    let world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::Kick));
    let mut monitor = RegionMonitor::new();
    monitor.on_arena_started(OutOfBoundsPolicy::Kick);
    assert!(monitor.is_watching());

    let enter = monitor.observe_move(&world, PlayerId(3), INSIDE).unwrap();
    assert_eq!(enter.direction, BoundaryDirection::Enter);
    assert_eq!(enter.arena, ARENA);
    assert!(monitor.is_inside(PlayerId(3)));

    assert!(monitor.observe_move(&world, PlayerId(3), INSIDE).is_none());

    let leave = monitor.observe_move(&world, PlayerId(3), OUTSIDE).unwrap();
    assert_eq!(leave.direction, BoundaryDirection::Leave);
    assert!(!monitor.is_inside(PlayerId(3)));
}

#[test]
fn test_observe_move_tracks_but_stays_quiet_when_disarmed() {
    let world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::Kick));
    let mut monitor = RegionMonitor::new();
    assert!(monitor.observe_move(&world, PlayerId(3), INSIDE).is_none());
    assert!(monitor.is_inside(PlayerId(3)));

    // Arming mid-match doesn't replay the earlier entry.
    monitor.on_arena_started(OutOfBoundsPolicy::Kick);
    assert!(monitor.observe_move(&world, PlayerId(3), INSIDE).is_none());
    assert!(monitor.observe_move(&world, PlayerId(3), OUTSIDE).is_some());
}

#[test]
fn test_watcher_follows_lifecycle() {
    let mut monitor = RegionMonitor::new();
    monitor.on_arena_started(OutOfBoundsPolicy::None);
    assert!(!monitor.is_watching());
    monitor.on_arena_started(OutOfBoundsPolicy::Win);
    assert!(monitor.is_watching());
    monitor.on_arena_ended();
    assert!(!monitor.is_watching());
}

#[test]
fn test_handle_ignores_other_arena() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::Kick));
    let mut scheduler = SessionScheduler::new();
    let mut monitor = RegionMonitor::new();
    let event = BoundaryEvent::new(PlayerId(1), BoundaryDirection::Leave, ArenaId(99));
    assert_eq!(
        monitor.handle(&mut world, &mut scheduler, &event),
        Ok(BoundaryOutcome::ForeignArena)
    );
    assert!(world.arena().relation(PlayerId(1)).is_some());
}

// =========================================================================
// Entry
// =========================================================================

#[test]
fn test_enter_without_outsider_policy_is_ignored() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Kick));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    assert_eq!(
        walk_in(&monitor, &mut world, &mut scheduler),
        EntryOutcome::NoPolicy
    );
    assert!(scheduler.is_idle());
}

#[test]
fn test_enter_idle_arena_is_ignored() {
    let mut world = LocalWorld::new(LocalArena::new(
        ARENA,
        settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None),
    ));
    world.connect(LocalPlayer::new(PlayerId(3), OUTSIDE));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    assert_eq!(
        walk_in(&monitor, &mut world, &mut scheduler),
        EntryOutcome::NotRunning
    );
}

#[test]
fn test_enter_by_dead_offline_or_unknown_player_is_ignored() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();

    world.player_mut(PlayerId(3)).unwrap().set_dead(true);
    assert_eq!(
        walk_in(&monitor, &mut world, &mut scheduler),
        EntryOutcome::Ineligible
    );

    world.player_mut(PlayerId(3)).unwrap().set_dead(false);
    world.player_mut(PlayerId(3)).unwrap().set_online(false);
    assert_eq!(
        walk_in(&monitor, &mut world, &mut scheduler),
        EntryOutcome::Ineligible
    );

    assert_eq!(
        monitor.on_enter(&mut world, &mut scheduler, PlayerId(42)),
        Ok(EntryOutcome::Ineligible)
    );
    assert!(scheduler.is_idle());
}

#[test]
fn test_member_reentry_is_noop() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    assert_eq!(
        monitor.on_enter(&mut world, &mut scheduler, PlayerId(1)),
        Ok(EntryOutcome::Member)
    );
    assert!(world.arena_mut().drain_events().is_empty());
    assert!(scheduler.is_idle());
}

#[test]
fn test_join_policy_applies_after_delay() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();

    assert_eq!(
        walk_in(&monitor, &mut world, &mut scheduler),
        EntryOutcome::Scheduled
    );
    assert_eq!(
        world.arena_mut().drain_events(),
        vec![ArenaEvent::EnteredRegion {
            arena: ARENA,
            player: PlayerId(3)
        }]
    );

    tick(&mut scheduler, &mut world, 4);
    assert_eq!(world.arena().relation(PlayerId(3)), None);

    tick(&mut scheduler, &mut world, 1);
    assert_eq!(
        world.arena().relation(PlayerId(3)),
        Some(ArenaRelation::Spectator)
    );
}

#[test]
fn test_join_policy_with_late_join_enters_game() {
    let mut world = running(ArenaSettings {
        allow_late_join: true,
        recheck_delay_ticks: 1,
        ..settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None)
    });
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);
    tick(&mut scheduler, &mut world, 1);
    assert_eq!(world.arena().relation(PlayerId(3)), Some(ArenaRelation::Game));
}

#[test]
fn test_kick_policy_sends_outsider_away() {
    let mut world = running(settings(OutsiderPolicy::Kick, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);
    tick(&mut scheduler, &mut world, 5);

    let player = world.player(PlayerId(3)).unwrap();
    assert_eq!(player.position(), EXIT);
    assert_eq!(player.messages(), [OUTSIDER_KICK_MESSAGE.to_string()]);
    assert_eq!(world.arena().relation(PlayerId(3)), None);
}

#[test]
fn test_outsider_who_walks_back_out_is_left_alone() {
    let mut world = running(settings(OutsiderPolicy::Kick, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);
    tick(&mut scheduler, &mut world, 2);
    world.move_player(PlayerId(3), OUTSIDE).unwrap();
    tick(&mut scheduler, &mut world, 3);

    let player = world.player(PlayerId(3)).unwrap();
    assert_eq!(player.position(), OUTSIDE);
    assert!(player.messages().is_empty());
}

#[test]
fn test_recheck_after_match_ended_is_noop() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);
    world.arena_mut().stop().unwrap();
    world.arena_mut().drain_events();

    // The one-shot still fires, but finds nothing to do.
    assert_eq!(scheduler.pending(), 1);
    tick(&mut scheduler, &mut world, 5);
    assert!(scheduler.is_idle());
    assert_eq!(world.arena().relation(PlayerId(3)), None);
    assert!(world.arena_mut().drain_events().is_empty());
}

#[test]
fn test_recheck_reads_current_state() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    world.move_player(PlayerId(3), INSIDE).unwrap();
    assert_eq!(
        recheck_entry(&mut world, ArenaId(7), PlayerId(3)),
        RecheckOutcome::ArenaChanged
    );
    assert_eq!(
        recheck_entry(&mut world, ARENA, PlayerId(9)),
        RecheckOutcome::PlayerGone
    );
    assert_eq!(
        recheck_entry(&mut world, ARENA, PlayerId(3)),
        RecheckOutcome::Joined(ArenaRelation::Spectator)
    );
    assert_eq!(
        recheck_entry(&mut world, ARENA, PlayerId(3)),
        RecheckOutcome::Member
    );
}

#[test]
fn test_rejected_join_is_final() {
    let mut world = running(ArenaSettings {
        allow_spectators: false,
        ..settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None)
    });
    world.move_player(PlayerId(3), INSIDE).unwrap();
    let outcome = recheck_entry(&mut world, ARENA, PlayerId(3));
    assert!(matches!(
        outcome,
        RecheckOutcome::JoinRejected(ArenaError::InvalidState(_))
    ));
    assert_eq!(world.arena().relation(PlayerId(3)), None);
}

/// Entry race: the player is added by another path while the re-check is
/// pending. The re-check sees the current membership and does not join
/// them a second time.
#[test]
fn test_entry_recheck_race_does_not_join_twice() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);

    world
        .arena_mut()
        .join(PlayerId(3), AddPlayerReason::Forwarding)
        .unwrap();
    tick(&mut scheduler, &mut world, 5);

    let events = world.arena_mut().drain_events();
    assert_eq!(joins(&events, PlayerId(3)), 1);
    assert!(scheduler.is_idle());
}

/// Same race, but the pending removal lands first: the re-check applies the
/// policy to the player as they are now, an inside outsider.
#[test]
fn test_entry_recheck_after_removal_joins_once() {
    let mut world = running(settings(OutsiderPolicy::Join, OutOfBoundsPolicy::None));
    let mut scheduler = SessionScheduler::new();
    let monitor = RegionMonitor::new();
    walk_in(&monitor, &mut world, &mut scheduler);

    world
        .arena_mut()
        .join(PlayerId(3), AddPlayerReason::Forwarding)
        .unwrap();
    world
        .arena_mut()
        .remove(PlayerId(3), RemovePlayerReason::Forwarding)
        .unwrap();
    world.arena_mut().drain_events();
    tick(&mut scheduler, &mut world, 5);

    let events = world.arena_mut().drain_events();
    assert_eq!(joins(&events, PlayerId(3)), 1);
    assert_eq!(
        world.arena().relation(PlayerId(3)),
        Some(ArenaRelation::Spectator)
    );
}

// =========================================================================
// Leave
// =========================================================================

#[test]
fn test_leave_gates() {
    let mut monitor_world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::None));
    let monitor = RegionMonitor::new();
    assert_eq!(
        monitor.on_leave(&mut monitor_world, PlayerId(1)),
        LeaveOutcome::NoPolicy
    );

    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Kick));
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(3)),
        LeaveOutcome::NotMember
    );
    world.arena_mut().stop().unwrap();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(1)),
        LeaveOutcome::NotRunning
    );
}

#[test]
fn test_leave_kick_removes_player() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Kick));
    let monitor = RegionMonitor::new();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(1)),
        LeaveOutcome::Kicked
    );
    assert_eq!(world.arena().relation(PlayerId(1)), None);
    assert_eq!(
        world.player(PlayerId(1)).unwrap().messages(),
        [RemovePlayerReason::Kick.message().to_string()]
    );
    assert_eq!(
        world.arena_mut().drain_events(),
        vec![
            ArenaEvent::LeftRegion {
                arena: ARENA,
                player: PlayerId(1),
                policy: OutOfBoundsPolicy::Kick,
            },
            ArenaEvent::PlayerRemoved {
                arena: ARENA,
                player: PlayerId(1),
                reason: RemovePlayerReason::Kick,
            },
        ]
    );
}

#[test]
fn test_leave_lose_removes_player() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Lose));
    let monitor = RegionMonitor::new();
    assert_eq!(monitor.on_leave(&mut world, PlayerId(2)), LeaveOutcome::Lost);
    assert_eq!(world.arena().relation(PlayerId(2)), None);
    assert!(world.player(PlayerId(2)).unwrap().messages().is_empty());
}

#[test]
fn test_leave_lose_after_winner_is_noop() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Lose));
    let monitor = RegionMonitor::new();
    world.arena_mut().set_winner(PlayerId(1)).unwrap();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(2)),
        LeaveOutcome::GameOver
    );
    assert_eq!(world.arena().relation(PlayerId(2)), Some(ArenaRelation::Game));
}

/// Both game players step out in the same tick under the win policy.
/// Exactly one of them wins.
#[test]
fn test_leave_win_race_sets_one_winner() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Win));
    let mut scheduler = SessionScheduler::new();
    let mut monitor = RegionMonitor::new();
    monitor.on_arena_started(OutOfBoundsPolicy::Win);
    for id in 1..=2 {
        monitor.observe_move(&world, PlayerId(id), INSIDE);
    }

    let mut outcomes = Vec::new();
    for id in 1..=2 {
        world.move_player(PlayerId(id), OUTSIDE).unwrap();
        let event = monitor
            .observe_move(&world, PlayerId(id), OUTSIDE)
            .unwrap();
        outcomes.push(monitor.handle(&mut world, &mut scheduler, &event).unwrap());
    }

    assert_eq!(
        outcomes,
        vec![
            BoundaryOutcome::Leave(LeaveOutcome::Won),
            BoundaryOutcome::Leave(LeaveOutcome::GameOver),
        ]
    );
    assert_eq!(world.arena().winner(), Some(PlayerId(1)));
    let declared = world
        .arena_mut()
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, ArenaEvent::WinnerDeclared { .. }))
        .count();
    assert_eq!(declared, 1);
}

#[test]
fn test_leave_respawn_teleports_back() {
    let spawn = Position::new(4.0, 65.0, 4.0);
    let mut world = running(ArenaSettings {
        spawnpoints: vec![Spawnpoint::new("mid", SpawnKind::Game, spawn)],
        ..settings(OutsiderPolicy::None, OutOfBoundsPolicy::Respawn)
    });
    let monitor = RegionMonitor::new();
    world.move_player(PlayerId(1), OUTSIDE).unwrap();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(1)),
        LeaveOutcome::Respawned(spawn)
    );
    assert_eq!(world.player(PlayerId(1)).unwrap().position(), spawn);
    assert_eq!(world.arena().relation(PlayerId(1)), Some(ArenaRelation::Game));
}

#[test]
fn test_respawned_player_is_policed_on_next_escape() {
    let spawn = Position::new(4.0, 65.0, 4.0);
    let mut world = running(ArenaSettings {
        spawnpoints: vec![Spawnpoint::new("mid", SpawnKind::Game, spawn)],
        ..settings(OutsiderPolicy::None, OutOfBoundsPolicy::Respawn)
    });
    let mut scheduler = SessionScheduler::new();
    let mut monitor = RegionMonitor::new();
    monitor.on_arena_started(OutOfBoundsPolicy::Respawn);
    monitor.observe_move(&world, PlayerId(1), INSIDE);

    for _ in 0..2 {
        world.move_player(PlayerId(1), OUTSIDE).unwrap();
        let event = monitor
            .observe_move(&world, PlayerId(1), OUTSIDE)
            .expect("every escape is a crossing");
        assert_eq!(
            monitor.handle(&mut world, &mut scheduler, &event),
            Ok(BoundaryOutcome::Leave(LeaveOutcome::Respawned(spawn)))
        );
        assert!(monitor.is_inside(PlayerId(1)));
    }
    assert_eq!(world.player(PlayerId(1)).unwrap().position(), spawn);
}

#[test]
fn test_kicked_outsider_is_rechecked_on_return() {
    let mut world = running(settings(OutsiderPolicy::Kick, OutOfBoundsPolicy::Kick));
    let mut scheduler = SessionScheduler::new();
    let mut monitor = RegionMonitor::new();
    monitor.on_arena_started(OutOfBoundsPolicy::Kick);
    monitor.observe_move(&world, PlayerId(3), OUTSIDE);

    for round in 1..=2 {
        world.move_player(PlayerId(3), INSIDE).unwrap();
        let event = monitor
            .observe_move(&world, PlayerId(3), INSIDE)
            .expect("every return is a crossing");
        assert_eq!(
            monitor.handle(&mut world, &mut scheduler, &event),
            Ok(BoundaryOutcome::Entry(EntryOutcome::Scheduled))
        );
        tick(&mut scheduler, &mut world, 10);
        monitor.resync(&world);

        let player = world.player(PlayerId(3)).unwrap();
        assert_eq!(player.position(), EXIT);
        assert_eq!(player.messages().len(), round);
        assert!(!monitor.is_inside(PlayerId(3)));
    }
}

#[test]
fn test_sync_forgets_disconnected_player() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Kick));
    let mut monitor = RegionMonitor::new();
    monitor.observe_move(&world, PlayerId(1), INSIDE);
    world.disconnect(PlayerId(1));
    monitor.resync(&world);
    assert!(!monitor.is_inside(PlayerId(1)));
}

#[test]
fn test_leave_respawn_without_spawnpoint_is_rejected() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Respawn));
    let monitor = RegionMonitor::new();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(1)),
        LeaveOutcome::Rejected(ArenaError::NoSpawnpoint(ARENA))
    );
}

#[test]
fn test_spectator_leaving_is_only_reported() {
    let mut world = running(settings(OutsiderPolicy::None, OutOfBoundsPolicy::Kick));
    world
        .arena_mut()
        .join(PlayerId(3), AddPlayerReason::PlayerJoin)
        .unwrap();
    world.arena_mut().drain_events();

    let monitor = RegionMonitor::new();
    assert_eq!(
        monitor.on_leave(&mut world, PlayerId(3)),
        LeaveOutcome::Reported
    );
    assert_eq!(
        world.arena().relation(PlayerId(3)),
        Some(ArenaRelation::Spectator)
    );
    assert_eq!(world.arena_mut().drain_events().len(), 1);
}

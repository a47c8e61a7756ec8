//! Region boundary policing.
//!
//! The [`RegionMonitor`] turns raw position updates into enter/leave
//! crossings and applies the arena's policies to them:
//!
//! - **Outsider policy** on entry: a non-member who walks into a running
//!   arena is re-checked after a short delay, then either joined or kicked
//!   back out to the arena's remove location.
//! - **Out-of-bounds policy** on exit: a game player who walks out is
//!   kicked, declared winner, declared loser or respawned.
//!
//! Detection is only armed while a session runs with an out-of-bounds
//! policy other than [`OutOfBoundsPolicy::None`]. The entry and leave
//! handlers check their own preconditions and can be driven directly.

use std::collections::HashMap;

use arenakit_tick::SessionScheduler;
use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, BoundaryDirection, BoundaryEvent,
    OutOfBoundsPolicy, OutsiderPolicy, PlayerId, Position, RemovePlayerReason,
};
use tracing::{debug, info, trace};

use crate::{Arena, ArenaError, ArenaWorld, Player};

/// Chat line for an outsider sent back to the remove location.
pub const OUTSIDER_KICK_MESSAGE: &str = "You're not allowed inside the arena during a match.";

/// What [`RegionMonitor::on_enter`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A re-check was scheduled.
    Scheduled,
    /// The arena has no outsider policy.
    NoPolicy,
    NotRunning,
    /// Player offline, dead or unknown.
    Ineligible,
    /// Already a member of the arena.
    Member,
}

/// What the deferred entry re-check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecheckOutcome {
    Joined(ArenaRelation),
    /// Sent to the arena's remove location.
    Kicked,
    /// The arena refused the join.
    JoinRejected(ArenaError),
    /// The arena being re-checked is not this world's arena.
    ArenaChanged,
    /// The session ended during the delay.
    NotRunning,
    NoPolicy,
    /// Player went offline or disconnected during the delay.
    PlayerGone,
    /// Player walked back out during the delay.
    LeftRegion,
    /// Player joined on their own during the delay.
    Member,
}

/// What [`RegionMonitor::on_leave`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    Kicked,
    Won,
    Lost,
    Respawned(Position),
    /// Lobby and spectator members are only reported.
    Reported,
    /// Win or lose policy while a winner is already known.
    GameOver,
    /// The arena refused the policy action.
    Rejected(ArenaError),
    NotRunning,
    NoPolicy,
    NotMember,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryOutcome {
    Entry(EntryOutcome),
    Leave(LeaveOutcome),
    /// The crossing belongs to another arena.
    ForeignArena,
}

#[derive(Debug, Default)]
pub struct RegionMonitor {
    watching: bool,
    /// Last known inside/outside state per observed player.
    tracked: HashMap<PlayerId, bool>,
}

impl RegionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms detection for a session that just started.
    pub fn on_arena_started(&mut self, policy: OutOfBoundsPolicy) {
        self.watching = policy != OutOfBoundsPolicy::None;
        debug!(watching = self.watching, %policy, "region monitor armed");
    }

    /// Disarms detection. Tracked positions are kept.
    pub fn on_arena_ended(&mut self) {
        self.watching = false;
        debug!("region monitor disarmed");
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn is_inside(&self, player: PlayerId) -> bool {
        self.tracked.get(&player).copied().unwrap_or(false)
    }

    /// Stops tracking a disconnected player.
    pub fn forget(&mut self, player: PlayerId) {
        self.tracked.remove(&player);
    }

    /// Re-reads one player's position from `world` without reporting a
    /// crossing. Needed after anything other than a move report relocates
    /// the player, such as a respawn or a kick to the remove location.
    pub fn sync<W: ArenaWorld>(&mut self, world: &W, player: PlayerId) {
        let region = world.arena().region();
        match world.player(player) {
            Some(p) => {
                let inside = region.contains(p.position());
                if self.tracked.insert(player, inside) != Some(inside) {
                    trace!(%player, inside, "tracked position resynced");
                }
            }
            None => {
                self.tracked.remove(&player);
            }
        }
    }

    /// [`sync`](Self::sync) for every tracked player. Call it after the
    /// scheduler ran, since deferred re-checks may have teleported players.
    pub fn resync<W: ArenaWorld>(&mut self, world: &W) {
        let players: Vec<PlayerId> = self.tracked.keys().copied().collect();
        for player in players {
            self.sync(world, player);
        }
    }

    /// Records a position update and reports a region crossing.
    ///
    /// Inside/outside state is tracked even while disarmed, so arming the
    /// monitor mid-match doesn't report players who were already inside.
    pub fn observe_move<W: ArenaWorld>(
        &mut self,
        world: &W,
        player: PlayerId,
        position: Position,
    ) -> Option<BoundaryEvent> {
        let arena = world.arena();
        let now_inside = arena.region().contains(position);
        let was_inside = self.tracked.insert(player, now_inside).unwrap_or(false);

        let direction = match (was_inside, now_inside) {
            (false, true) => BoundaryDirection::Enter,
            (true, false) => BoundaryDirection::Leave,
            _ => return None,
        };
        if !self.watching {
            trace!(%player, ?direction, "crossing while disarmed");
            return None;
        }
        Some(BoundaryEvent::new(player, direction, arena.id()))
    }

    /// Dispatches a crossing to [`on_enter`](Self::on_enter) or
    /// [`on_leave`](Self::on_leave).
    ///
    /// After a leave the player's tracked state is re-read, so a respawn
    /// back into the region is seen as inside.
    pub fn handle<W: ArenaWorld>(
        &mut self,
        world: &mut W,
        scheduler: &mut SessionScheduler<W>,
        event: &BoundaryEvent,
    ) -> Result<BoundaryOutcome, ArenaError> {
        if event.arena != world.arena().id() {
            return Ok(BoundaryOutcome::ForeignArena);
        }
        match event.direction {
            BoundaryDirection::Enter => self
                .on_enter(world, scheduler, event.player)
                .map(BoundaryOutcome::Entry),
            BoundaryDirection::Leave => {
                let outcome = self.on_leave(world, event.player);
                self.sync(world, event.player);
                Ok(BoundaryOutcome::Leave(outcome))
            }
        }
    }

    /// A player walked into the arena's region.
    ///
    /// Non-members of a running arena with an outsider policy get a
    /// re-check scheduled after the arena's re-check delay. The policy is
    /// applied then, if the player is still inside and still unaffiliated.
    ///
    /// # Errors
    /// [`ArenaError::Scheduler`] if the arena reports a negative delay.
    pub fn on_enter<W: ArenaWorld>(
        &self,
        world: &mut W,
        scheduler: &mut SessionScheduler<W>,
        player: PlayerId,
    ) -> Result<EntryOutcome, ArenaError> {
        let arena = world.arena();
        if arena.outsider_policy() == OutsiderPolicy::None {
            return Ok(EntryOutcome::NoPolicy);
        }
        if !arena.is_running() {
            return Ok(EntryOutcome::NotRunning);
        }
        let eligible = world
            .player(player)
            .is_some_and(|p| p.is_online() && !p.is_dead());
        if !eligible {
            return Ok(EntryOutcome::Ineligible);
        }
        if arena.relation(player).is_some() {
            return Ok(EntryOutcome::Member);
        }

        let arena_id = arena.id();
        let delay = arena.recheck_delay();
        world
            .arena_mut()
            .notify(ArenaEvent::EnteredRegion { arena: arena_id, player });

        let task = scheduler.schedule_after(delay, move |w: &mut W| {
            let outcome = recheck_entry(w, arena_id, player);
            debug!(%arena_id, %player, ?outcome, "entry re-checked");
        })?;
        debug!(%arena_id, %player, task_id = %task.id(), delay, "outsider entered, re-check scheduled");
        Ok(EntryOutcome::Scheduled)
    }

    /// A player walked out of the arena's region.
    ///
    /// Every member is reported with a `LeftRegion` event. Game players then
    /// get the arena's out-of-bounds policy applied immediately.
    pub fn on_leave<W: ArenaWorld>(&self, world: &mut W, player: PlayerId) -> LeaveOutcome {
        let arena = world.arena();
        if !arena.is_running() {
            return LeaveOutcome::NotRunning;
        }
        let policy = arena.out_of_bounds_policy();
        if policy == OutOfBoundsPolicy::None {
            return LeaveOutcome::NoPolicy;
        }
        let Some(relation) = arena.relation(player) else {
            return LeaveOutcome::NotMember;
        };
        let arena_id = arena.id();
        let game_over = arena.is_game_over();

        world.arena_mut().notify(ArenaEvent::LeftRegion {
            arena: arena_id,
            player,
            policy,
        });
        if relation != ArenaRelation::Game {
            return LeaveOutcome::Reported;
        }

        let outcome = match policy {
            OutOfBoundsPolicy::None => LeaveOutcome::NoPolicy,
            OutOfBoundsPolicy::Kick => {
                match world.arena_mut().remove(player, RemovePlayerReason::Kick) {
                    Ok(()) => {
                        if let Some(p) = world.player_mut(player) {
                            p.tell(RemovePlayerReason::Kick.message());
                        }
                        LeaveOutcome::Kicked
                    }
                    Err(e) => LeaveOutcome::Rejected(e),
                }
            }
            OutOfBoundsPolicy::Win if game_over => LeaveOutcome::GameOver,
            OutOfBoundsPolicy::Win => match world.arena_mut().set_winner(player) {
                Ok(()) => LeaveOutcome::Won,
                Err(e) => LeaveOutcome::Rejected(e),
            },
            OutOfBoundsPolicy::Lose if game_over => LeaveOutcome::GameOver,
            OutOfBoundsPolicy::Lose => {
                match world.arena_mut().remove(player, RemovePlayerReason::Lose) {
                    Ok(()) => LeaveOutcome::Lost,
                    Err(e) => LeaveOutcome::Rejected(e),
                }
            }
            OutOfBoundsPolicy::Respawn => match world.arena_mut().respawn_player(player) {
                Ok(to) => {
                    if let Some(p) = world.player_mut(player) {
                        p.teleport(to);
                    }
                    LeaveOutcome::Respawned(to)
                }
                Err(e) => LeaveOutcome::Rejected(e),
            },
        };
        info!(%arena_id, %player, %policy, ?outcome, "player left arena region");
        outcome
    }
}

/// Applies the outsider policy to `player` after the re-check delay.
///
/// Everything is re-read from `world`, since anything may have changed
/// while the task waited: the session may have ended, the player may have
/// logged off, walked back out or joined on their own, and the policy
/// itself may have been reconfigured.
pub fn recheck_entry<W: ArenaWorld>(
    world: &mut W,
    arena_id: ArenaId,
    player: PlayerId,
) -> RecheckOutcome {
    let arena = world.arena();
    if arena.id() != arena_id {
        return RecheckOutcome::ArenaChanged;
    }
    if !arena.is_running() {
        return RecheckOutcome::NotRunning;
    }
    let Some(position) = world
        .player(player)
        .filter(|p| p.is_online())
        .map(|p| p.position())
    else {
        return RecheckOutcome::PlayerGone;
    };
    if !arena.region().contains(position) {
        return RecheckOutcome::LeftRegion;
    }
    if arena.relation(player).is_some() {
        return RecheckOutcome::Member;
    }

    match arena.outsider_policy() {
        OutsiderPolicy::None => RecheckOutcome::NoPolicy,
        OutsiderPolicy::Join => match world.arena_mut().join(player, AddPlayerReason::PlayerJoin) {
            Ok(relation) => RecheckOutcome::Joined(relation),
            Err(e) => {
                debug!(%arena_id, %player, error = %e, "outsider join refused");
                RecheckOutcome::JoinRejected(e)
            }
        },
        OutsiderPolicy::Kick => {
            let to = arena.remove_location();
            if let Some(p) = world.player_mut(player) {
                p.teleport(to);
                p.tell(OUTSIDER_KICK_MESSAGE);
            }
            info!(%arena_id, %player, "outsider kicked from arena region");
            RecheckOutcome::Kicked
        }
    }
}

//! In-process arena and world.
//!
//! [`LocalArena`] is a complete [`Arena`]: lobby, game and spectator
//! membership, team assignment, session lifecycle and an event outbox.
//! [`LocalWorld`] pairs it with a directory of connected players so the
//! region monitor and scheduled tasks have something to act on.

use std::collections::{BTreeMap, HashMap};

use arenakit_tick::{SessionClock, SessionSource, SessionState, SessionToken, Ticks};
use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, ArenaTeam, OutOfBoundsPolicy,
    OutsiderPolicy, PlayerId, Position, Region, RemovePlayerReason, SpawnKind,
};
use tracing::{debug, info};

use crate::{Arena, ArenaError, ArenaSettings, ArenaWorld, Player, TeamDistributor, spawn};

/// A player's place in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub relation: ArenaRelation,
    pub team: ArenaTeam,
}

pub struct LocalArena {
    id: ArenaId,
    settings: ArenaSettings,
    clock: SessionClock,
    teams: TeamDistributor,
    members: BTreeMap<PlayerId, Member>,
    winner: Option<PlayerId>,
    outbox: Vec<ArenaEvent>,
}

impl LocalArena {
    pub fn new(id: ArenaId, settings: ArenaSettings) -> Self {
        let settings = settings.validated();
        let teams = TeamDistributor::new(settings.teams.iter().copied());
        Self {
            id,
            settings,
            clock: SessionClock::new(),
            teams,
            members: BTreeMap::new(),
            winner: None,
            outbox: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    pub fn member(&self, player: PlayerId) -> Option<Member> {
        self.members.get(&player).copied()
    }

    /// Members in player id order.
    pub fn members(&self) -> impl Iterator<Item = (PlayerId, Member)> + '_ {
        self.members.iter().map(|(id, m)| (*id, *m))
    }

    pub fn count(&self, relation: ArenaRelation) -> usize {
        self.members
            .values()
            .filter(|m| m.relation == relation)
            .count()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn teams(&self) -> &TeamDistributor {
        &self.teams
    }

    /// Starts a new session and moves the lobby into the game.
    ///
    /// # Errors
    /// [`ArenaError::InvalidState`] if already running or the lobby is
    /// below `min_players`.
    pub fn start(&mut self) -> Result<SessionToken, ArenaError> {
        if self.clock.is_running() {
            return Err(ArenaError::InvalidState(format!(
                "arena {} is already running",
                self.id
            )));
        }
        let lobby = self.count(ArenaRelation::Lobby);
        if lobby < self.settings.min_players {
            return Err(ArenaError::InvalidState(format!(
                "arena {} needs {} players to start, has {}",
                self.id, self.settings.min_players, lobby
            )));
        }

        let token = self.clock.start();
        self.winner = None;
        for member in self.members.values_mut() {
            if member.relation == ArenaRelation::Lobby {
                member.relation = ArenaRelation::Game;
            }
        }

        info!(arena_id = %self.id, session = %token, players = lobby, "arena started");
        self.notify(ArenaEvent::Started {
            arena: self.id,
            players: lobby,
        });
        Ok(token)
    }

    /// Ends the running session and releases every member.
    ///
    /// # Errors
    /// [`ArenaError::InvalidState`] if not running.
    pub fn stop(&mut self) -> Result<(), ArenaError> {
        if !self.clock.is_running() {
            return Err(ArenaError::InvalidState(format!(
                "arena {} is not running",
                self.id
            )));
        }
        self.clock.stop();
        info!(arena_id = %self.id, winner = ?self.winner, "arena ended");
        self.notify(ArenaEvent::Ended {
            arena: self.id,
            winner: self.winner,
        });

        let released = std::mem::take(&mut self.members);
        for player in released.into_keys() {
            self.notify(ArenaEvent::PlayerRemoved {
                arena: self.id,
                player,
                reason: RemovePlayerReason::ArenaEnded,
            });
        }
        self.teams.reset();
        Ok(())
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn placement(&self) -> Result<ArenaRelation, ArenaError> {
        if !self.clock.is_running() {
            Ok(ArenaRelation::Lobby)
        } else if self.settings.allow_late_join {
            Ok(ArenaRelation::Game)
        } else if self.settings.allow_spectators {
            Ok(ArenaRelation::Spectator)
        } else {
            Err(ArenaError::InvalidState(format!(
                "arena {} is running and closed to newcomers",
                self.id
            )))
        }
    }
}

impl Arena for LocalArena {
    fn id(&self) -> ArenaId {
        self.id
    }

    fn session(&self) -> SessionState {
        self.clock.state()
    }

    fn outsider_policy(&self) -> OutsiderPolicy {
        self.settings.outsider_policy
    }

    fn out_of_bounds_policy(&self) -> OutOfBoundsPolicy {
        self.settings.out_of_bounds_policy
    }

    fn remove_location(&self) -> Position {
        self.settings.remove_location
    }

    fn region(&self) -> &Region {
        &self.settings.region
    }

    fn recheck_delay(&self) -> Ticks {
        self.settings.recheck_delay()
    }

    fn relation(&self, player: PlayerId) -> Option<ArenaRelation> {
        self.members.get(&player).map(|m| m.relation)
    }

    fn join(
        &mut self,
        player: PlayerId,
        reason: AddPlayerReason,
    ) -> Result<ArenaRelation, ArenaError> {
        if self.members.contains_key(&player) {
            return Err(ArenaError::AlreadyInArena(player, self.id));
        }
        let relation = self.placement()?;

        let team = if relation == ArenaRelation::Spectator {
            ArenaTeam::None
        } else {
            let playing = self.members.len() - self.count(ArenaRelation::Spectator);
            if playing >= self.settings.max_players {
                return Err(ArenaError::ArenaFull(self.id));
            }
            self.teams.next_team().unwrap_or_default()
        };

        self.members.insert(player, Member { relation, team });
        info!(
            arena_id = %self.id,
            %player,
            %relation,
            %team,
            players = self.members.len(),
            "player joined"
        );
        self.notify(ArenaEvent::PlayerJoined {
            arena: self.id,
            player,
            relation,
            team,
            reason,
        });
        Ok(relation)
    }

    fn remove(&mut self, player: PlayerId, reason: RemovePlayerReason) -> Result<(), ArenaError> {
        let member = self
            .members
            .remove(&player)
            .ok_or(ArenaError::NotInArena(player, self.id))?;

        if member.relation == ArenaRelation::Lobby && member.team.is_team() {
            self.teams.recycle(member.team);
        }
        info!(
            arena_id = %self.id,
            %player,
            %reason,
            players = self.members.len(),
            "player removed"
        );
        self.notify(ArenaEvent::PlayerRemoved {
            arena: self.id,
            player,
            reason,
        });
        Ok(())
    }

    fn set_winner(&mut self, player: PlayerId) -> Result<(), ArenaError> {
        if !self.clock.is_running() {
            return Err(ArenaError::InvalidState(format!(
                "arena {} is not running",
                self.id
            )));
        }
        if self.relation(player) != Some(ArenaRelation::Game) {
            return Err(ArenaError::NotInArena(player, self.id));
        }
        if let Some(existing) = self.winner {
            return Err(ArenaError::InvalidState(format!(
                "arena {} already has winner {}",
                self.id, existing
            )));
        }
        self.winner = Some(player);
        info!(arena_id = %self.id, %player, "winner declared");
        self.notify(ArenaEvent::WinnerDeclared {
            arena: self.id,
            player,
        });
        Ok(())
    }

    fn respawn_player(&mut self, player: PlayerId) -> Result<Position, ArenaError> {
        let member = self
            .member(player)
            .filter(|m| m.relation == ArenaRelation::Game)
            .ok_or(ArenaError::NotInArena(player, self.id))?;

        let candidates = spawn::candidates(SpawnKind::Game, member.team, &self.settings.spawnpoints);
        let chosen = spawn::random(&candidates).ok_or(ArenaError::NoSpawnpoint(self.id))?;
        debug!(arena_id = %self.id, %player, spawn = %chosen.name, "respawn");
        Ok(chosen.position)
    }

    fn is_game_over(&self) -> bool {
        !self.clock.is_running() || self.winner.is_some()
    }

    fn notify(&mut self, event: ArenaEvent) {
        self.outbox.push(event);
    }
}

/// A connected player held by [`LocalWorld`].
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    id: PlayerId,
    online: bool,
    dead: bool,
    position: Position,
    messages: Vec<String>,
}

impl LocalPlayer {
    pub fn new(id: PlayerId, position: Position) -> Self {
        Self {
            id,
            online: true,
            dead: false,
            position,
            messages: Vec::new(),
        }
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    /// Chat lines sent to this player, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Player for LocalPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn position(&self) -> Position {
        self.position
    }

    fn teleport(&mut self, to: Position) {
        debug!(player = %self.id, %to, "teleport");
        self.position = to;
    }

    fn tell(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// One [`LocalArena`] plus the players connected around it.
pub struct LocalWorld {
    arena: LocalArena,
    players: HashMap<PlayerId, LocalPlayer>,
}

impl LocalWorld {
    pub fn new(arena: LocalArena) -> Self {
        Self {
            arena,
            players: HashMap::new(),
        }
    }

    /// Adds a player to the directory, replacing a stale entry.
    pub fn connect(&mut self, player: LocalPlayer) {
        self.players.insert(player.id, player);
    }

    /// Takes a player out of the directory. A member is removed from the
    /// arena with [`RemovePlayerReason::Logout`] first.
    pub fn disconnect(&mut self, player: PlayerId) -> Option<LocalPlayer> {
        if self.arena.relation(player).is_some() {
            if let Err(e) = self.arena.remove(player, RemovePlayerReason::Logout) {
                debug!(%player, error = %e, "logout removal refused");
            }
        }
        self.players.remove(&player)
    }

    /// Records a player's new position without any region checks.
    pub fn move_player(&mut self, player: PlayerId, to: Position) -> Result<(), ArenaError> {
        let entry = self
            .players
            .get_mut(&player)
            .ok_or(ArenaError::UnknownPlayer(player))?;
        entry.position = to;
        Ok(())
    }

    pub fn players(&self) -> impl Iterator<Item = &LocalPlayer> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

impl SessionSource for LocalWorld {
    fn session(&self) -> SessionState {
        self.arena.session()
    }
}

impl ArenaWorld for LocalWorld {
    type Arena = LocalArena;
    type Player = LocalPlayer;

    fn arena(&self) -> &LocalArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut LocalArena {
        &mut self.arena
    }

    fn player(&self, id: PlayerId) -> Option<&LocalPlayer> {
        self.players.get(&id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut LocalPlayer> {
        self.players.get_mut(&id)
    }
}

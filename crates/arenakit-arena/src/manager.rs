//! Arena manager: creates, tracks and routes players to arenas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use arenakit_types::{ArenaId, ArenaRelation, PlayerId, Position};

use crate::actor::spawn_arena;
use crate::{ArenaError, ArenaHandle, ArenaInfo, ArenaSettings};

/// Counter for generating unique arena IDs.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for arena actors.
pub(crate) const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Owns every arena actor and the directory of online players.
///
/// Every online player is connected to every arena, so each arena's region
/// monitor sees all movement near it. Membership lives in the arenas; the
/// manager asks them when it needs to know where a player is.
pub struct ArenaManager {
    arenas: HashMap<ArenaId, ArenaHandle>,
    /// Last known position of each online player.
    online: HashMap<PlayerId, Position>,
}

impl ArenaManager {
    pub fn new() -> Self {
        Self {
            arenas: HashMap::new(),
            online: HashMap::new(),
        }
    }

    /// Creates a new arena and connects every online player to it.
    pub async fn create_arena(&mut self, settings: ArenaSettings) -> Result<ArenaId, ArenaError> {
        let arena_id = ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed));
        let name = settings.name.clone();
        let handle = spawn_arena(arena_id, settings, DEFAULT_CHANNEL_SIZE);
        for (player, position) in &self.online {
            handle.connect(*player, *position).await?;
        }
        self.arenas.insert(arena_id, handle);
        tracing::info!(%arena_id, %name, "arena created");
        Ok(arena_id)
    }

    /// Registers an online player with every arena.
    pub async fn connect_player(
        &mut self,
        player: PlayerId,
        position: Position,
    ) -> Result<(), ArenaError> {
        for handle in self.arenas.values() {
            handle.connect(player, position).await?;
        }
        self.online.insert(player, position);
        tracing::debug!(%player, "player connected");
        Ok(())
    }

    /// Removes a player from every arena, ending any membership.
    pub async fn disconnect_player(&mut self, player: PlayerId) -> Result<(), ArenaError> {
        if self.online.remove(&player).is_none() {
            return Err(ArenaError::UnknownPlayer(player));
        }
        for handle in self.arenas.values() {
            handle.disconnect(player).await?;
        }
        tracing::debug!(%player, "player disconnected");
        Ok(())
    }

    /// Adds a player to an arena.
    ///
    /// Enforces the "one arena at a time" invariant.
    pub async fn join_arena(
        &self,
        player: PlayerId,
        arena_id: ArenaId,
    ) -> Result<ArenaRelation, ArenaError> {
        if !self.online.contains_key(&player) {
            return Err(ArenaError::UnknownPlayer(player));
        }
        let handle = self
            .arenas
            .get(&arena_id)
            .ok_or(ArenaError::NotFound(arena_id))?;
        if let Some(current) = self.player_arena(player).await? {
            return Err(ArenaError::AlreadyInArena(player, current));
        }
        handle.join(player).await
    }

    /// Removes a player from their current arena.
    pub async fn leave_arena(&self, player: PlayerId) -> Result<ArenaId, ArenaError> {
        let arena_id = self.player_arena(player).await?.ok_or_else(|| {
            ArenaError::InvalidState(format!("player {player} is not in any arena"))
        })?;
        if let Some(handle) = self.arenas.get(&arena_id) {
            handle.leave(player).await?;
        }
        Ok(arena_id)
    }

    /// Routes a position update to every arena.
    pub async fn move_player(
        &mut self,
        player: PlayerId,
        position: Position,
    ) -> Result<(), ArenaError> {
        let last = self
            .online
            .get_mut(&player)
            .ok_or(ArenaError::UnknownPlayer(player))?;
        *last = position;
        for handle in self.arenas.values() {
            handle.move_player(player, position).await?;
        }
        Ok(())
    }

    /// The arena the player is a member of, if any.
    pub async fn player_arena(&self, player: PlayerId) -> Result<Option<ArenaId>, ArenaError> {
        for (arena_id, handle) in &self.arenas {
            if handle.relation(player).await?.is_some() {
                return Ok(Some(*arena_id));
            }
        }
        Ok(None)
    }

    pub fn get(&self, arena_id: ArenaId) -> Result<&ArenaHandle, ArenaError> {
        self.arenas
            .get(&arena_id)
            .ok_or(ArenaError::NotFound(arena_id))
    }

    /// Shuts down and forgets an arena. A running match is ended first.
    pub async fn destroy_arena(&mut self, arena_id: ArenaId) -> Result<(), ArenaError> {
        let handle = self
            .arenas
            .remove(&arena_id)
            .ok_or(ArenaError::NotFound(arena_id))?;
        handle.shutdown().await?;
        tracing::info!(%arena_id, "arena destroyed");
        Ok(())
    }

    /// Info for every arena, ordered by id.
    pub async fn list_arenas(&self) -> Vec<ArenaInfo> {
        let mut infos = Vec::with_capacity(self.arenas.len());
        for handle in self.arenas.values() {
            match handle.get_info().await {
                Ok(info) => infos.push(info),
                Err(e) => tracing::warn!(arena_id = %handle.arena_id(), error = %e, "arena did not answer"),
            }
        }
        infos.sort_by_key(|info| info.arena_id);
        infos
    }

    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}

impl Default for ArenaManager {
    fn default() -> Self {
        Self::new()
    }
}

//! The seams between the core and the host platform.
//!
//! The core decides *when* something happens and *which* policy outcome
//! applies. How a teleport is rendered or how membership is stored is the
//! host's business, expressed through these traits.

use arenakit_tick::{SessionSource, SessionState, Ticks};
use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, OutOfBoundsPolicy, OutsiderPolicy,
    PlayerId, Position, Region, RemovePlayerReason,
};

use crate::ArenaError;

/// One configured arena and the state of its current run.
pub trait Arena {
    fn id(&self) -> ArenaId;

    /// Live session snapshot: current token plus running flag.
    fn session(&self) -> SessionState;

    fn is_running(&self) -> bool {
        self.session().running
    }

    fn outsider_policy(&self) -> OutsiderPolicy;

    fn out_of_bounds_policy(&self) -> OutOfBoundsPolicy;

    /// Where kicked outsiders are sent.
    fn remove_location(&self) -> Position;

    fn region(&self) -> &Region;

    /// Tolerance window before an entering player is re-checked.
    fn recheck_delay(&self) -> Ticks;

    /// The player's context in this arena, or `None` if they are not a
    /// member.
    fn relation(&self, player: PlayerId) -> Option<ArenaRelation>;

    /// Adds a player. Returns the context they were placed in.
    fn join(
        &mut self,
        player: PlayerId,
        reason: AddPlayerReason,
    ) -> Result<ArenaRelation, ArenaError>;

    fn remove(&mut self, player: PlayerId, reason: RemovePlayerReason) -> Result<(), ArenaError>;

    /// Declares the winner of the running match.
    fn set_winner(&mut self, player: PlayerId) -> Result<(), ArenaError>;

    /// Picks a valid in-game position for the player. The caller moves
    /// them there.
    fn respawn_player(&mut self, player: PlayerId) -> Result<Position, ArenaError>;

    fn is_game_over(&self) -> bool;

    /// Broadcasts an event to the arena's observers.
    fn notify(&mut self, event: ArenaEvent);
}

/// A connected player as seen by the host platform.
pub trait Player {
    fn id(&self) -> PlayerId;

    fn is_online(&self) -> bool;

    fn is_dead(&self) -> bool;

    fn position(&self) -> Position;

    fn teleport(&mut self, to: Position);

    /// Sends the player a chat line.
    fn tell(&mut self, message: &str);
}

/// Everything a deferred task or the region monitor can reach.
///
/// Scheduled closures receive `&mut W` at fire time and look players and
/// the arena up by id, so nothing they hold can go stale across a delay.
pub trait ArenaWorld: SessionSource + 'static {
    type Arena: Arena;
    type Player: Player;

    fn arena(&self) -> &Self::Arena;

    fn arena_mut(&mut self) -> &mut Self::Arena;

    fn player(&self, id: PlayerId) -> Option<&Self::Player>;

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Self::Player>;
}

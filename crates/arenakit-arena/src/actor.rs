//! Arena actor: an isolated Tokio task that owns one arena.
//!
//! The actor is the single writer for its arena. Commands from the outside
//! world, position updates and scheduler ticks are all handled on the one
//! task, so the session clock, the scheduler, the team distributor and the
//! region monitor never see concurrent mutation.

use arenakit_tick::{SessionScheduler, SessionSource, SessionToken, TaskBatch, TickSource};
use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, PlayerId, Position, RemovePlayerReason,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    Arena, ArenaError, ArenaSettings, ArenaWorld, LocalArena, LocalPlayer, LocalWorld,
    RegionMonitor,
};

/// Receiving end of an arena's event feed.
pub type EventReceiver = mpsc::UnboundedReceiver<ArenaEvent>;

type EventSender = mpsc::UnboundedSender<ArenaEvent>;

/// Commands sent to an arena actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply.
pub(crate) enum ArenaCommand {
    Connect {
        player: PlayerId,
        position: Position,
        reply: oneshot::Sender<()>,
    },

    Disconnect {
        player: PlayerId,
        reply: oneshot::Sender<()>,
    },

    Join {
        player: PlayerId,
        reply: oneshot::Sender<Result<ArenaRelation, ArenaError>>,
    },

    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },

    Relation {
        player: PlayerId,
        reply: oneshot::Sender<Option<ArenaRelation>>,
    },

    /// Position update from the movement layer (fire-and-forget).
    Move { player: PlayerId, position: Position },

    Start {
        reply: oneshot::Sender<Result<SessionToken, ArenaError>>,
    },

    Stop {
        reply: oneshot::Sender<Result<(), ArenaError>>,
    },

    Subscribe { sender: EventSender },

    GetInfo { reply: oneshot::Sender<ArenaInfo> },

    Shutdown,
}

/// A snapshot of arena metadata.
#[derive(Debug, Clone)]
pub struct ArenaInfo {
    pub arena_id: ArenaId,
    pub name: String,
    pub running: bool,
    pub session: Option<SessionToken>,
    pub lobby: usize,
    pub game: usize,
    pub spectators: usize,
    pub max_players: usize,
    pub winner: Option<PlayerId>,
    /// Whether boundary crossings are currently being detected.
    pub watching: bool,
    /// Scheduled tasks that may still fire.
    pub pending_tasks: usize,
    pub tick: u64,
}

impl ArenaInfo {
    /// Members in any context.
    pub fn member_count(&self) -> usize {
        self.lobby + self.game + self.spectators
    }
}

/// Handle to a running arena actor.
///
/// Cheap to clone; the [`ArenaManager`](crate::ArenaManager) holds one per
/// arena.
#[derive(Clone)]
pub struct ArenaHandle {
    arena_id: ArenaId,
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    pub fn arena_id(&self) -> ArenaId {
        self.arena_id
    }

    /// Sends a command and waits for the reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ArenaCommand,
    ) -> Result<T, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))?;
        reply_rx
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }

    /// Makes a player known to the arena's world, e.g. on login.
    pub async fn connect(&self, player: PlayerId, position: Position) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Connect {
            player,
            position,
            reply,
        })
        .await
    }

    /// Forgets a player, removing them from the arena if they were a member.
    pub async fn disconnect(&self, player: PlayerId) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Disconnect { player, reply })
            .await
    }

    pub async fn join(&self, player: PlayerId) -> Result<ArenaRelation, ArenaError> {
        self.request(|reply| ArenaCommand::Join { player, reply })
            .await?
    }

    pub async fn leave(&self, player: PlayerId) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Leave { player, reply })
            .await?
    }

    /// The player's context in this arena, if any.
    pub async fn relation(&self, player: PlayerId) -> Result<Option<ArenaRelation>, ArenaError> {
        self.request(|reply| ArenaCommand::Relation { player, reply })
            .await
    }

    /// Reports a player's new position (fire-and-forget).
    pub async fn move_player(&self, player: PlayerId, position: Position) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Move { player, position })
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }

    pub async fn start(&self) -> Result<SessionToken, ArenaError> {
        self.request(|reply| ArenaCommand::Start { reply }).await?
    }

    pub async fn stop(&self) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Stop { reply }).await?
    }

    /// Opens a feed of every event the arena broadcasts from now on.
    pub async fn subscribe(&self) -> Result<EventReceiver, ArenaError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sender
            .send(ArenaCommand::Subscribe { sender: tx })
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))?;
        Ok(rx)
    }

    pub async fn get_info(&self) -> Result<ArenaInfo, ArenaError> {
        self.request(|reply| ArenaCommand::GetInfo { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Shutdown)
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }
}

/// The internal arena actor state. Runs inside a Tokio task.
struct ArenaActor {
    arena_id: ArenaId,
    world: LocalWorld,
    scheduler: SessionScheduler<LocalWorld>,
    monitor: RegionMonitor,
    /// Effects of the running match, cancelled together when it ends.
    effects: TaskBatch,
    ticks: TickSource,
    observers: Vec<EventSender>,
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl ArenaActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        info!(arena_id = %self.arena_id, "arena actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                _ = self.ticks.wait_for_tick() => {
                    self.scheduler.advance(&mut self.world);
                    // Re-checks may have teleported players.
                    self.monitor.resync(&self.world);
                    self.ticks.record_tick_end();
                }
            }
            self.flush_events();
        }

        self.scheduler.cancel_all();
        self.effects.cancel_all();
        info!(arena_id = %self.arena_id, "arena actor stopped");
    }

    /// Applies one command. Returns `false` when the actor should exit.
    fn handle_command(&mut self, cmd: ArenaCommand) -> bool {
        match cmd {
            ArenaCommand::Connect {
                player,
                position,
                reply,
            } => {
                self.world.connect(LocalPlayer::new(player, position));
                // Logging in inside the region counts as walking in.
                self.police(player, position);
                let _ = reply.send(());
            }
            ArenaCommand::Disconnect { player, reply } => {
                self.world.disconnect(player);
                self.monitor.forget(player);
                let _ = reply.send(());
            }
            ArenaCommand::Join { player, reply } => {
                let result = self.handle_join(player);
                let _ = reply.send(result);
            }
            ArenaCommand::Leave { player, reply } => {
                let result = self
                    .world
                    .arena_mut()
                    .remove(player, RemovePlayerReason::PlayerLeave);
                let _ = reply.send(result);
            }
            ArenaCommand::Relation { player, reply } => {
                let _ = reply.send(self.world.arena().relation(player));
            }
            ArenaCommand::Move { player, position } => {
                self.handle_move(player, position);
            }
            ArenaCommand::Start { reply } => {
                let _ = reply.send(self.world.arena_mut().start());
            }
            ArenaCommand::Stop { reply } => {
                let _ = reply.send(self.world.arena_mut().stop());
            }
            ArenaCommand::Subscribe { sender } => {
                self.observers.push(sender);
            }
            ArenaCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            ArenaCommand::Shutdown => {
                info!(arena_id = %self.arena_id, "arena shutting down");
                if self.world.arena().is_running() {
                    let _ = self.world.arena_mut().stop();
                    self.flush_events();
                }
                return false;
            }
        }
        true
    }

    fn handle_join(&mut self, player: PlayerId) -> Result<ArenaRelation, ArenaError> {
        if self.world.player(player).is_none() {
            return Err(ArenaError::UnknownPlayer(player));
        }
        self.world
            .arena_mut()
            .join(player, AddPlayerReason::PlayerJoin)
    }

    fn handle_move(&mut self, player: PlayerId, position: Position) {
        if let Err(e) = self.world.move_player(player, position) {
            debug!(arena_id = %self.arena_id, error = %e, "move for unknown player ignored");
            return;
        }
        self.police(player, position);
    }

    /// Feeds a new position to the region monitor and applies any policy.
    fn police(&mut self, player: PlayerId, position: Position) {
        let Some(event) = self.monitor.observe_move(&self.world, player, position) else {
            return;
        };
        if let Err(e) = self
            .monitor
            .handle(&mut self.world, &mut self.scheduler, &event)
        {
            warn!(arena_id = %self.arena_id, %player, error = %e, "boundary handling failed");
        }
    }

    /// Reacts to lifecycle events and forwards everything to observers.
    fn flush_events(&mut self) {
        for event in self.world.arena_mut().drain_events() {
            match &event {
                ArenaEvent::Started { .. } => self.on_started(),
                ArenaEvent::Ended { .. } => {
                    self.monitor.on_arena_ended();
                    self.effects.cancel_all();
                }
                _ => {}
            }
            self.observers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn on_started(&mut self) {
        let session = self.world.session();
        self.effects.release_if_stale(session);
        self.monitor
            .on_arena_started(self.world.arena().out_of_bounds_policy());

        let Some(limit) = self.world.arena().settings().time_limit_secs else {
            return;
        };
        let arena = self.arena_id;
        let second = i64::from(self.ticks.tick_rate_hz());
        let mut remaining = limit;
        let clock = self.effects.run_repeating(
            &mut self.scheduler,
            &self.world,
            second,
            second,
            move |w: &mut LocalWorld| {
                remaining = remaining.saturating_sub(1);
                w.arena_mut().notify(ArenaEvent::ClockTick {
                    arena,
                    remaining_secs: remaining,
                });
                if remaining == 0 {
                    info!(arena_id = %arena, "match clock ran out");
                    if let Err(e) = w.arena_mut().stop() {
                        warn!(arena_id = %arena, error = %e, "failed to end match");
                    }
                }
            },
        );
        match clock {
            Ok(task) => debug!(arena_id = %arena, task_id = %task.id(), limit, "match clock started"),
            Err(e) => warn!(arena_id = %arena, error = %e, "match clock not scheduled"),
        }
    }

    fn info(&self) -> ArenaInfo {
        let arena = self.world.arena();
        ArenaInfo {
            arena_id: self.arena_id,
            name: arena.settings().name.clone(),
            running: arena.is_running(),
            session: arena.session().token,
            lobby: arena.count(ArenaRelation::Lobby),
            game: arena.count(ArenaRelation::Game),
            spectators: arena.count(ArenaRelation::Spectator),
            max_players: arena.settings().max_players,
            winner: arena.winner(),
            watching: self.monitor.is_watching(),
            pending_tasks: self.scheduler.pending(),
            tick: self.ticks.tick_count(),
        }
    }
}

/// Spawns a new arena actor task and returns a handle to communicate with it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_arena(
    arena_id: ArenaId,
    settings: ArenaSettings,
    channel_size: usize,
) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let ticks = TickSource::new(settings.tick_config());

    let actor = ArenaActor {
        arena_id,
        world: LocalWorld::new(LocalArena::new(arena_id, settings)),
        scheduler: SessionScheduler::new(),
        monitor: RegionMonitor::new(),
        effects: TaskBatch::new(),
        ticks,
        observers: Vec::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ArenaHandle {
        arena_id,
        sender: tx,
    }
}

impl ArenaHandle {
    /// Spawns a standalone arena outside any manager.
    pub fn spawn(arena_id: ArenaId, settings: ArenaSettings) -> Self {
        spawn_arena(arena_id, settings, crate::manager::DEFAULT_CHANNEL_SIZE)
    }
}

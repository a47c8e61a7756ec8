//! # Arenakit
//!
//! Session-scoped scheduling, region policing and team balancing for arena
//! minigames.
//!
//! An arena runs as its own actor. Inside it, a [`SessionScheduler`]
//! drives deferred and repeating work that dies with the match it was
//! created for, a [`RegionMonitor`] applies the arena's outsider and
//! out-of-bounds policies as players cross its bounds, and a
//! [`TeamDistributor`] keeps teams even.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arenakit::prelude::*;
//!
//! # async fn run() -> Result<(), ArenakitError> {
//! let mut arenas = ArenaManager::new();
//! let pit = arenas
//!     .create_arena(ArenaSettings {
//!         outsider_policy: OutsiderPolicy::Join,
//!         out_of_bounds_policy: OutOfBoundsPolicy::Lose,
//!         ..ArenaSettings::default()
//!     })
//!     .await?;
//! arenas.connect_player(PlayerId(1), Position::ORIGIN).await?;
//! arenas.join_arena(PlayerId(1), pit).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;

pub use error::ArenakitError;
pub use logging::init_tracing;

pub use arenakit_arena::{
    Arena, ArenaError, ArenaHandle, ArenaInfo, ArenaManager, ArenaSettings, ArenaWorld,
    BoundaryOutcome, EntryOutcome, EventReceiver, LeaveOutcome, LocalArena, LocalPlayer,
    LocalWorld, Member, Player, RecheckOutcome, RegionMonitor, TeamDistributor, recheck_entry,
    spawn,
};
pub use arenakit_tick::{
    ScheduledTask, SchedulerError, SessionClock, SessionScheduler, SessionSource, SessionState,
    SessionToken, TaskBatch, TaskId, TaskState, TickConfig, TickInfo, TickPolicy, TickSource,
    Ticks,
};
pub use arenakit_types::{
    AddPlayerReason, ArenaEvent, ArenaId, ArenaRelation, ArenaTeam, BoundaryDirection,
    BoundaryEvent, OutOfBoundsPolicy, OutsiderPolicy, PlayerId, Position, Region,
    RemovePlayerReason, SpawnKind, Spawnpoint,
};

pub mod prelude {
    pub use crate::{
        Arena, ArenaEvent, ArenaHandle, ArenaId, ArenaManager, ArenaRelation, ArenaSettings,
        ArenaTeam, ArenaWorld, ArenakitError, OutOfBoundsPolicy, OutsiderPolicy, Player,
        PlayerId, Position, Region, RegionMonitor, SessionScheduler, SessionState, TaskBatch,
        TeamDistributor,
    };
}

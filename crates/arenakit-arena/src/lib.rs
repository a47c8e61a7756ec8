//! Arena lifecycle management for Arenakit.
//!
//! An arena is a configured, repeatable match plus the state of its current
//! run. Each arena runs as an isolated Tokio task (actor model) owning its
//! world, its session scheduler, its region monitor and its tick loop.
//!
//! # Key types
//!
//! - [`Arena`], [`Player`], [`ArenaWorld`]: what the core needs from the
//!   host platform
//! - [`RegionMonitor`]: applies outsider and out-of-bounds policy when
//!   players cross the arena's bounds
//! - [`TeamDistributor`]: fair, least-used team assignment
//! - [`LocalArena`], [`LocalWorld`]: the in-process reference arena
//! - [`ArenaHandle`], [`ArenaManager`]: run and address arena actors
//! - [`ArenaSettings`]: per-arena configuration

mod actor;
mod config;
mod error;
mod local;
mod manager;
mod region;
pub mod spawn;
mod team;
mod world;

pub use actor::{ArenaHandle, ArenaInfo, EventReceiver};
pub use config::ArenaSettings;
pub use error::ArenaError;
pub use local::{LocalArena, LocalPlayer, LocalWorld, Member};
pub use manager::ArenaManager;
pub use region::{
    BoundaryOutcome, EntryOutcome, LeaveOutcome, OUTSIDER_KICK_MESSAGE, RecheckOutcome,
    RegionMonitor, recheck_entry,
};
pub use team::TeamDistributor;
pub use world::{Arena, ArenaWorld, Player};

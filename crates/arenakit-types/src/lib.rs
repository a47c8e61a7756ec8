//! Shared types for Arenakit.
//!
//! This crate defines the vocabulary every other layer speaks:
//!
//! - **Identity** ([`PlayerId`], [`ArenaId`]): who and where.
//! - **Geometry** ([`Position`], [`Region`]): the arena's spatial bounds.
//! - **Teams** ([`ArenaTeam`]): the fixed palette of team identities.
//! - **Policy** ([`OutsiderPolicy`], [`OutOfBoundsPolicy`],
//!   [`ArenaRelation`]): what happens when players cross the bounds.
//! - **Events** ([`BoundaryEvent`], [`ArenaEvent`]): transient
//!   notifications produced while an arena runs.
//!
//! # Architecture
//!
//! ```text
//! arenakit-types (this crate) → arenakit-tick → arenakit-arena → arenakit
//! ```
//!
//! Nothing here knows about scheduling or about how an arena is stored.

mod event;
mod geometry;
mod ids;
mod policy;
mod spawn;
mod team;

pub use event::{ArenaEvent, BoundaryDirection, BoundaryEvent};
pub use geometry::{Position, Region};
pub use ids::{ArenaId, PlayerId};
pub use policy::{
    AddPlayerReason, ArenaRelation, OutOfBoundsPolicy, OutsiderPolicy,
    RemovePlayerReason,
};
pub use spawn::{SpawnKind, Spawnpoint};
pub use team::ArenaTeam;

//! Tick source and session-scoped scheduling for Arenakit.
//!
//! Every arena run is a *session*. Work scheduled for an arena must never
//! outlive the session it was scheduled in, even when the arena stops and
//! immediately starts again on the same id. This crate provides:
//!
//! - [`TickSource`]: a fixed-rate tick loop (20 Hz by default) with
//!   overrun handling and pause/resume.
//! - [`SessionClock`]: mints one [`SessionToken`] per run and holds the
//!   running flag.
//! - [`SessionScheduler`]: delayed and repeating work keyed to ticks.
//!   Repeating work self-cancels once its birth session is gone.
//! - [`TaskBatch`]: an explicit kill switch for a family of tasks.
//!
//! # Integration
//!
//! The scheduler and the tick source sit inside an arena actor's
//! `tokio::select!` loop. The world passed to [`SessionScheduler::advance`]
//! is the same value the scheduled closures receive:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = ticks.wait_for_tick() => {
//!             scheduler.advance(&mut world);
//!             ticks.record_tick_end();
//!         }
//!     }
//! }
//! ```

mod batch;
mod clock;
mod error;
mod scheduler;
mod task;
mod ticker;

pub use batch::TaskBatch;
pub use clock::{SessionClock, SessionSource, SessionState, SessionToken};
pub use error::SchedulerError;
pub use scheduler::{SessionScheduler, Ticks};
pub use task::{ScheduledTask, TaskId, TaskState};
pub use ticker::{TickConfig, TickInfo, TickPolicy, TickSource};

//! Handles for scheduled work.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Lifecycle of a scheduled task.
///
/// ```text
/// Pending ──(first fire)──→ Active ──(session gone / cancel)──→ Cancelled
///    │                         (repeating only)
///    ├──(one-shot fires)──→ Completed
///    └──(cancel)──────────→ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Queued, has not fired yet.
    Pending,
    /// A repeating task that has fired at least once.
    Active,
    /// Will never fire again.
    Cancelled,
    /// A one-shot task that has fired.
    Completed,
}

impl TaskState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Active,
            2 => Self::Cancelled,
            _ => Self::Completed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Cancelled => 2,
            Self::Completed => 3,
        }
    }

    /// Returns `true` for `Cancelled` and `Completed`.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

#[derive(Debug)]
struct Shared {
    id: TaskId,
    state: AtomicU8,
}

/// A handle to one unit of scheduled work.
///
/// Cheap to clone; every clone observes and controls the same task. The
/// scheduler keeps one clone next to the queued closure and checks it right
/// before firing, so a cancel that lands before the due tick executes
/// always wins.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    shared: Arc<Shared>,
}

impl ScheduledTask {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                id: TaskId::next(),
                state: AtomicU8::new(TaskState::Pending.as_u8()),
            }),
        }
    }

    pub fn id(&self) -> TaskId {
        self.shared.id
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Returns `true` while the task may still fire.
    pub fn is_live(&self) -> bool {
        !self.state().is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Stops the task from ever firing again.
    ///
    /// Idempotent: cancelling a finished task does nothing. Returns `true`
    /// only for the call that actually cancelled it.
    pub fn cancel(&self) -> bool {
        self.transition(&[TaskState::Pending, TaskState::Active], TaskState::Cancelled)
    }

    pub(crate) fn mark_active(&self) -> bool {
        self.transition(&[TaskState::Pending, TaskState::Active], TaskState::Active)
    }

    pub(crate) fn mark_completed(&self) -> bool {
        self.transition(&[TaskState::Pending], TaskState::Completed)
    }

    fn transition(&self, from: &[TaskState], to: TaskState) -> bool {
        self.shared
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                from.contains(&TaskState::from_u8(raw)).then_some(to.as_u8())
            })
            .is_ok()
    }
}

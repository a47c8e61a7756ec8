//! A caller-owned kill switch for a family of tasks.

use std::collections::VecDeque;

use crate::{
    ScheduledTask, SchedulerError, SessionScheduler, SessionSource, SessionState, SessionToken,
    Ticks,
};

/// Insertion-ordered set of task handles that can be cancelled together.
///
/// This is an explicit cancellation on top of the scheduler's implicit
/// session check: an arena can drop all of a match's effects at once
/// without waiting for each repeating task to notice the session ended,
/// and one-shot tasks (which ignore the session) go away too.
#[derive(Debug, Default)]
pub struct TaskBatch {
    tasks: VecDeque<ScheduledTask>,
    /// Session that was live when the first task of this batch was added.
    bound_to: Option<SessionToken>,
}

impl TaskBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handle to the batch and hands it back.
    pub fn add(&mut self, task: ScheduledTask) -> ScheduledTask {
        self.tasks.push_back(task.clone());
        task
    }

    /// Schedules a one-shot task and records it.
    pub fn run_later<W, F>(
        &mut self,
        scheduler: &mut SessionScheduler<W>,
        delay: Ticks,
        work: F,
    ) -> Result<ScheduledTask, SchedulerError>
    where
        F: FnOnce(&mut W) + Send + 'static,
    {
        let task = scheduler.schedule_after(delay, work)?;
        Ok(self.add(task))
    }

    /// Schedules a repeating task and records it. The batch remembers the
    /// session so [`release_if_stale`](Self::release_if_stale) can tell
    /// when it ended.
    pub fn run_repeating<W, S, F>(
        &mut self,
        scheduler: &mut SessionScheduler<W>,
        source: &S,
        initial_delay: Ticks,
        interval: Ticks,
        work: F,
    ) -> Result<ScheduledTask, SchedulerError>
    where
        S: SessionSource + ?Sized,
        F: FnMut(&mut W) + Send + 'static,
    {
        let session = source.session();
        let task = scheduler.schedule_repeating(source, initial_delay, interval, work)?;
        if self.bound_to.is_none() && session.running {
            self.bound_to = session.token;
        }
        Ok(self.add(task))
    }

    /// Cancels every handle in insertion order, then empties the batch.
    ///
    /// Safe to call repeatedly.
    pub fn cancel_all(&mut self) {
        let count = self.tasks.len();
        while let Some(task) = self.tasks.pop_front() {
            task.cancel();
        }
        self.bound_to = None;
        if count > 0 {
            tracing::debug!(count, "task batch cancelled");
        }
    }

    /// Cancels the batch if the session it was filled under has stopped or
    /// been superseded. Returns `true` if it did.
    pub fn release_if_stale(&mut self, session: SessionState) -> bool {
        match self.bound_to {
            Some(token) if !session.is_current(token) => {
                self.cancel_all();
                true
            }
            _ => false,
        }
    }

    /// Drops handles of tasks that already finished.
    pub fn prune(&mut self) {
        self.tasks.retain(ScheduledTask::is_live);
    }

    /// Number of handles held, finished or not.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of held tasks that may still fire.
    pub fn live(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_live()).count()
    }
}

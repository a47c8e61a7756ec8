//! Session-scoped scheduling of delayed and repeating work.
//!
//! Time is counted in ticks. The scheduler never sleeps on its own; the
//! owner calls [`SessionScheduler::advance`] once per tick (normally from a
//! [`TickSource`](crate::TickSource) loop) and due work runs inline on that
//! call, with exclusive access to the world value.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{ScheduledTask, SchedulerError, SessionSource, SessionToken};

/// A signed tick count. Signed so a negative request can be rejected
/// instead of wrapping.
pub type Ticks = i64;

type OnceWork<W> = Box<dyn FnOnce(&mut W) + Send>;
type RepeatWork<W> = Box<dyn FnMut(&mut W) + Send>;

enum Work<W> {
    Once(OnceWork<W>),
    Repeating {
        work: RepeatWork<W>,
        interval: u64,
        /// The session the task was created in. The task dies with it.
        birth: SessionToken,
    },
}

struct Job<W> {
    task: ScheduledTask,
    work: Work<W>,
}

/// Schedules work against one arena's sessions.
///
/// `W` is the world handed to every closure at fire time. Closures should
/// capture ids, not references, and look live state up through `W`; the
/// borrow checker enforces this since `W` is only lent during `advance`.
///
/// Two kinds of work:
///
/// - [`schedule_after`](Self::schedule_after) fires once, whether or not
///   the arena is running at that point.
/// - [`schedule_repeating`](Self::schedule_repeating) fires every interval
///   for as long as the session it was created in is still running. Before
///   each run the scheduler takes a fresh [`SessionState`](crate::SessionState) from the world;
///   if the arena stopped, or a new session started (even on the same
///   arena within one tick), the task cancels itself without running.
pub struct SessionScheduler<W> {
    now: u64,
    seq: u64,
    /// Keyed by `(due tick, insertion order)` so equal due ticks fire in
    /// scheduling order.
    queue: BTreeMap<(u64, u64), Job<W>>,
}

impl<W> SessionScheduler<W> {
    pub fn new() -> Self {
        Self {
            now: 0,
            seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Ticks elapsed since the scheduler was created.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Runs `work` once after `delay` ticks.
    ///
    /// A delay of 0 runs on the next [`advance`](Self::advance).
    ///
    /// # Errors
    /// [`SchedulerError::InvalidArgument`] if `delay` is negative. Nothing
    /// is queued in that case.
    pub fn schedule_after<F>(
        &mut self,
        delay: Ticks,
        work: F,
    ) -> Result<ScheduledTask, SchedulerError>
    where
        F: FnOnce(&mut W) + Send + 'static,
    {
        let delay = non_negative("delay", delay)?;
        let task = ScheduledTask::new();
        self.enqueue(
            delay,
            Job {
                task: task.clone(),
                work: Work::Once(Box::new(work)),
            },
        );
        trace!(task_id = %task.id(), delay, "one-shot task scheduled");
        Ok(task)
    }

    /// Runs `work` after `initial_delay` ticks, then every `interval` ticks,
    /// while the session currently reported by `source` keeps running.
    ///
    /// The session is read from `source` during this call. If it is not
    /// running the returned task is already cancelled and never fires. An
    /// interval of 0 repeats every tick.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidArgument`] if either argument is negative.
    pub fn schedule_repeating<S, F>(
        &mut self,
        source: &S,
        initial_delay: Ticks,
        interval: Ticks,
        work: F,
    ) -> Result<ScheduledTask, SchedulerError>
    where
        S: SessionSource + ?Sized,
        F: FnMut(&mut W) + Send + 'static,
    {
        let initial_delay = non_negative("initial delay", initial_delay)?;
        let interval = non_negative("interval", interval)?;
        let task = ScheduledTask::new();

        let session = source.session();
        let birth = match session.token {
            Some(token) if session.running => token,
            _ => {
                task.cancel();
                trace!(task_id = %task.id(), "repeating task created while stopped");
                return Ok(task);
            }
        };

        self.enqueue(
            initial_delay,
            Job {
                task: task.clone(),
                work: Work::Repeating {
                    work: Box::new(work),
                    interval: interval.max(1),
                    birth,
                },
            },
        );
        trace!(
            task_id = %task.id(),
            initial_delay,
            interval,
            session = %birth,
            "repeating task scheduled"
        );
        Ok(task)
    }

    /// Number of queued tasks that may still fire.
    pub fn pending(&self) -> usize {
        self.queue.values().filter(|job| job.task.is_live()).count()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Cancels and drops every queued task.
    pub fn cancel_all(&mut self) {
        for job in self.queue.values() {
            job.task.cancel();
        }
        self.queue.clear();
    }

    fn enqueue(&mut self, delay: u64, job: Job<W>) {
        let due = self.now + delay.max(1);
        self.seq += 1;
        self.queue.insert((due, self.seq), job);
    }
}

impl<W: SessionSource> SessionScheduler<W> {
    /// Moves time forward one tick and runs everything that is due.
    ///
    /// Returns how many task bodies ran. A slow body stalls the whole tick,
    /// so keep closures short.
    pub fn advance(&mut self, world: &mut W) -> usize {
        self.now += 1;
        let mut ran = 0;

        loop {
            let due = match self.queue.first_key_value() {
                Some((&(due, _), _)) => due,
                None => break,
            };
            if due > self.now {
                break;
            }
            let Some((_, job)) = self.queue.pop_first() else {
                break;
            };
            if self.run_job(job, world) {
                ran += 1;
            }
        }

        ran
    }

    fn run_job(&mut self, job: Job<W>, world: &mut W) -> bool {
        let Job { task, work } = job;

        match work {
            Work::Once(work) => {
                if !task.mark_completed() {
                    return false;
                }
                trace!(task_id = %task.id(), tick = self.now, "one-shot task fired");
                work(world);
                true
            }
            Work::Repeating {
                mut work,
                interval,
                birth,
            } => {
                if !task.is_live() {
                    return false;
                }
                if !world.session().is_current(birth) {
                    // The session this task belonged to is over.
                    task.cancel();
                    trace!(task_id = %task.id(), session = %birth, "stale session, task dropped");
                    return false;
                }
                if !task.mark_active() {
                    return false;
                }
                work(world);
                if task.is_live() {
                    self.enqueue(
                        interval,
                        Job {
                            task,
                            work: Work::Repeating {
                                work,
                                interval,
                                birth,
                            },
                        },
                    );
                }
                true
            }
        }
    }
}

impl<W> Default for SessionScheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(what: &str, value: Ticks) -> Result<u64, SchedulerError> {
    u64::try_from(value).map_err(|_| {
        SchedulerError::InvalidArgument(format!("{what} must be non-negative, got {value}"))
    })
}

//! Fixed-rate tick source.
//!
//! Drives a [`SessionScheduler`](crate::SessionScheduler) at the host's
//! tick rate. Arenas default to 20 Hz, so a delay of 20 ticks is one
//! second of wall-clock time.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop wakes up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence; the next tick fires at its planned time.
    Drop,
}

/// Configuration for a [`TickSource`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) after which a slow tick is
    /// reported with a warning.
    pub budget_warn_threshold: f64,
    /// Random offset (0–max µs) applied to the first tick so arenas
    /// created together don't all tick on the same instant.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_RATE_HZ,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const DEFAULT_RATE_HZ: u32 = 20;
    pub const MAX_RATE_HZ: u32 = 100;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values.
    ///
    /// - `tick_rate_hz` is forced into `1..=MAX_RATE_HZ`.
    /// - `budget_warn_threshold` is clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                clamped, "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Wall-clock length of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`TickSource::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// `true` if the loop woke up more than 10% of a tick late.
    pub overrun: bool,
    /// Ticks that were not delivered because of the overrun.
    pub skipped: u64,
}

// ---------------------------------------------------------------------------
// TickSource
// ---------------------------------------------------------------------------

/// A fixed-rate tick loop for one arena actor.
pub struct TickSource {
    config: TickConfig,
    period: Duration,
    ticks: u64,
    overruns: u64,
    next_at: TokioInstant,
    /// Set when a tick is delivered, consumed by `record_tick_end`.
    started: Option<Instant>,
    paused: bool,
}

impl TickSource {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            period_ms = period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick source created"
        );

        Self {
            next_at: TokioInstant::now() + period + jitter,
            config,
            period,
            ticks: 0,
            overruns: 0,
            started: None,
            paused: false,
        }
    }

    /// Waits for the next tick.
    ///
    /// While paused this future never resolves, which lets it sit in a
    /// `tokio::select!` next to a command channel.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let planned = self.next_at;
        time::sleep_until(planned).await;

        let now = TokioInstant::now();
        self.ticks += 1;
        self.started = Some(Instant::now());

        let late_by = now.saturating_duration_since(planned);
        let overrun = late_by > self.period / 10;
        let mut skipped = 0;

        if overrun {
            self.overruns += 1;
            skipped = (late_by.as_nanos() / self.period.as_nanos().max(1)) as u64;
        }

        self.next_at = match self.config.policy {
            TickPolicy::Skip => {
                if skipped > 0 {
                    warn!(
                        tick = self.ticks,
                        skipped,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, skipping ahead"
                    );
                }
                now + self.period
            }
            TickPolicy::Drop => planned + self.period,
        };

        trace!(tick = self.ticks, overrun, "tick");

        TickInfo {
            tick: self.ticks,
            overrun,
            skipped,
        }
    }

    /// Reports that the work for the current tick is done.
    ///
    /// Emits a warning when the work used more than the configured share of
    /// the tick budget. Calling it without a preceding tick is a no-op.
    pub fn record_tick_end(&mut self) -> Option<Duration> {
        let started = self.started.take()?;
        let elapsed = started.elapsed();
        let utilization = elapsed.as_secs_f64() / self.period.as_secs_f64();

        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.ticks,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.period.as_secs_f64() * 1000.0,
                "tick work is close to or over budget"
            );
        }
        Some(elapsed)
    }

    /// Stops delivering ticks. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.ticks, "tick source paused");
        }
    }

    /// Resumes delivery one period from now, so the pause doesn't produce
    /// a burst of late ticks.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_at = TokioInstant::now() + self.period;
            debug!(tick = self.ticks, "tick source resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

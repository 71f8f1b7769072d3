//! Tick scheduler that advances every running timer

use super::game_timer::{GameTimer, TimerShared};
use super::TimeUnit;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Monotonic tick source shared by all timers of a game.
///
/// The scheduler only keeps weak references to timers; a timer whose last handle was
/// dropped is pruned on the next tick and never fires again.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    tick: AtomicU64,
    ticks_per_second: u32,
    timers: Mutex<Vec<Weak<TimerShared>>>,
}

impl Scheduler {
    /// Vanilla server tick rate
    pub const DEFAULT_TICKS_PER_SECOND: u32 = 20;

    /// Create a scheduler running at the default tick rate
    pub fn new() -> Self {
        Self::with_tick_rate(Self::DEFAULT_TICKS_PER_SECOND)
    }

    /// Create a scheduler with a custom tick rate (at least one tick per second)
    pub fn with_tick_rate(ticks_per_second: u32) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                tick: AtomicU64::new(0),
                ticks_per_second: ticks_per_second.max(1),
                timers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Number of ticks elapsed since the scheduler was created
    pub fn current_tick(&self) -> u64 {
        self.inner.tick.load(Ordering::SeqCst)
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.inner.ticks_per_second
    }

    /// Convert an amount of `unit` into ticks at this scheduler's rate
    pub fn to_ticks(&self, unit: TimeUnit, amount: u32) -> u32 {
        unit.to_ticks(amount, self.inner.ticks_per_second)
    }

    /// Convert a tick count into seconds at this scheduler's rate
    pub fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        ticks as f64 / f64::from(self.inner.ticks_per_second)
    }

    /// Number of timers currently tracked (running, or stopped since the last tick)
    pub fn tracked_timers(&self) -> usize {
        self.inner.timers.lock().len()
    }

    /// Advance the clock by one tick and run every due timer callback.
    ///
    /// Timers started while this tick is being processed begin counting on the next tick.
    pub fn tick(&self) {
        let now = self.inner.tick.fetch_add(1, Ordering::SeqCst) + 1;

        // Callbacks may start new timers, so the list must not stay locked while they run.
        // Working from a copy leaves the schedule intact if a callback panics.
        let due = self.inner.timers.lock().clone();
        for weak in &due {
            if let Some(shared) = weak.upgrade() {
                GameTimer::from_shared(shared).advance(now);
            }
        }

        self.inner.timers.lock().retain(|weak| match weak.upgrade() {
            Some(shared) => GameTimer::from_shared(shared).retain_schedule(),
            None => false,
        });
    }

    /// Run `ticks` consecutive ticks
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub(crate) fn schedule(&self, timer: Weak<TimerShared>) {
        self.inner.timers.lock().push(timer);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick", &self.current_tick())
            .field("ticks_per_second", &self.inner.ticks_per_second)
            .field("tracked_timers", &self.tracked_timers())
            .finish()
    }
}

/// Drives a [`Scheduler`] in real time on a tokio runtime.
///
/// Missed ticks are replayed in a burst so the tick counter never skips.
pub struct TickDriver {
    scheduler: Scheduler,
    period: Duration,
}

impl TickDriver {
    pub fn new(scheduler: Scheduler) -> Self {
        let period = Duration::from_secs(1) / scheduler.ticks_per_second();
        Self { scheduler, period }
    }

    /// Real-time length of one tick
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `shutdown` is cancelled. Returns the number of ticks driven.
    pub async fn run(self, shutdown: CancellationToken) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;

        tracing::debug!(
            "Tick driver started at {} ticks per second",
            self.scheduler.ticks_per_second()
        );

        let mut driven = 0u64;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.scheduler.tick();
                    driven += 1;
                }
            }
        }

        tracing::debug!("Tick driver stopped after {} ticks", driven);
        driven
    }
}

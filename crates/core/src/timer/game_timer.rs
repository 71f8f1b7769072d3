//! Base timer primitive with explicit start, process, end and silent-end hooks

use super::{ScheduledTimer, Scheduler, TaskType, TimeUnit};
use crate::error::TimerError;
use parking_lot::Mutex;
use std::sync::Arc;

type Hook = Box<dyn FnMut() + Send>;
type ProcessHook = Box<dyn FnMut(u32) + Send>;

/// A scheduled callback state machine.
///
/// `GameTimer` is a cheap handle; clones share the same timer. Hooks run on the thread that
/// drives the [`Scheduler`] (or, for `on_start` and interrupted ends, the thread calling
/// `start()`/`stop()`), never concurrently with each other.
///
/// Lifecycle of one run:
///
/// 1. `start()` moves the timer to running and calls `on_start` synchronously.
/// 2. Every period, `on_process` receives the current count.
/// 3. When the maximum count is reached the timer becomes idle and calls `on_end`.
///    If `stop()` ends the run first, `on_silent_end` is called instead.
/// 4. A timer chained with [`GameTimer::then`] is started after either end hook.
#[derive(Clone)]
pub struct GameTimer {
    shared: Arc<TimerShared>,
}

pub(crate) struct TimerShared {
    core: Mutex<TimerCore>,
    hooks: Mutex<TimerHooks>,
    scheduler: Scheduler,
}

struct TimerCore {
    task: TaskType,
    maximum: u32,
    period: u32,
    running: bool,
    count: u32,
    countdown: u32,
    started_at: u64,
    firing: bool,
    interrupt_pending: bool,
    scheduled: bool,
    then: Option<GameTimer>,
}

impl TimerCore {
    fn is_exhausted(&self) -> bool {
        self.task != TaskType::Infinite && self.count >= self.maximum
    }

    fn display_count(&self) -> u32 {
        match self.task {
            TaskType::Reverse => self.maximum.saturating_sub(self.count) + 1,
            TaskType::Normal | TaskType::Infinite => self.count,
        }
    }
}

#[derive(Default)]
struct TimerHooks {
    on_start: Option<Hook>,
    on_process: Option<ProcessHook>,
    on_end: Option<Hook>,
    on_silent_end: Option<Hook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndPath {
    Completed,
    Interrupted,
}

impl GameTimer {
    /// Create an idle timer. The period defaults to one second.
    ///
    /// `maximum` is the number of invocations for `Normal` and `Reverse` timers and is
    /// ignored for `Infinite` ones.
    pub fn new(scheduler: &Scheduler, task: TaskType, maximum: u32) -> Self {
        let period = scheduler.to_ticks(TimeUnit::Seconds, 1);
        Self {
            shared: Arc::new(TimerShared {
                core: Mutex::new(TimerCore {
                    task,
                    maximum,
                    period,
                    running: false,
                    count: 0,
                    countdown: period,
                    started_at: 0,
                    firing: false,
                    interrupt_pending: false,
                    scheduled: false,
                    then: None,
                }),
                hooks: Mutex::new(TimerHooks::default()),
                scheduler: scheduler.clone(),
            }),
        }
    }

    /// Create a timer that runs until stopped
    pub fn infinite(scheduler: &Scheduler) -> Self {
        Self::new(scheduler, TaskType::Infinite, 0)
    }

    pub(crate) fn from_shared(shared: Arc<TimerShared>) -> Self {
        Self { shared }
    }

    /// Set the period between invocations. Takes effect on the next `start()`.
    pub fn with_period(self, unit: TimeUnit, amount: u32) -> Self {
        let ticks = self.shared.scheduler.to_ticks(unit, amount).max(1);
        self.shared.core.lock().period = ticks;
        self
    }

    pub fn on_start(self, hook: impl FnMut() + Send + 'static) -> Self {
        self.shared.hooks.lock().on_start = Some(Box::new(hook));
        self
    }

    pub fn on_process(self, hook: impl FnMut(u32) + Send + 'static) -> Self {
        self.shared.hooks.lock().on_process = Some(Box::new(hook));
        self
    }

    pub fn on_end(self, hook: impl FnMut() + Send + 'static) -> Self {
        self.shared.hooks.lock().on_end = Some(Box::new(hook));
        self
    }

    pub fn on_silent_end(self, hook: impl FnMut() + Send + 'static) -> Self {
        self.shared.hooks.lock().on_silent_end = Some(Box::new(hook));
        self
    }

    /// Start `next` whenever a run of this timer ends, by either path
    pub fn then(self, next: GameTimer) -> Self {
        self.shared.core.lock().then = Some(next);
        self
    }

    /// Start a new run.
    ///
    /// Fails with [`TimerError::DoubleStart`] if the timer is already running, and with
    /// [`TimerError::Stopping`] if it was stopped from inside its own start or process hook
    /// that has not returned yet.
    pub fn start(&self) -> Result<(), TimerError> {
        let now = self.shared.scheduler.current_tick();
        let (needs_schedule, empty) = {
            let mut core = self.shared.core.lock();
            if core.interrupt_pending {
                return Err(TimerError::Stopping);
            }
            if core.running {
                return Err(TimerError::DoubleStart);
            }
            core.running = true;
            core.count = 0;
            core.countdown = core.period;
            core.started_at = now;
            core.firing = true;
            let needs_schedule = !core.scheduled;
            core.scheduled = true;
            (needs_schedule, core.is_exhausted())
        };

        if needs_schedule {
            self.shared.scheduler.schedule(Arc::downgrade(&self.shared));
        }

        self.fire(|hooks| &mut hooks.on_start);

        let outcome = {
            let mut core = self.shared.core.lock();
            core.firing = false;
            if core.interrupt_pending {
                core.interrupt_pending = false;
                Some(EndPath::Interrupted)
            } else if empty && core.running {
                // A zero-length run completes as soon as it starts.
                core.running = false;
                Some(EndPath::Completed)
            } else {
                None
            }
        };

        if let Some(path) = outcome {
            self.finish(path);
        }

        Ok(())
    }

    /// Interrupt the current run. Idempotent; returns false if the timer was not running.
    ///
    /// When called from inside this timer's own start or process hook, the hook completes
    /// first and the silent end runs right after it returns.
    pub fn stop(&self) -> bool {
        let fire_now = {
            let mut core = self.shared.core.lock();
            if !core.running {
                return false;
            }
            core.running = false;
            if core.firing {
                core.interrupt_pending = true;
                false
            } else {
                true
            }
        };

        if fire_now {
            self.finish(EndPath::Interrupted);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.shared.core.lock().running
    }

    /// Invocations performed in the current (or last) run
    pub fn count(&self) -> u32 {
        self.shared.core.lock().count
    }

    pub fn maximum(&self) -> u32 {
        self.shared.core.lock().maximum
    }

    /// Invocations left before the run completes; zero for idle or infinite timers
    pub fn remaining(&self) -> u32 {
        let core = self.shared.core.lock();
        if !core.running || core.task == TaskType::Infinite {
            return 0;
        }
        core.maximum.saturating_sub(core.count)
    }

    pub fn period_ticks(&self) -> u32 {
        self.shared.core.lock().period
    }

    pub fn task(&self) -> TaskType {
        self.shared.core.lock().task
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.shared.scheduler
    }

    /// Whether two handles refer to the same timer
    pub fn same_timer(&self, other: &GameTimer) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Called by the scheduler once per tick
    pub(crate) fn advance(&self, now: u64) {
        let (count, finished) = {
            let mut core = self.shared.core.lock();
            if !core.running || core.started_at >= now {
                return;
            }
            core.countdown = core.countdown.saturating_sub(1);
            if core.countdown > 0 {
                return;
            }
            core.countdown = core.period;
            core.count += 1;
            core.firing = true;
            (core.display_count(), core.is_exhausted())
        };

        self.fire_process(count);

        let outcome = {
            let mut core = self.shared.core.lock();
            core.firing = false;
            if core.interrupt_pending {
                core.interrupt_pending = false;
                Some(EndPath::Interrupted)
            } else if finished && core.running {
                core.running = false;
                Some(EndPath::Completed)
            } else {
                None
            }
        };

        if let Some(path) = outcome {
            self.finish(path);
        }
    }

    /// Whether the scheduler should keep tracking this timer after a tick
    pub(crate) fn retain_schedule(&self) -> bool {
        let mut core = self.shared.core.lock();
        if core.running {
            true
        } else {
            core.scheduled = false;
            false
        }
    }

    fn finish(&self, path: EndPath) {
        match path {
            EndPath::Completed => self.fire(|hooks| &mut hooks.on_end),
            EndPath::Interrupted => self.fire(|hooks| &mut hooks.on_silent_end),
        }

        let next = self.shared.core.lock().then.clone();
        if let Some(next) = next {
            if let Err(e) = next.start() {
                tracing::warn!("Chained timer could not start after {:?} run: {}", path, e);
            }
        }
    }

    // Hooks are taken out of their slot while they run so that a hook may call back into
    // this timer without deadlocking.
    fn fire(&self, slot: fn(&mut TimerHooks) -> &mut Option<Hook>) {
        let hook = slot(&mut self.shared.hooks.lock()).take();
        if let Some(mut hook) = hook {
            hook();
            let mut hooks = self.shared.hooks.lock();
            let slot = slot(&mut hooks);
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }

    fn fire_process(&self, count: u32) {
        let hook = self.shared.hooks.lock().on_process.take();
        if let Some(mut hook) = hook {
            hook(count);
            let mut hooks = self.shared.hooks.lock();
            if hooks.on_process.is_none() {
                hooks.on_process = Some(hook);
            }
        }
    }
}

impl ScheduledTimer for GameTimer {
    fn is_active(&self) -> bool {
        self.is_running()
    }

    fn force_stop(&self) -> bool {
        self.stop()
    }
}

impl std::fmt::Debug for GameTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.lock();
        f.debug_struct("GameTimer")
            .field("task", &core.task)
            .field("maximum", &core.maximum)
            .field("period", &core.period)
            .field("running", &core.running)
            .field("count", &core.count)
            .finish()
    }
}

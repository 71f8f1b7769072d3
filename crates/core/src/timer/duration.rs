//! Duration timer: an active effect window with a start/process/end narrative

use super::{CooldownTimer, GameTimer, ScheduledTimer, Scheduler, TaskType, TimeUnit};
use crate::error::TimerError;

/// Timer with two states, idle and running, for abilities with a timed effect.
///
/// `on_duration_process` receives the elapsed count (1 up to `duration`). A run that reaches
/// its duration calls `on_duration_end`; a run cut short by `stop()` calls
/// `on_duration_silent_end` instead. Both paths must release whatever `on_duration_start`
/// acquired. The linked cooldown, if any, starts after either path.
#[derive(Clone, Debug)]
pub struct DurationTimer {
    timer: GameTimer,
    cooldown: Option<CooldownTimer>,
}

impl DurationTimer {
    pub fn new(scheduler: &Scheduler, duration: u32, cooldown: Option<&CooldownTimer>) -> Self {
        let mut timer = GameTimer::new(scheduler, TaskType::Normal, duration);
        if let Some(cooldown) = cooldown {
            timer = timer.then(cooldown.timer().clone());
        }
        Self {
            timer,
            cooldown: cooldown.cloned(),
        }
    }

    pub fn with_period(self, unit: TimeUnit, amount: u32) -> Self {
        Self {
            timer: self.timer.with_period(unit, amount),
            ..self
        }
    }

    pub fn on_duration_start(self, hook: impl FnMut() + Send + 'static) -> Self {
        Self {
            timer: self.timer.on_start(hook),
            ..self
        }
    }

    pub fn on_duration_process(self, hook: impl FnMut(u32) + Send + 'static) -> Self {
        Self {
            timer: self.timer.on_process(hook),
            ..self
        }
    }

    pub fn on_duration_end(self, hook: impl FnMut() + Send + 'static) -> Self {
        Self {
            timer: self.timer.on_end(hook),
            ..self
        }
    }

    pub fn on_duration_silent_end(self, hook: impl FnMut() + Send + 'static) -> Self {
        Self {
            timer: self.timer.on_silent_end(hook),
            ..self
        }
    }

    /// Open the effect window; `on_duration_start` runs before this returns
    pub fn start(&self) -> Result<(), TimerError> {
        self.timer.start()
    }

    /// Close the effect window early through the silent end
    pub fn stop(&self) -> bool {
        self.timer.stop()
    }

    pub fn is_duration(&self) -> bool {
        self.timer.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed(&self) -> u32 {
        self.timer.count()
    }

    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn duration(&self) -> u32 {
        self.timer.maximum()
    }

    pub fn cooldown(&self) -> Option<&CooldownTimer> {
        self.cooldown.as_ref()
    }
}

impl ScheduledTimer for DurationTimer {
    fn is_active(&self) -> bool {
        self.is_duration()
    }

    fn force_stop(&self) -> bool {
        self.stop()
    }
}

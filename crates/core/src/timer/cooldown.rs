//! Cooldown timer: the refractory window after an ability fired

use super::{GameTimer, ScheduledTimer, Scheduler, TaskType, TimeUnit};
use crate::error::TimerError;
use crate::settings::format_cooldown;

/// Timer with two states, idle and cooling down.
///
/// A cooldown runs for `duration` periods (one second each by default) and then reverts to
/// idle on its own. It cannot be cancelled early; only the owning ability's destruction
/// stops it, through [`ScheduledTimer::force_stop`].
#[derive(Clone, Debug)]
pub struct CooldownTimer {
    timer: GameTimer,
}

impl CooldownTimer {
    pub fn new(scheduler: &Scheduler, duration: u32) -> Self {
        Self {
            timer: GameTimer::new(scheduler, TaskType::Reverse, duration),
        }
    }

    pub fn with_period(self, unit: TimeUnit, amount: u32) -> Self {
        Self {
            timer: self.timer.with_period(unit, amount),
        }
    }

    /// Enter the cooldown state
    pub fn start(&self) -> Result<(), TimerError> {
        self.timer.start()
    }

    pub fn is_cooldown(&self) -> bool {
        self.timer.is_running()
    }

    /// Periods left until the cooldown is over
    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn duration(&self) -> u32 {
        self.timer.maximum()
    }

    /// Message shown to a participant who tries to use the ability while it cools down
    pub fn status_message(&self) -> Option<String> {
        if self.is_cooldown() {
            Some(format_cooldown(i64::from(self.remaining())))
        } else {
            None
        }
    }

    pub(crate) fn timer(&self) -> &GameTimer {
        &self.timer
    }
}

impl ScheduledTimer for CooldownTimer {
    fn is_active(&self) -> bool {
        self.is_cooldown()
    }

    fn force_stop(&self) -> bool {
        self.timer.stop()
    }
}

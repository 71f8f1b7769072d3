//! Timer engine for abilities and game modes
//!
//! Every timer is driven by a [`Scheduler`], the single cooperative tick source of a game.
//! Timers never block: they are state machines that the scheduler advances once per tick,
//! invoking their lifecycle hooks along the way.
//!
//! - [`GameTimer`] is the base primitive with four hook slots (start, process, end,
//!   silent end) and a configurable period.
//! - [`CooldownTimer`] models the refractory window after an ability was used.
//! - [`DurationTimer`] models an active effect window and can drive a linked cooldown when
//!   the window closes.

pub mod scheduler;
pub mod game_timer;
pub mod cooldown;
pub mod duration;

pub use scheduler::{Scheduler, TickDriver};
pub use game_timer::GameTimer;
pub use cooldown::CooldownTimer;
pub use duration::DurationTimer;

use serde::{Deserialize, Serialize};

/// Units a timer period can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Ticks,
    Seconds,
    Minutes,
}

impl TimeUnit {
    /// Convert an amount of this unit into game ticks
    pub fn to_ticks(self, amount: u32, ticks_per_second: u32) -> u32 {
        match self {
            Self::Ticks => amount,
            Self::Seconds => amount.saturating_mul(ticks_per_second),
            Self::Minutes => amount.saturating_mul(ticks_per_second).saturating_mul(60),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ticks => write!(f, "ticks"),
            Self::Seconds => write!(f, "seconds"),
            Self::Minutes => write!(f, "minutes"),
        }
    }
}

/// How a timer counts its invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Counts up from 1 and ends after the maximum count
    Normal,
    /// Counts down from the maximum count to 1, then ends
    Reverse,
    /// Counts up forever; only `stop()` ends it
    Infinite,
}

/// A timer that belongs to an ability instance.
///
/// Ability instances hand these out for bulk cancellation when the instance is destroyed.
pub trait ScheduledTimer: Send + Sync {
    /// Whether the timer currently occupies its active state
    fn is_active(&self) -> bool;

    /// Stop the timer through its interrupted path. Returns false if it was not active.
    fn force_stop(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_conversion() {
        assert_eq!(TimeUnit::Ticks.to_ticks(7, 20), 7);
        assert_eq!(TimeUnit::Seconds.to_ticks(3, 20), 60);
        assert_eq!(TimeUnit::Minutes.to_ticks(2, 20), 2400);
        assert_eq!(TimeUnit::Seconds.to_ticks(u32::MAX, 20), u32::MAX);
    }
}

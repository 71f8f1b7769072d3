//! Core runtime for Skirmish minigames
//!
//! This crate provides the ability registry, the tick-driven timer engine and the event
//! dispatcher that every Skirmish game mode builds on. Abilities are registered once at
//! startup, instantiated per participant, and torn down with all of their timers when a
//! participant's ability changes or the game ends.

pub mod ability;
pub mod event;
pub mod timer;
pub mod settings;
pub mod config;
pub mod logging;
pub mod error;

// Re-export commonly used types
pub use ability::{
    Ability, AbilityInstance, AbilityKind, AbilityManifest, AbilityRegistry, AbilitySeat, AbilityType,
    CapabilityFlags, Descriptor, Participant, Rank, Registration, Species, Support,
};
pub use config::CoreConfig;
pub use error::{ConfigError, RegistrationError, RegistryError, SettingError, TimerError};
pub use event::{Event, EventDispatcher};
pub use settings::{Setting, SettingObject};
pub use timer::{CooldownTimer, DurationTimer, GameTimer, ScheduledTimer, Scheduler, TickDriver};

use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Current version of the Skirmish core
pub const SKIRMISH_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the ability registry for `config`: register every kind, then bind the configured
/// setting overrides.
pub fn init_ability_system(
    config: &CoreConfig,
    kinds: impl IntoIterator<Item = AbilityKind>,
) -> AbilityRegistry {
    let mut registry = config.registry();
    let report = registry.register_all(kinds);
    if !report.is_clean() {
        tracing::warn!("{} ability types were rejected", report.failed.len());
    }

    registry.apply_settings(&config.abilities);
    info!(
        "Ability system ready on server {} with {} abilities",
        registry.server_version(),
        registry.len()
    );
    registry
}

/// Load configuration from `path` and build the ability registry from it
pub fn load_ability_system<P: AsRef<Path>>(
    path: P,
    kinds: impl IntoIterator<Item = AbilityKind>,
) -> anyhow::Result<(CoreConfig, AbilityRegistry)> {
    let path = path.as_ref();
    let config = CoreConfig::load_from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    let registry = init_ability_system(&config, kinds);
    Ok((config, registry))
}

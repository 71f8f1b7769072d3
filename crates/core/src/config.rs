//! Core configuration for a Skirmish server
//!
//! ```toml
//! [server]
//! version = "1.16.5"
//! ticks_per_second = 20
//!
//! [logging]
//! level = "info"
//! json = false
//! ansi = true
//!
//! [abilities.Celebrity]
//! Cooldown = 40
//! ```

use crate::ability::AbilityRegistry;
use crate::error::ConfigError;
use crate::settings::AbilitySettings;
use crate::timer::Scheduler;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub server: ServerSettings,
    pub logging: LoggingConfig,
    pub abilities: AbilitySettings,
}

/// Facts about the running server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Version ability types are gated against
    pub version: Version,
    pub ticks_per_second: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    pub json: bool,
    pub ansi: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            version: Version::new(1, 16, 5),
            ticks_per_second: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            ansi: true,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LoggingConfig::default(),
            abilities: AbilitySettings::default(),
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be at least 1".to_string()));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging level cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Scheduler ticking at the configured rate
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::with_tick_rate(self.server.ticks_per_second)
    }

    /// Empty registry gated on the configured server version
    pub fn registry(&self) -> AbilityRegistry {
        AbilityRegistry::new(self.server.version.clone())
    }
}

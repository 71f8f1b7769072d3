//! Error types for the skirmish core crate

use thiserror::Error;

/// Reasons a single ability type failed to register.
///
/// None of these abort a batch registration; the registry logs them and moves on to the
/// next type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("ability {ability} is malformed: {reason}")]
    Malformed { ability: &'static str, reason: String },

    #[error("ability {ability} uses the name '{name}' which already belongs to {existing}")]
    NameCollision {
        ability: &'static str,
        name: String,
        existing: &'static str,
    },

    #[error("ability {ability} requires server {required} but the server runs {running}")]
    UnsupportedVersion {
        ability: &'static str,
        required: semver::Version,
        running: semver::Version,
    },
}

impl RegistrationError {
    pub(crate) fn malformed(ability: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            ability,
            reason: reason.into(),
        }
    }
}

/// Errors raised when consumers ask the registry for something it does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("ability {0} is not registered")]
    NotRegistered(&'static str),
}

/// Timer misuse surfaced to the ability that owns the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer is already running")]
    DoubleStart,

    #[error("timer was stopped inside its own callback and has not finished stopping")]
    Stopping,
}

/// Errors produced while binding configuration values to setting objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("setting '{key}' expects a {expected} value: {message}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
        message: String,
    },

    #[error("setting '{key}' rejected value {value}")]
    Rejected { key: &'static str, value: String },
}

/// Configuration loading and logging setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RegistrationError::malformed("demo::Ghost", "missing manifest");
        assert_eq!(error.to_string(), "ability demo::Ghost is malformed: missing manifest");

        let error = RegistryError::NotRegistered("demo::Ghost");
        assert_eq!(error.to_string(), "ability demo::Ghost is not registered");
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_error = ConfigError::from(io_error);

        assert!(matches!(config_error, ConfigError::Io(_)));
        assert!(config_error.to_string().contains("file not found"));
    }

    #[test]
    fn test_version_error_mentions_both_versions() {
        let error = RegistrationError::UnsupportedVersion {
            ability: "demo::Sniper",
            required: semver::Version::new(1, 13, 0),
            running: semver::Version::new(1, 12, 2),
        };
        let message = error.to_string();
        assert!(message.contains("1.13.0"));
        assert!(message.contains("1.12.2"));
    }
}

//! Configurable ability settings
//!
//! Abilities keep their tunables in `static` [`SettingObject`]s and list them in their
//! descriptor. The registry collects them per ability so a configuration file can override
//! them at startup, and so manifest descriptions can show the live values.

use crate::error::SettingError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Values a setting can hold
pub trait SettingValue:
    Clone + PartialEq + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> SettingValue for T where
    T: Clone + PartialEq + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// A typed, validated configuration value owned by an ability type.
///
/// ```ignore
/// pub static COOLDOWN: SettingObject<i64> =
///     SettingObject::new("Cooldown", 40, |value| *value >= 0)
///         .with_comment(&["# Cooldown in seconds"])
///         .with_display(|value| format_cooldown(*value));
/// ```
pub struct SettingObject<T: 'static> {
    key: &'static str,
    default: T,
    comment: &'static [&'static str],
    condition: fn(&T) -> bool,
    display: Option<fn(&T) -> String>,
    value: RwLock<Option<T>>,
}

impl<T: SettingValue> SettingObject<T> {
    pub const fn new(key: &'static str, default: T, condition: fn(&T) -> bool) -> Self {
        Self {
            key,
            default,
            comment: &[],
            condition,
            display: None,
            value: parking_lot::const_rwlock(None),
        }
    }

    pub const fn with_comment(mut self, comment: &'static [&'static str]) -> Self {
        self.comment = comment;
        self
    }

    pub const fn with_display(mut self, display: fn(&T) -> String) -> Self {
        self.display = Some(display);
        self
    }

    /// Current value: the configured override, or the default
    pub fn get(&self) -> T {
        self.value
            .read()
            .clone()
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn is_valid(&self, value: &T) -> bool {
        (self.condition)(value)
    }

    /// Override the current value if it passes the validity predicate
    pub fn set(&self, value: T) -> Result<(), SettingError> {
        if !self.is_valid(&value) {
            return Err(SettingError::Rejected {
                key: self.key,
                value: value.to_string(),
            });
        }
        *self.value.write() = Some(value);
        Ok(())
    }
}

/// Object-safe view of a setting, stored in ability registrations
pub trait Setting: Send + Sync {
    fn key(&self) -> &'static str;

    fn comment(&self) -> &'static [&'static str];

    fn default_toml(&self) -> toml::Value;

    fn current_toml(&self) -> toml::Value;

    /// Parse and validate a raw configuration value, then make it current
    fn apply(&self, raw: &toml::Value) -> Result<(), SettingError>;

    /// Drop any override and fall back to the default
    fn reset(&self);

    /// Human readable rendering of the current value
    fn render(&self) -> String;
}

impl<T: SettingValue> Setting for SettingObject<T> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn comment(&self) -> &'static [&'static str] {
        self.comment
    }

    fn default_toml(&self) -> toml::Value {
        to_toml(&self.default)
    }

    fn current_toml(&self) -> toml::Value {
        to_toml(&self.get())
    }

    fn apply(&self, raw: &toml::Value) -> Result<(), SettingError> {
        let value: T = raw.clone().try_into().map_err(|e: toml::de::Error| SettingError::WrongType {
            key: self.key,
            expected: std::any::type_name::<T>(),
            message: e.to_string(),
        })?;
        self.set(value)
    }

    fn reset(&self) {
        *self.value.write() = None;
    }

    fn render(&self) -> String {
        let value = self.get();
        match self.display {
            Some(display) => display(&value),
            None => value.to_string(),
        }
    }
}

impl<T: SettingValue + std::fmt::Debug> std::fmt::Debug for SettingObject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingObject")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("value", &self.get())
            .finish()
    }
}

fn to_toml<T: Serialize>(value: &T) -> toml::Value {
    toml::Value::try_from(value).unwrap_or_else(|_| toml::Value::String(String::new()))
}

/// Render a cooldown length for descriptions and status messages
pub fn format_cooldown(seconds: i64) -> String {
    format!("Cooldown: {seconds}s")
}

/// Substitute `$[Key]` tokens in a description line with rendered setting values.
///
/// Tokens naming an unknown key are left untouched.
pub fn render_template(line: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut rendered = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(open) = rest.find("$[") {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find(']') {
            Some(close) => {
                let key = &after[..close];
                match lookup(key) {
                    Some(value) => rendered.push_str(&value),
                    None => {
                        tracing::debug!("No setting named '{}' for description token", key);
                        rendered.push_str(&rest[open..open + 2 + close + 1]);
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                rendered.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

/// Per-ability setting overrides, as found in the `[abilities]` configuration section.
///
/// ```toml
/// [abilities.Celebrity]
/// Cooldown = 40
/// Distance = 10.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilitySettings {
    pub abilities: BTreeMap<String, toml::Table>,
}

impl AbilitySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides for one ability, by manifest name
    pub fn table(&self, ability: &str) -> Option<&toml::Table> {
        self.abilities.get(ability)
    }

    pub fn insert(&mut self, ability: impl Into<String>, key: impl Into<String>, value: toml::Value) {
        self.abilities
            .entry(ability.into())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

//! Ability registry for Skirmish
//!
//! The registry is filled once at startup and read-only afterwards. Registering a type runs
//! its descriptor exactly once, validates it, computes its capability flags and stores the
//! result as a shared [`Registration`] keyed by type and by manifest name.

use super::descriptor::{Constructor, DescriptorParts, HandlerBinding, Projection, TimerSlot};
use super::instance::AbilityInstance;
use super::{
    version, AbilityKind, AbilityManifest, ActivatesOnInput, CapabilityFlags, Participant, Rank, Species,
    TargetsEntity,
};
use crate::error::{RegistrationError, RegistryError};
use crate::settings::{render_template, AbilitySettings, Setting};
use semver::Version;
use serde::Serialize;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything the registry knows about one ability type
pub struct Registration {
    kind: AbilityKind,
    manifest: AbilityManifest,
    constructor: Constructor,
    handlers: HashMap<TypeId, HandlerBinding>,
    settings: Vec<&'static dyn Setting>,
    timers: Vec<TimerSlot>,
    active: Option<Box<dyn Projection<dyn ActivatesOnInput>>>,
    target: Option<Box<dyn Projection<dyn TargetsEntity>>>,
    flags: CapabilityFlags,
}

impl Registration {
    fn from_parts(kind: AbilityKind, parts: DescriptorParts) -> Result<Self, RegistrationError> {
        let manifest = parts
            .manifest
            .ok_or_else(|| RegistrationError::malformed(kind.type_name(), "no manifest declared"))?;
        manifest
            .validate()
            .map_err(|reason| RegistrationError::malformed(kind.type_name(), reason))?;
        let constructor = parts
            .constructor
            .ok_or_else(|| RegistrationError::malformed(kind.type_name(), "no constructor declared"))?;

        let flags = CapabilityFlags::from_parts(parts.active.is_some(), parts.target.is_some(), parts.beta);

        Ok(Self {
            kind,
            manifest,
            constructor,
            handlers: parts.handlers,
            settings: parts.settings,
            timers: parts.timers,
            active: parts.active,
            target: parts.target,
            flags,
        })
    }

    pub fn kind(&self) -> AbilityKind {
        self.kind
    }

    pub fn manifest(&self) -> &AbilityManifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        self.manifest.name()
    }

    pub fn flags(&self) -> CapabilityFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: CapabilityFlags) -> bool {
        self.flags.has_flag(flag)
    }

    /// Handler declared for exactly this event type, if any
    pub fn handler_for(&self, event: TypeId) -> Option<&HandlerBinding> {
        self.handlers.get(&event)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &HandlerBinding> {
        self.handlers.values()
    }

    pub fn settings(&self) -> &[&'static dyn Setting] {
        &self.settings
    }

    pub fn setting(&self, key: &str) -> Option<&'static dyn Setting> {
        self.settings.iter().copied().find(|setting| setting.key() == key)
    }

    /// Names of the declared scheduled-timer members
    pub fn timer_fields(&self) -> Vec<&'static str> {
        self.timers.iter().map(|slot| slot.field).collect()
    }

    pub(crate) fn timer_slots(&self) -> &[TimerSlot] {
        &self.timers
    }

    pub(crate) fn active_projection(&self) -> Option<&dyn Projection<dyn ActivatesOnInput + 'static>> {
        self.active.as_deref()
    }

    pub(crate) fn target_projection(&self) -> Option<&dyn Projection<dyn TargetsEntity + 'static>> {
        self.target.as_deref()
    }

    /// Description lines with `$[Key]` tokens replaced by current setting values
    pub fn render_description(&self) -> Vec<String> {
        self.manifest
            .description()
            .iter()
            .map(|line| render_template(line, |key| self.setting(key).map(|setting| setting.render())))
            .collect()
    }

    /// Build a fresh ability for `participant`
    pub fn instantiate(self: &Arc<Self>, participant: Participant) -> AbilityInstance {
        let ability = (self.constructor)(participant);
        AbilityInstance::new(Arc::clone(self), ability)
    }

    pub fn summary(&self) -> AbilitySummary {
        let mut events: Vec<&'static str> = self.handlers.values().map(HandlerBinding::event_name).collect();
        events.sort_unstable();

        AbilitySummary {
            name: self.name().to_string(),
            type_name: self.kind.type_name(),
            rank: self.manifest.rank(),
            species: self.manifest.species(),
            description: self.render_description(),
            flags: self.flags,
            events,
            settings: self
                .settings
                .iter()
                .map(|setting| (setting.key(), setting.current_toml().to_string()))
                .collect(),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("kind", &self.kind)
            .field("manifest", &self.manifest)
            .field("flags", &self.flags)
            .field("handlers", &self.handlers.len())
            .field("settings", &self.settings.len())
            .field("timers", &self.timer_fields())
            .finish()
    }
}

/// Serializable overview of a registered ability, for listings and tooling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilitySummary {
    pub name: String,
    pub type_name: &'static str,
    pub rank: Rank,
    pub species: Species,
    pub description: Vec<String>,
    pub flags: CapabilityFlags,
    pub events: Vec<&'static str>,
    pub settings: Vec<(&'static str, String)>,
}

/// Result of a successful [`AbilityRegistry::register`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new registration was created for `canonical`, which differs from the requested
    /// type when the server version forced a substitute
    Registered { canonical: AbilityKind },
    /// The type was already known; nothing changed
    AlreadyRegistered,
    /// The type resolved to a substitute that was already registered and now points to it
    Redirected { canonical: AbilityKind },
}

/// Outcome of a batch registration
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<AbilityKind>,
    pub redirected: Vec<(AbilityKind, AbilityKind)>,
    pub already_registered: Vec<AbilityKind>,
    pub failed: Vec<(AbilityKind, RegistrationError)>,
}

impl RegistrationReport {
    /// True when no type failed for a reason other than the server version
    pub fn is_clean(&self) -> bool {
        self.failed
            .iter()
            .all(|(_, error)| matches!(error, RegistrationError::UnsupportedVersion { .. }))
    }
}

/// Registry of every ability type usable on this server
pub struct AbilityRegistry {
    /// Version of the running server, checked against each type's minimum
    server_version: Version,
    /// Canonical type to its registration
    registrations: HashMap<TypeId, Arc<Registration>>,
    /// Manifest name to canonical type
    names: HashMap<String, TypeId>,
    /// Substituted type to the canonical type it resolved to
    alternatives: HashMap<TypeId, TypeId>,
    /// Registration order
    order: Vec<TypeId>,
    /// Canonical types whose descriptor was rejected, so they are not described again
    rejected: HashMap<TypeId, RegistrationError>,
}

impl AbilityRegistry {
    /// Create an empty registry for a server running `server_version`
    pub fn new(server_version: Version) -> Self {
        Self {
            server_version,
            registrations: HashMap::new(),
            names: HashMap::new(),
            alternatives: HashMap::new(),
            order: Vec::new(),
            rejected: HashMap::new(),
        }
    }

    pub fn server_version(&self) -> &Version {
        &self.server_version
    }

    /// Register an ability type.
    ///
    /// Failures are logged here and returned; they never affect other registrations.
    pub fn register(&mut self, kind: AbilityKind) -> Result<RegisterOutcome, RegistrationError> {
        if self.is_registered(kind) {
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let result = self.try_register(kind);
        match &result {
            Ok(RegisterOutcome::Registered { canonical }) if *canonical != kind => {
                debug!("Registered ability {} in place of {}", canonical, kind)
            }
            Ok(RegisterOutcome::Registered { canonical }) => debug!("Registered ability {}", canonical),
            Ok(RegisterOutcome::Redirected { canonical }) => {
                debug!("Ability {} resolves to already registered {}", kind, canonical)
            }
            Ok(RegisterOutcome::AlreadyRegistered) => {}
            Err(e @ RegistrationError::UnsupportedVersion { .. }) => debug!("Skipping ability: {}", e),
            Err(e @ RegistrationError::NameCollision { .. }) => warn!("Skipping ability: {}", e),
            Err(e @ RegistrationError::Malformed { .. }) => error!("Skipping ability: {}", e),
        }
        result
    }

    fn try_register(&mut self, kind: AbilityKind) -> Result<RegisterOutcome, RegistrationError> {
        let canonical = version::resolve(kind, &self.server_version)?;

        if self.registrations.contains_key(&canonical.type_id()) {
            self.alternatives.insert(kind.type_id(), canonical.type_id());
            return Ok(RegisterOutcome::Redirected { canonical });
        }

        let id = canonical.type_id();
        if let Some(error) = self.rejected.get(&id) {
            return Err(error.clone());
        }

        let registration = match self.admit(canonical) {
            Ok(registration) => registration,
            Err(e) => {
                self.rejected.insert(id, e.clone());
                return Err(e);
            }
        };

        self.names.insert(registration.name().to_string(), id);
        self.registrations.insert(id, Arc::new(registration));
        self.order.push(id);
        if canonical != kind {
            self.alternatives.insert(kind.type_id(), id);
        }

        Ok(RegisterOutcome::Registered { canonical })
    }

    /// Describe `canonical` and check its name against the ones already taken
    fn admit(&self, canonical: AbilityKind) -> Result<Registration, RegistrationError> {
        let registration = Registration::from_parts(canonical, canonical.introspect())?;
        if let Some(existing) = self.names.get(registration.name()) {
            let existing = self
                .registrations
                .get(existing)
                .map(|registration| registration.kind.type_name())
                .unwrap_or("<unknown>");
            return Err(RegistrationError::NameCollision {
                ability: canonical.type_name(),
                name: registration.name().to_string(),
                existing,
            });
        }
        Ok(registration)
    }

    /// Register a batch of types, continuing past failures
    pub fn register_all(&mut self, kinds: impl IntoIterator<Item = AbilityKind>) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for kind in kinds {
            match self.register(kind) {
                Ok(RegisterOutcome::Registered { canonical }) => report.registered.push(canonical),
                Ok(RegisterOutcome::Redirected { canonical }) => report.redirected.push((kind, canonical)),
                Ok(RegisterOutcome::AlreadyRegistered) => report.already_registered.push(kind),
                Err(e) => report.failed.push((kind, e)),
            }
        }

        info!(
            "Registered {} abilities ({} redirected, {} skipped)",
            report.registered.len(),
            report.redirected.len(),
            report.failed.len()
        );
        report
    }

    fn canonical_id(&self, kind: AbilityKind) -> TypeId {
        self.alternatives
            .get(&kind.type_id())
            .copied()
            .unwrap_or_else(|| kind.type_id())
    }

    /// Whether `kind`, or the substitute it resolved to, is registered
    pub fn is_registered(&self, kind: AbilityKind) -> bool {
        self.registrations.contains_key(&self.canonical_id(kind))
    }

    /// Registration for `kind`; substituted types yield their canonical registration
    pub fn get(&self, kind: AbilityKind) -> Option<&Arc<Registration>> {
        self.registrations.get(&self.canonical_id(kind))
    }

    pub fn registration(&self, kind: AbilityKind) -> Result<&Arc<Registration>, RegistryError> {
        self.get(kind).ok_or(RegistryError::NotRegistered(kind.type_name()))
    }

    /// Ability type registered under a manifest name
    pub fn by_name(&self, name: &str) -> Option<AbilityKind> {
        self.get_by_name(name).map(|registration| registration.kind)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<Registration>> {
        self.names.get(name).and_then(|id| self.registrations.get(id))
    }

    /// Manifest names of every registered ability, in registration order
    pub fn all_names(&self) -> Vec<&str> {
        self.registrations().map(|registration| registration.name()).collect()
    }

    /// Registrations in registration order
    pub fn registrations(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.order.iter().filter_map(|id| self.registrations.get(id))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Construct a new instance of `kind` for `participant`
    pub fn instantiate(&self, kind: AbilityKind, participant: Participant) -> Result<AbilityInstance, RegistryError> {
        Ok(self.registration(kind)?.instantiate(participant))
    }

    /// Bind configured overrides to the registered abilities' settings.
    ///
    /// Values that fail to parse or validate are reported and the setting falls back to its
    /// default. Returns the number of values applied.
    pub fn apply_settings(&self, settings: &AbilitySettings) -> usize {
        let mut applied = 0;

        for (ability, table) in &settings.abilities {
            let Some(registration) = self.get_by_name(ability) else {
                warn!("Settings given for unknown ability '{}'", ability);
                continue;
            };

            for (key, raw) in table {
                let Some(setting) = registration.setting(key) else {
                    warn!("Ability '{}' has no setting '{}'", ability, key);
                    continue;
                };
                match setting.apply(raw) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        warn!("Ability '{}': {}, using the default", ability, e);
                        setting.reset();
                    }
                }
            }
        }

        debug!("Applied {} ability setting overrides", applied);
        applied
    }

    /// Current value of every registered setting, in configuration file shape
    pub fn settings_snapshot(&self) -> AbilitySettings {
        let mut snapshot = AbilitySettings::new();
        for registration in self.registrations() {
            for setting in registration.settings() {
                snapshot.insert(registration.name(), setting.key(), setting.current_toml());
            }
        }
        snapshot
    }

    /// Summaries of every registered ability, in registration order
    pub fn catalog(&self) -> Vec<AbilitySummary> {
        self.registrations().map(|registration| registration.summary()).collect()
    }

    pub fn catalog_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.catalog())
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("server_version", &self.server_version)
            .field("abilities", &self.all_names())
            .finish()
    }
}

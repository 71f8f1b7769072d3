//! Ability system for Skirmish
//!
//! An ability is a pluggable unit of gameplay behaviour handed to a participant. Ability
//! types describe themselves through [`AbilityType`]: their manifest, constructor, event
//! subscriptions, settings, scheduled timers and capabilities. The [`AbilityRegistry`]
//! turns those descriptions into shared [`Registration`]s at startup, and
//! [`AbilityInstance`]s are built from registrations whenever a participant receives an
//! ability.

pub mod manifest;
pub mod flags;
pub mod capability;
pub mod descriptor;
pub mod version;
pub mod registry;
pub mod instance;

pub use manifest::{AbilityManifest, Rank, Species};
pub use flags::CapabilityFlags;
pub use capability::{ActivatesOnInput, ActivationInput, ClickType, EntityRef, TargetsEntity};
pub use descriptor::{Descriptor, HandlerBinding};
pub use version::Support;
pub use registry::{AbilityRegistry, AbilitySummary, RegisterOutcome, Registration, RegistrationReport};
pub use instance::{AbilityInstance, AbilitySeat};

use crate::timer::Scheduler;
use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Downcasting support for ability and event trait objects
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Opaque handle to the game participant an ability belongs to.
///
/// Carries the scheduler of the participant's game so abilities can build their timers.
#[derive(Clone)]
pub struct Participant {
    id: Uuid,
    name: Arc<str>,
    scheduler: Scheduler,
}

impl Participant {
    pub fn new(name: impl Into<Arc<str>>, scheduler: &Scheduler) -> Self {
        Self::with_id(Uuid::new_v4(), name, scheduler)
    }

    pub fn with_id(id: Uuid, name: impl Into<Arc<str>>, scheduler: &Scheduler) -> Self {
        Self {
            id,
            name: name.into(),
            scheduler: scheduler.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Instance-side contract of every ability
pub trait Ability: AsAny + Send + 'static {
    /// The participant this ability was constructed for
    fn participant(&self) -> &Participant;
}

/// Type-level contract of every ability.
///
/// `describe` is the ability's explicit self-registration: everything the registry needs to
/// know about the type is declared there rather than discovered at runtime.
///
/// ```ignore
/// impl AbilityType for Celebrity {
///     fn describe(d: &mut Descriptor<Self>) {
///         d.manifest(AbilityManifest::new("Celebrity", Rank::C, Species::Human)
///                 .with_description(["Lays a red carpet. $[Cooldown]"]))
///             .constructor(Celebrity::new)
///             .setting(&COOLDOWN)
///             .scheduled_timer("skill", |ability| &mut ability.skill)
///             .active_handler();
///     }
/// }
/// ```
pub trait AbilityType: Ability + Sized {
    /// Minimum server version this type runs on, and what to use instead on older servers
    fn support() -> Option<Support> {
        None
    }

    fn describe(descriptor: &mut Descriptor<Self>);
}

/// Copyable handle naming an ability type.
///
/// This is the "type" argument of every registry operation. Two kinds are equal when they
/// name the same Rust type.
#[derive(Clone, Copy)]
pub struct AbilityKind {
    id: TypeId,
    type_name: &'static str,
    support: fn() -> Option<Support>,
    introspect: fn() -> descriptor::DescriptorParts,
}

impl AbilityKind {
    pub fn of<T: AbilityType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            support: T::support,
            introspect: descriptor::introspect::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn support(&self) -> Option<Support> {
        (self.support)()
    }

    pub(crate) fn introspect(&self) -> descriptor::DescriptorParts {
        (self.introspect)()
    }
}

impl PartialEq for AbilityKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AbilityKind {}

impl Hash for AbilityKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AbilityKind({})", self.type_name)
    }
}

impl std::fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

//! Ability descriptors
//!
//! A [`Descriptor`] is what an ability type fills in from [`AbilityType::describe`]. Typed
//! declarations are erased on the way in, so the registry only ever stores object-safe
//! bindings that downcast back to the concrete ability when they are used.

use super::{Ability, AbilityManifest, AbilityType, ActivatesOnInput, AsAny, Participant, TargetsEntity};
use crate::event::Event;
use crate::settings::Setting;
use crate::timer::ScheduledTimer;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) type Constructor = Arc<dyn Fn(Participant) -> Box<dyn Ability> + Send + Sync>;

/// Accessor for one of an ability's scheduled-timer members
pub type TimerField<T> = fn(&mut T) -> &mut (dyn ScheduledTimer + 'static);

/// Declarative description of an ability type
pub struct Descriptor<T> {
    parts: DescriptorParts,
    _marker: PhantomData<fn(T)>,
}

/// Type-erased output of a descriptor
#[derive(Default)]
pub(crate) struct DescriptorParts {
    pub(crate) manifest: Option<AbilityManifest>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) handlers: HashMap<TypeId, HandlerBinding>,
    pub(crate) settings: Vec<&'static dyn Setting>,
    pub(crate) timers: Vec<TimerSlot>,
    pub(crate) active: Option<Box<dyn Projection<dyn ActivatesOnInput>>>,
    pub(crate) target: Option<Box<dyn Projection<dyn TargetsEntity>>>,
    pub(crate) beta: bool,
}

pub(crate) fn introspect<T: AbilityType>() -> DescriptorParts {
    let mut descriptor = Descriptor::<T> {
        parts: DescriptorParts::default(),
        _marker: PhantomData,
    };
    T::describe(&mut descriptor);
    descriptor.parts
}

impl<T: AbilityType> Descriptor<T> {
    pub fn manifest(&mut self, manifest: AbilityManifest) -> &mut Self {
        self.parts.manifest = Some(manifest);
        self
    }

    pub fn constructor(&mut self, constructor: fn(Participant) -> T) -> &mut Self {
        self.parts.constructor = Some(Arc::new(move |participant| {
            Box::new(constructor(participant)) as Box<dyn Ability>
        }));
        self
    }

    /// Handle events of type `E`, and of every event type that embeds `E` as its parent
    pub fn subscribe<E: Event>(&mut self, method: &'static str, handler: fn(&mut T, &mut E)) -> &mut Self {
        self.bind(method, handler, false)
    }

    /// Like [`subscribe`](Self::subscribe), but skip events that are already cancelled
    pub fn subscribe_ignoring_cancelled<E: Event>(
        &mut self,
        method: &'static str,
        handler: fn(&mut T, &mut E),
    ) -> &mut Self {
        self.bind(method, handler, true)
    }

    fn bind<E: Event>(&mut self, method: &'static str, handler: fn(&mut T, &mut E), ignore_cancelled: bool) -> &mut Self {
        let event = TypeId::of::<E>();
        if let Some(existing) = self.parts.handlers.get(&event) {
            debug!(
                "{}: '{}' already handles {}, ignoring '{}'",
                std::any::type_name::<T>(),
                existing.method,
                existing.event,
                method
            );
            return self;
        }

        self.parts.handlers.insert(
            event,
            HandlerBinding {
                method,
                event: std::any::type_name::<E>(),
                ignore_cancelled,
                invoker: Box::new(TypedHandler { handler }),
            },
        );
        self
    }

    pub fn setting(&mut self, setting: &'static dyn Setting) -> &mut Self {
        if self.parts.settings.iter().any(|s| s.key() == setting.key()) {
            warn!(
                "{}: setting '{}' declared twice, keeping the first",
                std::any::type_name::<T>(),
                setting.key()
            );
            return self;
        }
        self.parts.settings.push(setting);
        self
    }

    /// Declare a timer member that must be force-stopped when the ability is destroyed
    pub fn scheduled_timer(&mut self, field: &'static str, access: TimerField<T>) -> &mut Self {
        self.parts.timers.push(TimerSlot {
            field,
            access: Box::new(FieldProjection { get: access }),
        });
        self
    }

    pub fn active_handler(&mut self) -> &mut Self
    where
        T: ActivatesOnInput,
    {
        let get: fn(&mut T) -> &mut (dyn ActivatesOnInput + 'static) = |ability| ability;
        self.parts.active = Some(Box::new(FieldProjection { get }));
        self
    }

    pub fn target_handler(&mut self) -> &mut Self
    where
        T: TargetsEntity,
    {
        let get: fn(&mut T) -> &mut (dyn TargetsEntity + 'static) = |ability| ability;
        self.parts.target = Some(Box::new(FieldProjection { get }));
        self
    }

    /// Mark the ability as unfinished
    pub fn beta(&mut self) -> &mut Self {
        self.parts.beta = true;
        self
    }
}

/// Erased view from an ability object onto one of its parts
pub(crate) trait Projection<C: ?Sized + 'static>: Send + Sync {
    fn project<'a>(&self, ability: &'a mut dyn Ability) -> Option<&'a mut C>;
}

struct FieldProjection<T, C: ?Sized + 'static> {
    get: fn(&mut T) -> &mut C,
}

impl<T: Ability, C: ?Sized + 'static> Projection<C> for FieldProjection<T, C> {
    fn project<'a>(&self, ability: &'a mut dyn Ability) -> Option<&'a mut C> {
        AsAny::as_any_mut(ability).downcast_mut::<T>().map(self.get)
    }
}

/// A declared scheduled-timer member
pub(crate) struct TimerSlot {
    pub(crate) field: &'static str,
    access: Box<dyn Projection<dyn ScheduledTimer>>,
}

impl TimerSlot {
    pub(crate) fn get<'a>(&self, ability: &'a mut dyn Ability) -> Option<&'a mut (dyn ScheduledTimer + 'static)> {
        self.access.project(ability)
    }
}

trait HandlerInvoker: Send + Sync {
    fn invoke(&self, ability: &mut dyn Ability, event: &mut dyn Event) -> bool;
}

struct TypedHandler<T, E> {
    handler: fn(&mut T, &mut E),
}

impl<T: Ability, E: Event> HandlerInvoker for TypedHandler<T, E> {
    fn invoke(&self, ability: &mut dyn Ability, event: &mut dyn Event) -> bool {
        let Some(ability) = AsAny::as_any_mut(ability).downcast_mut::<T>() else {
            return false;
        };
        let Some(event) = AsAny::as_any_mut(event).downcast_mut::<E>() else {
            return false;
        };
        (self.handler)(ability, event);
        true
    }
}

/// An ability's subscription to one event type
pub struct HandlerBinding {
    method: &'static str,
    event: &'static str,
    ignore_cancelled: bool,
    invoker: Box<dyn HandlerInvoker>,
}

impl HandlerBinding {
    /// Name the handler was declared under
    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn event_name(&self) -> &'static str {
        self.event
    }

    pub fn ignores_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    pub(crate) fn invoke(&self, ability: &mut dyn Ability, event: &mut dyn Event) -> bool {
        self.invoker.invoke(ability, event)
    }
}

impl std::fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("method", &self.method)
            .field("event", &self.event)
            .field("ignore_cancelled", &self.ignore_cancelled)
            .finish()
    }
}

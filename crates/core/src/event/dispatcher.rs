//! Routes events to the handlers abilities declared for them

use super::Event;
use crate::ability::{Ability, AbilityInstance, Registration};
use tracing::trace;

/// Stateless event router.
///
/// For each instance the most specific declared handler wins: the event's own type first,
/// then each ancestor in turn. At most one handler runs per instance per dispatch.
pub struct EventDispatcher;

impl EventDispatcher {
    /// Deliver `event` to one ability instance. Returns true if a handler ran.
    pub fn dispatch(instance: &mut AbilityInstance, event: &mut dyn Event) -> bool {
        let (registration, ability) = instance.split_mut();
        Self::dispatch_to(registration, ability, event)
    }

    fn dispatch_to(registration: &Registration, ability: &mut dyn Ability, event: &mut dyn Event) -> bool {
        if let Some(binding) = registration.handler_for(event.concrete_type_id()) {
            if binding.ignores_cancelled() && event.is_cancelled() {
                trace!(
                    "'{}' skips cancelled {}",
                    registration.name(),
                    binding.event_name()
                );
                return false;
            }
            trace!(
                "'{}' handles {} with '{}'",
                registration.name(),
                event.event_name(),
                binding.method()
            );
            return binding.invoke(ability, event);
        }

        match event.parent_mut() {
            Some(parent) => Self::dispatch_to(registration, ability, parent),
            None => false,
        }
    }

    /// Deliver `event` to every instance in turn; returns how many handled it
    pub fn broadcast<'a>(instances: impl IntoIterator<Item = &'a mut AbilityInstance>, event: &mut dyn Event) -> usize {
        let mut handled = 0;
        for instance in instances {
            if Self::dispatch(instance, &mut *event) {
                handled += 1;
            }
        }
        handled
    }
}

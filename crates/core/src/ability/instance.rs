//! Live ability instances and the per-participant seat holding them

use super::registry::{AbilityRegistry, Registration};
use super::{Ability, AbilityKind, ActivationInput, AsAny, EntityRef, Participant};
use crate::error::RegistryError;
use crate::event::{Event, EventDispatcher};
use std::sync::Arc;
use tracing::debug;

/// An ability bound to one participant, together with its shared registration.
///
/// Dropping an instance force-stops every scheduled timer it declared, so their interrupted
/// paths release whatever the ability acquired. [`destroy`](Self::destroy) makes that
/// explicit at call sites.
pub struct AbilityInstance {
    registration: Arc<Registration>,
    ability: Box<dyn Ability>,
}

impl AbilityInstance {
    pub(crate) fn new(registration: Arc<Registration>, ability: Box<dyn Ability>) -> Self {
        Self { registration, ability }
    }

    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    pub fn kind(&self) -> AbilityKind {
        self.registration.kind()
    }

    pub fn name(&self) -> &str {
        self.registration.name()
    }

    pub fn participant(&self) -> &Participant {
        self.ability.participant()
    }

    pub fn ability(&self) -> &dyn Ability {
        &*self.ability
    }

    pub fn downcast_ref<T: Ability>(&self) -> Option<&T> {
        AsAny::as_any(&*self.ability).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Ability>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(&mut *self.ability).downcast_mut::<T>()
    }

    pub(crate) fn split_mut(&mut self) -> (&Registration, &mut (dyn Ability + 'static)) {
        (&self.registration, &mut *self.ability)
    }

    /// Route an event to this ability's handler. Returns true if a handler ran.
    pub fn handle_event(&mut self, event: &mut dyn Event) -> bool {
        EventDispatcher::dispatch(self, event)
    }

    /// Offer item input to an active-skill ability.
    ///
    /// Returns false when the ability has no active handler or did not consume the input.
    pub fn activate(&mut self, input: &ActivationInput) -> bool {
        let (registration, ability) = self.split_mut();
        let Some(projection) = registration.active_projection() else {
            return false;
        };
        match projection.project(ability) {
            Some(handler) => handler.activate(input),
            None => false,
        }
    }

    /// Point a target-skill ability at another entity. Returns false if it has no target handler.
    pub fn target(&mut self, item: &str, entity: &EntityRef) -> bool {
        let (registration, ability) = self.split_mut();
        let Some(projection) = registration.target_projection() else {
            return false;
        };
        match projection.project(ability) {
            Some(handler) => {
                handler.target(item, entity);
                true
            }
            None => false,
        }
    }

    /// Declared timer members currently in their active state
    pub fn active_timers(&mut self) -> Vec<&'static str> {
        let (registration, ability) = self.split_mut();
        let mut active = Vec::new();
        for slot in registration.timer_slots() {
            if slot.get(&mut *ability).map_or(false, |timer| timer.is_active()) {
                active.push(slot.field);
            }
        }
        active
    }

    /// Force-stop every declared timer; returns how many stops took effect.
    ///
    /// Stopping a duration can start its chained cooldown, so passes repeat until a pass
    /// stops nothing, bounded by the number of declared timers.
    pub fn stop_timers(&mut self) -> usize {
        let (registration, ability) = self.split_mut();
        let slots = registration.timer_slots();
        let mut stopped = 0;

        for _ in 0..=slots.len() {
            let mut pass = 0;
            for slot in slots {
                if let Some(timer) = slot.get(&mut *ability) {
                    if timer.force_stop() {
                        pass += 1;
                    }
                }
            }
            if pass == 0 {
                break;
            }
            stopped += pass;
        }
        stopped
    }

    /// Tear the ability down, stopping its timers through their interrupted paths
    pub fn destroy(self) {
        debug!("Destroying ability '{}' of {}", self.name(), self.participant().name());
    }
}

impl Drop for AbilityInstance {
    fn drop(&mut self) {
        let stopped = self.stop_timers();
        if stopped > 0 {
            debug!("Stopped {} timers of ability '{}'", stopped, self.registration.name());
        }
    }
}

impl std::fmt::Debug for AbilityInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityInstance")
            .field("ability", &self.registration.name())
            .field("participant", self.ability.participant())
            .finish()
    }
}

/// Holds the single ability a participant currently has
#[derive(Debug)]
pub struct AbilitySeat {
    participant: Participant,
    ability: Option<AbilityInstance>,
}

impl AbilitySeat {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            ability: None,
        }
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn has_ability(&self) -> bool {
        self.ability.is_some()
    }

    pub fn ability(&self) -> Option<&AbilityInstance> {
        self.ability.as_ref()
    }

    pub fn ability_mut(&mut self) -> Option<&mut AbilityInstance> {
        self.ability.as_mut()
    }

    /// Replace the current ability with a fresh instance of `kind`.
    ///
    /// The previous instance is destroyed before the new one is constructed. An unknown
    /// `kind` leaves the seat untouched.
    pub fn set_ability(&mut self, registry: &AbilityRegistry, kind: AbilityKind) -> Result<&mut AbilityInstance, RegistryError> {
        let registration = Arc::clone(registry.registration(kind)?);

        if let Some(previous) = self.ability.take() {
            previous.destroy();
        }

        let instance = registration.instantiate(self.participant.clone());
        Ok(self.ability.insert(instance))
    }

    /// Destroy the current ability, if any
    pub fn clear(&mut self) -> bool {
        match self.ability.take() {
            Some(previous) => {
                previous.destroy();
                true
            }
            None => false,
        }
    }

    /// Dispatch an event to the seated ability
    pub fn handle_event(&mut self, event: &mut dyn Event) -> bool {
        self.ability
            .as_mut()
            .map_or(false, |instance| instance.handle_event(event))
    }
}

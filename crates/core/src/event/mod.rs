//! Game events delivered to abilities
//!
//! Events form single-parent hierarchies by composition: a specific event embeds the more
//! general event it refines and exposes it through [`Event::parent`]. A handler subscribed
//! to a general event therefore also sees every event that embeds it, unless the ability
//! declared a handler for the more specific type.

pub mod dispatcher;

pub use dispatcher::EventDispatcher;

use crate::ability::AsAny;
use std::any::TypeId;

/// Trait for types that can be delivered to abilities
pub trait Event: AsAny + Send + 'static {
    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The more general event this one refines
    fn parent(&self) -> Option<&dyn Event> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Event> {
        None
    }

    /// Cancellation state; events without their own flag share their parent's
    fn is_cancelled(&self) -> bool {
        self.parent().map_or(false, |parent| parent.is_cancelled())
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        if let Some(parent) = self.parent_mut() {
            parent.set_cancelled(cancelled);
        }
    }
}

impl<'a> dyn Event + 'a {
    /// Type id of the concrete event behind this object
    pub fn concrete_type_id(&self) -> TypeId {
        AsAny::as_any(self).type_id()
    }

    pub fn is<E: Event>(&self) -> bool {
        self.concrete_type_id() == TypeId::of::<E>()
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        AsAny::as_any(self).downcast_ref::<E>()
    }

    pub fn downcast_mut<E: Event>(&mut self) -> Option<&mut E> {
        AsAny::as_any_mut(self).downcast_mut::<E>()
    }

    /// Names of this event and its ancestors, most specific first
    pub fn lineage(&self) -> Vec<&'static str> {
        let mut names = vec![self.event_name()];
        let mut current = self.parent();
        while let Some(event) = current {
            names.push(event.event_name());
            current = event.parent();
        }
        names
    }
}

/// Implement [`Event`] for a struct.
///
/// ```ignore
/// pub struct EntityDamage { pub amount: f64, pub cancelled: bool }
/// pub struct EntityDamageByEntity { pub base: EntityDamage, pub damager: EntityRef }
///
/// impl_event!(EntityDamage, cancelled = cancelled);
/// impl_event!(EntityDamageByEntity, parent = base);
/// ```
#[macro_export]
macro_rules! impl_event {
    ($event:ty, cancelled = $flag:ident) => {
        impl $crate::event::Event for $event {
            fn is_cancelled(&self) -> bool {
                self.$flag
            }

            fn set_cancelled(&mut self, cancelled: bool) {
                self.$flag = cancelled;
            }
        }
    };

    ($event:ty, parent = $parent:ident) => {
        impl $crate::event::Event for $event {
            fn parent(&self) -> Option<&dyn $crate::event::Event> {
                Some(&self.$parent)
            }

            fn parent_mut(&mut self) -> Option<&mut dyn $crate::event::Event> {
                Some(&mut self.$parent)
            }
        }
    };

    ($event:ty) => {
        impl $crate::event::Event for $event {}
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Damage {
        amount: f64,
        cancelled: bool,
    }
    impl_event!(Damage, cancelled = cancelled);

    struct DamageByEntity {
        base: Damage,
    }
    impl_event!(DamageByEntity, parent = base);

    struct ProjectileHit {
        base: DamageByEntity,
    }
    impl_event!(ProjectileHit, parent = base);

    struct Tick;
    impl_event!(Tick);

    fn hit(amount: f64) -> ProjectileHit {
        ProjectileHit {
            base: DamageByEntity {
                base: Damage {
                    amount,
                    cancelled: false,
                },
            },
        }
    }

    #[test]
    fn test_lineage_walks_parents() {
        let event = hit(2.0);
        let event: &dyn Event = &event;
        let lineage = event.lineage();

        assert_eq!(lineage.len(), 3);
        assert!(lineage[0].ends_with("ProjectileHit"));
        assert!(lineage[1].ends_with("DamageByEntity"));
        assert!(lineage[2].ends_with("Damage"));
    }

    #[test]
    fn test_cancellation_is_shared_with_root() {
        let mut event = hit(2.0);
        assert!(!event.is_cancelled());

        event.set_cancelled(true);
        assert!(event.base.base.cancelled);
        assert!(event.is_cancelled());
        assert!(event.base.is_cancelled());
    }

    #[test]
    fn test_events_without_flag_are_never_cancelled() {
        let mut tick = Tick;
        tick.set_cancelled(true);
        assert!(!tick.is_cancelled());
    }

    #[test]
    fn test_downcast_through_dyn() {
        let mut event = hit(4.0);
        let event: &mut dyn Event = &mut event;

        assert!(event.is::<ProjectileHit>());
        assert!(!event.is::<Damage>());
        assert_eq!(event.concrete_type_id(), TypeId::of::<ProjectileHit>());

        let root = event
            .parent_mut()
            .and_then(|parent| parent.parent_mut())
            .and_then(|root| root.downcast_mut::<Damage>())
            .unwrap();
        root.amount = 1.0;
        assert_eq!(event.downcast_ref::<ProjectileHit>().unwrap().base.base.amount, 1.0);
    }
}

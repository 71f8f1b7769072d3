mod common;

use common::*;
use skirmish::{AbilityInstance, AbilityKind, AbilityRegistry, Event, EventDispatcher, Scheduler};

fn registry() -> AbilityRegistry {
    let mut registry = registry_on(1, 16, 5);
    registry.register_all([
        AbilityKind::of::<Curse>(),
        AbilityKind::of::<Guardian>(),
        AbilityKind::of::<Emperor>(),
    ]);
    registry
}

fn instance<T: skirmish::AbilityType>(registry: &AbilityRegistry, scheduler: &Scheduler) -> AbilityInstance {
    registry
        .instantiate(AbilityKind::of::<T>(), participant("Alex", scheduler))
        .unwrap()
}

#[test]
fn test_supertype_handler_runs_once() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut curse = instance::<Curse>(&registry, &scheduler);

    let mut event = attack(3.5, "Zombie");
    assert!(curse.handle_event(&mut event));

    let curse = curse.downcast_ref::<Curse>().unwrap();
    assert_eq!(curse.hits, 1);
    assert_eq!(curse.last_amount, 3.5);
}

#[test]
fn test_most_specific_handler_wins() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut guardian = instance::<Guardian>(&registry, &scheduler);

    let mut event = attack(1.0, "Skeleton");
    assert!(guardian.handle_event(&mut event));
    assert!(event.is_cancelled());
    assert!(event.base.cancelled);

    let mut plain = damage(2.0);
    assert!(guardian.handle_event(&mut plain));

    let guardian = guardian.downcast_ref::<Guardian>().unwrap();
    assert_eq!(guardian.specific, 1);
    assert_eq!(guardian.general, 1);
    assert_eq!(guardian.duplicate, 0);
}

#[test]
fn test_cancelled_events_are_skipped_when_asked() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut guardian = instance::<Guardian>(&registry, &scheduler);

    let mut event = PlayerMove {
        distance: 4.0,
        cancelled: true,
    };
    assert!(!guardian.handle_event(&mut event));

    event.set_cancelled(false);
    assert!(guardian.handle_event(&mut event));
    assert_eq!(guardian.downcast_ref::<Guardian>().unwrap().moves, 1);
}

#[test]
fn test_unhandled_event() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut emperor = instance::<Emperor>(&registry, &scheduler);
    let mut curse = instance::<Curse>(&registry, &scheduler);

    assert!(!emperor.handle_event(&mut attack(1.0, "Creeper")));
    assert!(!curse.handle_event(&mut GameEnd));
    assert_eq!(curse.downcast_ref::<Curse>().unwrap().hits, 0);
}

#[test]
fn test_broadcast_counts_handlers() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut instances = vec![
        instance::<Curse>(&registry, &scheduler),
        instance::<Guardian>(&registry, &scheduler),
        instance::<Emperor>(&registry, &scheduler),
    ];

    let mut event = damage(5.0);
    assert_eq!(EventDispatcher::broadcast(instances.iter_mut(), &mut event), 2);
    assert_eq!(instances[0].downcast_ref::<Curse>().unwrap().hits, 1);
    assert_eq!(instances[1].downcast_ref::<Guardian>().unwrap().general, 1);
}

#[test]
fn test_target_and_activate_capabilities() {
    let registry = registry();
    let scheduler = Scheduler::new();
    let mut curse = instance::<Curse>(&registry, &scheduler);
    let mut emperor = instance::<Emperor>(&registry, &scheduler);

    let entity = skirmish::ability::EntityRef {
        id: uuid::Uuid::new_v4(),
        name: "Villager".to_string(),
    };
    assert!(curse.target("iron_sword", &entity));
    assert_eq!(curse.downcast_ref::<Curse>().unwrap().marked.as_ref(), Some(&entity));

    assert!(!curse.activate(&red_carpet()));
    assert!(!emperor.target("iron_sword", &entity));
}

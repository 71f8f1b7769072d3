//! Ability and event fixtures shared by the integration tests

#![allow(dead_code)]

use semver::Version;
use skirmish::ability::{ActivatesOnInput, ActivationInput, ClickType, EntityRef, TargetsEntity};
use skirmish::settings::{format_cooldown, SettingObject};
use skirmish::timer::TimeUnit;
use skirmish::{
    impl_event, Ability, AbilityKind, AbilityManifest, AbilityRegistry, AbilityType, CooldownTimer, Descriptor,
    DurationTimer, Event, Participant, Rank, Scheduler, Species, Support,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub fn registry_on(major: u64, minor: u64, patch: u64) -> AbilityRegistry {
    AbilityRegistry::new(Version::new(major, minor, patch))
}

pub fn participant(name: &str, scheduler: &Scheduler) -> Participant {
    Participant::new(name, scheduler)
}

// Events

pub struct EntityDamage {
    pub amount: f64,
    pub cancelled: bool,
}
impl_event!(EntityDamage, cancelled = cancelled);

pub struct EntityDamageByEntity {
    pub base: EntityDamage,
    pub damager: String,
}
impl_event!(EntityDamageByEntity, parent = base);

pub struct PlayerMove {
    pub distance: f64,
    pub cancelled: bool,
}
impl_event!(PlayerMove, cancelled = cancelled);

pub struct GameEnd;
impl_event!(GameEnd);

pub fn damage(amount: f64) -> EntityDamage {
    EntityDamage {
        amount,
        cancelled: false,
    }
}

pub fn attack(amount: f64, damager: &str) -> EntityDamageByEntity {
    EntityDamageByEntity {
        base: damage(amount),
        damager: damager.to_string(),
    }
}

// Celebrity: active skill with a duration window and a linked cooldown

pub static CELEBRITY_COOLDOWN: SettingObject<i64> = SettingObject::new("Cooldown", 4, |value| *value >= 0)
    .with_comment(&["# Cooldown in ticks"])
    .with_display(|value| format_cooldown(*value));

pub static CELEBRITY_DURATION: SettingObject<i64> = SettingObject::new("Duration", 3, |value| *value > 0)
    .with_comment(&["# Red carpet length in ticks"]);

#[derive(Default)]
pub struct Tally {
    pub starts: AtomicU32,
    pub processed: AtomicU32,
    pub ends: AtomicU32,
    pub silent_ends: AtomicU32,
}

impl Tally {
    pub fn get(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

pub struct Celebrity {
    participant: Participant,
    pub skill: DurationTimer,
    pub cooldown: CooldownTimer,
    pub tally: Arc<Tally>,
}

fn ticks(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl Celebrity {
    fn new(participant: Participant) -> Self {
        let scheduler = participant.scheduler().clone();
        let tally = Arc::new(Tally::default());
        let cooldown =
            CooldownTimer::new(&scheduler, ticks(CELEBRITY_COOLDOWN.get())).with_period(TimeUnit::Ticks, 1);

        let (start, process, end, silent) = (tally.clone(), tally.clone(), tally.clone(), tally.clone());
        let skill = DurationTimer::new(&scheduler, ticks(CELEBRITY_DURATION.get()), Some(&cooldown))
            .with_period(TimeUnit::Ticks, 1)
            .on_duration_start(move || {
                start.starts.fetch_add(1, Ordering::SeqCst);
            })
            .on_duration_process(move |_elapsed| {
                process.processed.fetch_add(1, Ordering::SeqCst);
            })
            .on_duration_end(move || {
                end.ends.fetch_add(1, Ordering::SeqCst);
            })
            .on_duration_silent_end(move || {
                silent.silent_ends.fetch_add(1, Ordering::SeqCst);
            });

        Self {
            participant,
            skill,
            cooldown,
            tally,
        }
    }
}

impl Ability for Celebrity {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl ActivatesOnInput for Celebrity {
    fn activate(&mut self, input: &ActivationInput) -> bool {
        if input.item != "iron_ingot" || input.click != ClickType::RightClick {
            return false;
        }
        if self.cooldown.is_cooldown() || self.skill.is_duration() {
            return false;
        }
        self.skill.start().is_ok()
    }
}

impl AbilityType for Celebrity {
    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(
            AbilityManifest::new("Celebrity", Rank::C, Species::Human)
                .with_description(["Rolls out a red carpet for $[Duration] ticks.", "$[Cooldown]"]),
        )
        .constructor(Celebrity::new)
        .setting(&CELEBRITY_COOLDOWN)
        .setting(&CELEBRITY_DURATION)
        .scheduled_timer("skill", |ability| &mut ability.skill)
        .scheduled_timer("cooldown", |ability| &mut ability.cooldown)
        .active_handler();
    }
}

pub fn red_carpet() -> ActivationInput {
    ActivationInput::new("iron_ingot", ClickType::RightClick)
}

// Curse: handles the general damage event and targets entities

pub struct Curse {
    participant: Participant,
    pub hits: u32,
    pub last_amount: f64,
    pub marked: Option<EntityRef>,
}

impl Curse {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            hits: 0,
            last_amount: 0.0,
            marked: None,
        }
    }

    fn on_damage(&mut self, event: &mut EntityDamage) {
        self.hits += 1;
        self.last_amount = event.amount;
    }
}

impl Ability for Curse {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl TargetsEntity for Curse {
    fn target(&mut self, _item: &str, entity: &EntityRef) {
        self.marked = Some(entity.clone());
    }
}

impl AbilityType for Curse {
    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Curse", Rank::B, Species::Undead).with_line("Curses whoever it touches."))
            .constructor(Curse::new)
            .subscribe::<EntityDamage>("on_damage", Curse::on_damage)
            .target_handler();
    }
}

// Guardian: handlers at two levels of the damage hierarchy

pub struct Guardian {
    participant: Participant,
    pub general: u32,
    pub specific: u32,
    pub moves: u32,
    pub duplicate: u32,
}

impl Guardian {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            general: 0,
            specific: 0,
            moves: 0,
            duplicate: 0,
        }
    }

    fn on_damage(&mut self, _event: &mut EntityDamage) {
        self.general += 1;
    }

    fn on_damage_again(&mut self, _event: &mut EntityDamage) {
        self.duplicate += 1;
    }

    fn on_attacked(&mut self, event: &mut EntityDamageByEntity) {
        self.specific += 1;
        event.set_cancelled(true);
    }

    fn on_move(&mut self, _event: &mut PlayerMove) {
        self.moves += 1;
    }
}

impl Ability for Guardian {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Guardian {
    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Guardian", Rank::A, Species::Demigod))
            .constructor(Guardian::new)
            .subscribe::<EntityDamage>("on_damage", Guardian::on_damage)
            .subscribe::<EntityDamageByEntity>("on_attacked", Guardian::on_attacked)
            .subscribe_ignoring_cancelled::<PlayerMove>("on_move", Guardian::on_move)
            .subscribe::<EntityDamage>("on_damage_again", Guardian::on_damage_again);
    }
}

// Plain fixtures for registry behaviour

macro_rules! plain_ability {
    ($name:ident, $manifest:expr) => {
        plain_ability!($name, $manifest, |_d| {});
    };
    ($name:ident, $manifest:expr, |$d:ident| $extra:block) => {
        pub struct $name {
            participant: Participant,
        }

        impl Ability for $name {
            fn participant(&self) -> &Participant {
                &self.participant
            }
        }

        impl AbilityType for $name {
            fn describe($d: &mut Descriptor<Self>) {
                $d.manifest($manifest).constructor(|participant| Self { participant });
                $extra
            }
        }
    };
}

plain_ability!(Emperor, AbilityManifest::new("Emperor", Rank::S, Species::Human));

// Shares its manifest name with Celebrity
plain_ability!(Impostor, AbilityManifest::new("Celebrity", Rank::D, Species::Others));

plain_ability!(Prototype, AbilityManifest::new("Prototype", Rank::Special, Species::Others), |d| {
    d.beta();
});

plain_ability!(Nameless, AbilityManifest::new("", Rank::D, Species::Human));

pub static DOPPELGANGER_DESCRIBES: AtomicU32 = AtomicU32::new(0);

// Shares its manifest name with Curse and counts how often it is described
plain_ability!(Doppelganger, AbilityManifest::new("Curse", Rank::C, Species::Others), |d| {
    DOPPELGANGER_DESCRIBES.fetch_add(1, Ordering::SeqCst);
});

plain_ability!(LegacySniper, AbilityManifest::new("Sniper", Rank::A, Species::Human));

pub struct Faceless {
    participant: Participant,
}

impl Ability for Faceless {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Faceless {
    fn describe(d: &mut Descriptor<Self>) {
        d.constructor(|participant| Self { participant });
    }
}

pub struct Unbuilt {
    participant: Participant,
}

impl Ability for Unbuilt {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Unbuilt {
    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Unbuilt", Rank::D, Species::Human));
    }
}

// Version gated fixtures: the current generation needs 1.13

pub struct Sniper {
    participant: Participant,
}

impl Ability for Sniper {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Sniper {
    fn support() -> Option<Support> {
        Some(Support::since(Version::new(1, 13, 0)).or_use(AbilityKind::of::<LegacySniper>()))
    }

    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Sniper", Rank::A, Species::Human))
            .constructor(|participant| Self { participant });
    }
}

pub struct Elytra {
    participant: Participant,
}

impl Ability for Elytra {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Elytra {
    fn support() -> Option<Support> {
        Some(Support::since(Version::new(1, 13, 0)))
    }

    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Elytra", Rank::B, Species::Animal))
            .constructor(|participant| Self { participant });
    }
}

pub struct Ouroboros {
    participant: Participant,
}

pub struct Serpent {
    participant: Participant,
}

impl Ability for Ouroboros {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl Ability for Serpent {
    fn participant(&self) -> &Participant {
        &self.participant
    }
}

impl AbilityType for Ouroboros {
    fn support() -> Option<Support> {
        Some(Support::since(Version::new(2, 0, 0)).or_use(AbilityKind::of::<Serpent>()))
    }

    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Ouroboros", Rank::S, Species::God))
            .constructor(|participant| Self { participant });
    }
}

impl AbilityType for Serpent {
    fn support() -> Option<Support> {
        Some(Support::since(Version::new(2, 0, 0)).or_use(AbilityKind::of::<Ouroboros>()))
    }

    fn describe(d: &mut Descriptor<Self>) {
        d.manifest(AbilityManifest::new("Serpent", Rank::S, Species::God))
            .constructor(|participant| Self { participant });
    }
}

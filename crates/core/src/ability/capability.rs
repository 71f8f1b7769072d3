//! Optional capabilities an ability type can declare in its descriptor

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickType {
    LeftClick,
    RightClick,
}

/// A participant using an item to trigger their ability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationInput {
    pub item: Cow<'static, str>,
    pub click: ClickType,
}

impl ActivationInput {
    pub fn new(item: impl Into<Cow<'static, str>>, click: ClickType) -> Self {
        Self {
            item: item.into(),
            click,
        }
    }
}

/// Reference to another entity in the game world
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub id: Uuid,
    pub name: String,
}

/// Abilities triggered directly by item input.
///
/// Return `true` when the input was consumed by the ability.
pub trait ActivatesOnInput {
    fn activate(&mut self, input: &ActivationInput) -> bool;
}

/// Abilities triggered by pointing an item at another entity
pub trait TargetsEntity {
    fn target(&mut self, item: &str, entity: &EntityRef);
}

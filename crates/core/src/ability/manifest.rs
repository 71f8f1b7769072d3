//! Ability manifest: the descriptive metadata every ability type declares

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Ordinal power tier of an ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
    Special,
}

impl Rank {
    pub const ALL: [Rank; 6] = [Rank::S, Rank::A, Rank::B, Rank::C, Rank::D, Rank::Special];

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::S => write!(f, "S"),
            Rank::A => write!(f, "A"),
            Rank::B => write!(f, "B"),
            Rank::C => write!(f, "C"),
            Rank::D => write!(f, "D"),
            Rank::Special => write!(f, "Special"),
        }
    }
}

/// Flavour category of an ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Human,
    God,
    Demigod,
    Animal,
    Undead,
    Others,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::Human => "Human",
            Species::God => "God",
            Species::Demigod => "Demigod",
            Species::Animal => "Animal",
            Species::Undead => "Undead",
            Species::Others => "Others",
        };
        f.write_str(name)
    }
}

/// Name, rank, species and description of an ability type.
///
/// The name is the ability's unique lookup key in the registry. Description lines may
/// contain `$[Key]` tokens that render the current value of the ability's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityManifest {
    name: Cow<'static, str>,
    rank: Rank,
    species: Species,
    #[serde(default)]
    description: Vec<Cow<'static, str>>,
}

impl AbilityManifest {
    pub fn new(name: impl Into<Cow<'static, str>>, rank: Rank, species: Species) -> Self {
        Self {
            name: name.into(),
            rank,
            species,
            description: Vec::new(),
        }
    }

    pub fn with_description<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.description.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_line(mut self, line: impl Into<Cow<'static, str>>) -> Self {
        self.description.push(line.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn description(&self) -> &[Cow<'static, str>] {
        &self.description
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("manifest name is empty".to_string());
        }
        Ok(())
    }
}

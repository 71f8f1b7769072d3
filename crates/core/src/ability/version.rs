//! Server version gate for ability types

use super::AbilityKind;
use crate::error::RegistrationError;
use semver::Version;
use std::collections::HashSet;

/// Minimum server version an ability type needs, with an optional substitute type for
/// servers older than that
#[derive(Debug, Clone, PartialEq)]
pub struct Support {
    since: Version,
    alternative: Option<AbilityKind>,
}

impl Support {
    pub fn since(version: Version) -> Self {
        Self {
            since: version,
            alternative: None,
        }
    }

    /// Substitute type used when the running server is older than the minimum
    pub fn or_use(mut self, alternative: AbilityKind) -> Self {
        self.alternative = Some(alternative);
        self
    }

    pub fn minimum(&self) -> &Version {
        &self.since
    }

    pub fn alternative(&self) -> Option<AbilityKind> {
        self.alternative
    }

    pub fn is_satisfied_by(&self, running: &Version) -> bool {
        running >= &self.since
    }
}

/// Walk the alternative chain of `kind` until a type runs on `running`.
pub(crate) fn resolve(kind: AbilityKind, running: &Version) -> Result<AbilityKind, RegistrationError> {
    let mut current = kind;
    let mut visited = HashSet::new();

    while let Some(support) = current.support() {
        if !visited.insert(current.type_id()) {
            return Err(RegistrationError::malformed(
                kind.type_name(),
                format!("alternative chain loops back to {}", current.type_name()),
            ));
        }
        if support.is_satisfied_by(running) {
            break;
        }
        match support.alternative() {
            Some(alternative) => current = alternative,
            None => {
                return Err(RegistrationError::UnsupportedVersion {
                    ability: kind.type_name(),
                    required: support.minimum().clone(),
                    running: running.clone(),
                })
            }
        }
    }

    Ok(current)
}

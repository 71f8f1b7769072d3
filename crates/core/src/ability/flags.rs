//! Capability flags derived for each registered ability type

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capabilities an ability type declared, computed once at registration
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CapabilityFlags: u8 {
        /// Reacts to direct item activation
        const ACTIVE_SKILL = 0x1;
        /// Reacts to targeting another entity
        const TARGET_SKILL = 0x2;
        /// Unfinished or experimental
        const BETA = 0x4;
    }
}

impl CapabilityFlags {
    pub fn from_parts(active: bool, target: bool, beta: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::ACTIVE_SKILL, active);
        flags.set(Self::TARGET_SKILL, target);
        flags.set(Self::BETA, beta);
        flags
    }

    /// True when every bit of `flag` is set
    pub fn has_flag(self, flag: Self) -> bool {
        self & flag == flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_flag() {
        let flags = CapabilityFlags::from_parts(true, false, true);
        assert!(flags.has_flag(CapabilityFlags::ACTIVE_SKILL));
        assert!(!flags.has_flag(CapabilityFlags::TARGET_SKILL));
        assert!(flags.has_flag(CapabilityFlags::BETA));
        assert!(flags.has_flag(CapabilityFlags::ACTIVE_SKILL | CapabilityFlags::BETA));
        assert!(!flags.has_flag(CapabilityFlags::ACTIVE_SKILL | CapabilityFlags::TARGET_SKILL));
        assert_eq!(flags.bits(), 0x5);
    }

    #[test]
    fn test_empty_flags() {
        let flags = CapabilityFlags::from_parts(false, false, false);
        assert!(flags.is_empty());
        assert!(flags.has_flag(CapabilityFlags::empty()));
    }
}

//! Override state machine of the gaze scheduler
//!
//! Critical > Searching > Normal. A mode holds until the next sight resets it.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AttentionMode {
    #[default]
    Normal,
    /// A lost entity is being looked for; width selection searches all widths.
    Searching,
    /// Fastest possible sight at any cost; no body turn.
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeTrigger {
    SelfLocalizationLost,
    ForcedRequestRaised,
    /// A forced entity cannot be seen in time at the current pace, or is
    /// close enough to be sensed without looking.
    UnresolvableForced,
    NewSight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeMachine {
    mode: AttentionMode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AttentionMode {
        self.mode
    }

    pub fn is_critical(&self) -> bool {
        self.mode == AttentionMode::Critical
    }

    pub fn is_searching(&self) -> bool {
        self.mode >= AttentionMode::Searching
    }

    pub fn apply(&mut self, trigger: ModeTrigger) -> AttentionMode {
        let next = match trigger {
            ModeTrigger::NewSight => AttentionMode::Normal,
            ModeTrigger::SelfLocalizationLost | ModeTrigger::UnresolvableForced => {
                AttentionMode::Critical
            }
            ModeTrigger::ForcedRequestRaised => self.mode.max(AttentionMode::Searching),
        };
        if next != self.mode {
            debug!(from = ?self.mode, to = ?next, ?trigger, "attention mode");
        }
        self.mode = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_outranks_searching() {
        let mut m = ModeMachine::new();
        m.apply(ModeTrigger::UnresolvableForced);
        assert_eq!(m.apply(ModeTrigger::ForcedRequestRaised), AttentionMode::Critical);
        assert!(m.is_searching());
    }

    #[test]
    fn test_new_sight_resets() {
        let mut m = ModeMachine::new();
        m.apply(ModeTrigger::ForcedRequestRaised);
        assert_eq!(m.mode(), AttentionMode::Searching);
        m.apply(ModeTrigger::SelfLocalizationLost);
        assert!(m.is_critical());
        assert_eq!(m.apply(ModeTrigger::NewSight), AttentionMode::Normal);
    }
}

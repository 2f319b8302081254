//! Referee play modes as seen by the agent ("our" = own team).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    BeforeKickOff,
    PlayOn,

    OurKickOff,
    OurKickIn,
    OurCornerKick,
    OurGoalKick,
    OurFreeKick,
    OurIndirectFreeKick,
    OurBackPassKick,
    OurPenaltySetup,
    OurPenaltyReady,
    OurPenaltyTaken,

    OppKickOff,
    OppKickIn,
    OppCornerKick,
    OppGoalKick,
    OppFreeKick,
    OppIndirectFreeKick,
    OppBackPassKick,
    OppPenaltySetup,
    OppPenaltyReady,
    OppPenaltyTaken,
}

impl PlayMode {
    /// Dead ball: anything but play-on and before-kick-off.
    pub fn is_restart(self) -> bool {
        !matches!(self, PlayMode::PlayOn | PlayMode::BeforeKickOff)
    }

    pub fn is_ours(self) -> bool {
        matches!(
            self,
            PlayMode::OurKickOff
                | PlayMode::OurKickIn
                | PlayMode::OurCornerKick
                | PlayMode::OurGoalKick
                | PlayMode::OurFreeKick
                | PlayMode::OurIndirectFreeKick
                | PlayMode::OurBackPassKick
                | PlayMode::OurPenaltySetup
                | PlayMode::OurPenaltyReady
                | PlayMode::OurPenaltyTaken
        )
    }

    /// Restart awarded to the opponents.
    pub fn is_opponent_restart(self) -> bool {
        self.is_restart() && !self.is_ours()
    }

    pub fn is_kick_off(self) -> bool {
        matches!(self, PlayMode::OurKickOff | PlayMode::OppKickOff)
    }

    /// Penalty ready/taken for us: only the opponent goalie and the ball matter.
    pub fn is_our_penalty_shot(self) -> bool {
        matches!(self, PlayMode::OurPenaltyReady | PlayMode::OurPenaltyTaken)
    }

    pub fn is_our_penalty(self) -> bool {
        matches!(
            self,
            PlayMode::OurPenaltySetup | PlayMode::OurPenaltyReady | PlayMode::OurPenaltyTaken
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_classification() {
        assert!(!PlayMode::PlayOn.is_restart());
        assert!(!PlayMode::BeforeKickOff.is_restart());
        assert!(PlayMode::OurCornerKick.is_restart());
        assert!(PlayMode::OppKickIn.is_opponent_restart());
        assert!(!PlayMode::OurKickIn.is_opponent_restart());
    }

    #[test]
    fn test_penalty_predicates() {
        assert!(PlayMode::OurPenaltyTaken.is_our_penalty_shot());
        assert!(!PlayMode::OurPenaltySetup.is_our_penalty_shot());
        assert!(PlayMode::OurPenaltySetup.is_our_penalty());
        assert!(!PlayMode::OppPenaltyTaken.is_our_penalty());
    }
}

//! Tally invariant: successes never outrun completed rounds.

use super::Invariant;
use crate::Situation;

/// Invariant: round is at least 1 and `successes <= round - 1`.
pub struct TallyBoundedInvariant;

impl Invariant<Situation> for TallyBoundedInvariant {
    fn holds(situation: &Situation) -> bool {
        situation.round >= 1 && situation.mission_successes < situation.round
    }

    fn description() -> &'static str {
        "Mission successes do not exceed completed rounds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Player, PlayerCharacter, Role};

    fn situation() -> Situation {
        let seating = vec![PlayerCharacter::new(Player::new("solo"), Role::Spy)];
        Situation::new(seating).expect("valid seating")
    }

    #[test]
    fn test_holds_through_missions() {
        let mut situation = situation();
        for success in [true, false, true] {
            situation.complete_mission(success);
            assert!(TallyBoundedInvariant::holds(&situation));
        }
    }

    #[test]
    fn test_round_zero_violates() {
        let mut situation = situation();
        situation.round = 0;
        assert!(!TallyBoundedInvariant::holds(&situation));
    }

    #[test]
    fn test_successes_ahead_of_rounds_violates() {
        let mut situation = situation();
        situation.mission_successes = 1;
        assert!(!TallyBoundedInvariant::holds(&situation));
    }
}

//! Win/loss evaluation from the mission tally.

use crate::rules::WINNING_MISSIONS;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of evaluating a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum GameOutcome {
    /// Three missions succeeded.
    ResistanceWin,
    /// Three missions failed, or too many proposals were rejected.
    SpyWin,
    /// Neither side has won yet.
    Ongoing,
}

impl GameOutcome {
    /// Returns true once either side has won.
    pub fn is_decided(self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }
}

/// Pure evaluator for "first to three mission outcomes of one kind wins".
#[derive(Debug, Clone, Copy, Default)]
pub struct GameOutcomeEvaluator;

impl GameOutcomeEvaluator {
    /// Evaluates the tally of completed missions.
    #[instrument]
    pub fn evaluate(successes: usize, fails: usize) -> GameOutcome {
        if successes >= WINNING_MISSIONS {
            GameOutcome::ResistanceWin
        } else if fails >= WINNING_MISSIONS {
            GameOutcome::SpyWin
        } else {
            GameOutcome::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_successes_resistance_wins() {
        assert_eq!(GameOutcomeEvaluator::evaluate(3, 0), GameOutcome::ResistanceWin);
        assert_eq!(GameOutcomeEvaluator::evaluate(3, 2), GameOutcome::ResistanceWin);
    }

    #[test]
    fn test_three_fails_spies_win() {
        assert_eq!(GameOutcomeEvaluator::evaluate(0, 3), GameOutcome::SpyWin);
        assert_eq!(GameOutcomeEvaluator::evaluate(2, 3), GameOutcome::SpyWin);
    }

    #[test]
    fn test_otherwise_ongoing() {
        for successes in 0..3 {
            for fails in 0..3 {
                let outcome = GameOutcomeEvaluator::evaluate(successes, fails);
                assert_eq!(outcome, GameOutcome::Ongoing);
                assert!(!outcome.is_decided());
            }
        }
    }
}

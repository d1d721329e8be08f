//! Error taxonomy for the game engine.

use crate::player::Player;

/// Broad class of a [`SituationError`], telling the orchestrator how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// The session cannot proceed and must be aborted.
    Configuration,
    /// The named player is not part of this session; re-prompt the user.
    NotFound,
    /// The caller broke the engine's contract; nothing was changed.
    InvariantViolation,
    /// The viewer may not see the requested secret.
    Unauthorized,
}

/// Error raised by [`Situation`](crate::Situation) queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SituationError {
    /// The seating size is outside the supported ruleset.
    #[display("No ruleset for {} players", player_count)]
    Configuration {
        /// Number of seated players.
        player_count: usize,
    },

    /// The round is past the last mission in the ruleset.
    #[display("No mission defined for round {}", round)]
    RoundOutOfRange {
        /// The current round (1-indexed).
        round: usize,
    },

    /// The player never joined this session.
    #[display("{} is not in this game", _0)]
    NotFound(Player),

    /// A player named in a team or vote is not seated.
    #[display("{} is not seated at this table", _0)]
    NotSeated(Player),

    /// The same player appears twice in the seating.
    #[display("{} is seated more than once", _0)]
    DuplicateSeat(Player),

    /// A session needs at least one seated player.
    #[display("Seating is empty")]
    EmptySeating,

    /// The viewer may not see this information.
    #[display("Not authorized to see {}", _0)]
    Unauthorized(String),

    /// A state snapshot or transition broke an engine invariant.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl SituationError {
    /// Classifies the error for recovery.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SituationError::Configuration { .. } | SituationError::RoundOutOfRange { .. } => {
                ErrorKind::Configuration
            }
            SituationError::NotFound(_) => ErrorKind::NotFound,
            SituationError::Unauthorized(_) => ErrorKind::Unauthorized,
            SituationError::NotSeated(_)
            | SituationError::DuplicateSeat(_)
            | SituationError::EmptySeating
            | SituationError::InvariantViolation(_) => ErrorKind::InvariantViolation,
        }
    }
}

impl std::error::Error for SituationError {}

/// Error raised while moving a round through its phases.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TransitionError {
    /// The underlying situation rejected the operation.
    #[display("{}", _0)]
    Situation(SituationError),

    /// Someone other than the leader tried to propose a team.
    #[display("{} is not the leader", _0)]
    NotLeader(Player),

    /// The proposed team has the wrong number of members.
    #[display("Team needs {} members, got {}", required, proposed)]
    WrongTeamSize {
        /// Size demanded by the ruleset.
        required: usize,
        /// Size of the proposal.
        proposed: usize,
    },

    /// A player voted or played a card twice.
    #[display("{} already acted this phase", _0)]
    AlreadyActed(Player),

    /// A player outside the team tried to play a mission card.
    #[display("{} is not on the mission team", _0)]
    NotOnTeam(Player),

    /// A resistance member tried to play a fail card.
    #[display("{} may only play success cards", _0)]
    IllegalCard(Player),

    /// Not every participant has acted yet.
    #[display("Waiting on {} more", _0)]
    Incomplete(usize),

    /// A postcondition check failed after a transition.
    #[display("Postcondition failed: {}", _0)]
    Postcondition(String),
}

impl std::error::Error for TransitionError {}

impl From<SituationError> for TransitionError {
    fn from(err: SituationError) -> Self {
        TransitionError::Situation(err)
    }
}

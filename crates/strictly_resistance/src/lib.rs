//! Game-state and turn-progression engine for The Resistance.
//!
//! This crate tracks one session: who is seated, their secret roles,
//! who leads, which team is proposed, and how the missions have gone.
//! It performs no I/O and holds no locks; one owner drives a
//! [`Situation`] at a time.
//!
//! # Architecture
//!
//! - **Rules**: the canonical tables as data ([`RulesRegistry`])
//! - **Situation**: the mutable aggregate and its queries
//! - **Secrecy**: who may see which roles ([`Viewer`])
//! - **Typestate**: the round state machine as consuming types
//! - **Contracts / invariants**: checked pre- and postconditions
//!
//! # Example
//!
//! ```
//! use strictly_resistance::{GameOutcome, Player, PlayerCharacter, Role, Situation};
//!
//! let seating = ["p1", "p2", "p3", "p4", "p5"]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, h)| {
//!         let role = if i < 2 { Role::Spy } else { Role::Resistance };
//!         PlayerCharacter::new(Player::new(h), role)
//!     })
//!     .collect();
//!
//! let mut situation = Situation::new(seating)?;
//! assert_eq!(situation.required_team_size()?, 2);
//!
//! situation.complete_mission(true);
//! assert_eq!(situation.round_number(), 2);
//! assert_eq!(situation.outcome(), GameOutcome::Ongoing);
//! # Ok::<(), strictly_resistance::SituationError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod assignment;
mod contracts;
mod error;
pub mod invariants;
mod mission;
mod outcome;
mod player;
mod rules;
mod secrecy;
mod situation;
mod snapshot;
mod typestate;
mod vote;

// Crate-level exports - Identities
pub use player::{Player, PlayerCharacter, Role};

// Crate-level exports - Rules
pub use rules::{MAX_PLAYERS, MAX_REJECTED_PROPOSALS, MIN_PLAYERS, ROUNDS, RulesRegistry, WINNING_MISSIONS};

// Crate-level exports - Situation
pub use secrecy::Viewer;
pub use situation::Situation;
pub use snapshot::{PhaseTag, RoundSnapshot, SituationSnapshot};

// Crate-level exports - Outcome
pub use outcome::{GameOutcome, GameOutcomeEvaluator};

// Crate-level exports - Errors
pub use error::{ErrorKind, SituationError, TransitionError};

// Crate-level exports - Round flow
pub use action::TeamProposal;
pub use assignment::assign_roles;
pub use contracts::{
    Contract, LegalProposal, MembersSeated, MissionContract, ProposalContract, ProposerLeads,
    TeamSizeMatches,
};
pub use mission::{MissionCard, MissionCards};
pub use typestate::{
    AwaitingTeamProposal, GameFinished, MissionResolved, MissionUnderway, Refused, RoundPhase,
    RoundTransition, TeamProposed, VoteResult,
};
pub use vote::TeamVote;

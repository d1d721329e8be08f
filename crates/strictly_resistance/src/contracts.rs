//! Contract-based validation for round transitions.
//!
//! Contracts pair a precondition on (state, action) with a postcondition
//! relating the state before and after: {P} action {Q}.

use crate::action::TeamProposal;
use crate::error::{SituationError, TransitionError};
use crate::invariants::{InvariantSet, SituationInvariants};
use crate::situation::Situation;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for one kind of transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), TransitionError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), TransitionError>;
}

fn invariants_hold(after: &Situation) -> Result<(), TransitionError> {
    SituationInvariants::check_all(after).map_err(|violations| {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        TransitionError::Postcondition(descriptions)
    })
}

// ─────────────────────────────────────────────────────────────
//  Proposal Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the proposer is the current leader.
pub struct ProposerLeads;

impl ProposerLeads {
    /// Fails with [`TransitionError::NotLeader`] unless the proposer leads.
    #[instrument(skip(proposal, situation))]
    pub fn check(proposal: &TeamProposal, situation: &Situation) -> Result<(), TransitionError> {
        if situation.leader().player() != &proposal.leader {
            warn!(proposer = %proposal.leader, "Proposal from non-leader");
            Err(TransitionError::NotLeader(proposal.leader.clone()))
        } else {
            Ok(())
        }
    }
}

/// Precondition: every proposed member is seated.
pub struct MembersSeated;

impl MembersSeated {
    /// Fails with [`SituationError::NotSeated`] for the first outsider named.
    #[instrument(skip(proposal, situation))]
    pub fn check(proposal: &TeamProposal, situation: &Situation) -> Result<(), TransitionError> {
        match proposal
            .members
            .iter()
            .find(|member| situation.seat_of(member).is_none())
        {
            Some(outsider) => Err(SituationError::NotSeated(outsider.clone()).into()),
            None => Ok(()),
        }
    }
}

/// Precondition: the team has exactly the size the round demands.
pub struct TeamSizeMatches;

impl TeamSizeMatches {
    /// Fails with [`TransitionError::WrongTeamSize`], counting distinct members.
    #[instrument(skip(proposal, situation))]
    pub fn check(proposal: &TeamProposal, situation: &Situation) -> Result<(), TransitionError> {
        let required = situation.required_team_size()?;
        let proposed = proposal.distinct_members();
        if proposed != required {
            warn!(required, proposed, "Wrong team size");
            Err(TransitionError::WrongTeamSize { required, proposed })
        } else {
            Ok(())
        }
    }
}

/// Composite precondition: a proposal is legal if it comes from the
/// leader, names only seated players, and has the right size.
pub struct LegalProposal;

impl LegalProposal {
    /// Validates all preconditions for a proposal.
    #[instrument(skip(proposal, situation))]
    pub fn check(proposal: &TeamProposal, situation: &Situation) -> Result<(), TransitionError> {
        ProposerLeads::check(proposal, situation)?;
        MembersSeated::check(proposal, situation)?;
        TeamSizeMatches::check(proposal, situation)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Proposal Contract
// ─────────────────────────────────────────────────────────────

/// Contract for team proposals.
///
/// Postconditions: round, tally, and leader are untouched, and all
/// situation invariants still hold.
pub struct ProposalContract;

impl Contract<Situation, TeamProposal> for ProposalContract {
    fn pre(situation: &Situation, proposal: &TeamProposal) -> Result<(), TransitionError> {
        LegalProposal::check(proposal, situation)
    }

    fn post(before: &Situation, after: &Situation) -> Result<(), TransitionError> {
        if before.round != after.round
            || before.mission_successes != after.mission_successes
            || before.leader != after.leader
        {
            return Err(TransitionError::Postcondition(
                "Proposal changed round, tally, or leader".to_string(),
            ));
        }
        invariants_hold(after)
    }
}

// ─────────────────────────────────────────────────────────────
//  Mission Contract
// ─────────────────────────────────────────────────────────────

/// Contract for completing a mission with a given result.
///
/// Postconditions: the round advanced by exactly one, successes grew by
/// one for a success and not at all for a failure, and all situation
/// invariants still hold.
pub struct MissionContract;

impl MissionContract {
    /// Checks the tally moved the way `success` says it should.
    pub fn post_with(before: &Situation, after: &Situation, success: bool) -> Result<(), TransitionError> {
        Self::post(before, after)?;
        let gained = after.mission_successes - before.mission_successes;
        if gained != usize::from(success) {
            return Err(TransitionError::Postcondition(format!(
                "Mission recorded {} successes for success={}",
                gained, success
            )));
        }
        Ok(())
    }
}

impl Contract<Situation, bool> for MissionContract {
    fn pre(_situation: &Situation, _success: &bool) -> Result<(), TransitionError> {
        Ok(())
    }

    fn post(before: &Situation, after: &Situation) -> Result<(), TransitionError> {
        if after.round != before.round + 1 {
            return Err(TransitionError::Postcondition(
                "Round did not advance by one".to_string(),
            ));
        }
        if after.mission_successes < before.mission_successes
            || after.mission_successes > before.mission_successes + 1
        {
            return Err(TransitionError::Postcondition(
                "Successes moved by more than one".to_string(),
            ));
        }
        invariants_hold(after)
    }
}

//! Phase-specific typestate structs for one round of play.
//!
//! Each phase is its own type, so a mission can only be completed after
//! its team was approved, and a finished game always carries a decided
//! outcome rather than `Ongoing`.
//!
//! ```text
//! AwaitingTeamProposal ──propose──▶ TeamProposed ──approve──▶ MissionUnderway
//!        ▲                              │                          │
//!        │                            reject                    complete
//!        │                              ▼                          ▼
//!        └───────── next_round ◀──── (leader advanced) ◀──── MissionResolved
//! ```

use crate::action::TeamProposal;
use crate::contracts::{Contract, MissionContract, ProposalContract};
use crate::error::{SituationError, TransitionError};
use crate::mission::MissionCards;
use crate::outcome::GameOutcome;
use crate::player::PlayerCharacter;
use crate::rules::MAX_REJECTED_PROPOSALS;
use crate::secrecy::Viewer;
use crate::situation::Situation;
use crate::snapshot::{PhaseTag, RoundSnapshot};
use crate::vote::TeamVote;
use tracing::{info, instrument, warn};

/// A refused transition: the untouched state and the reason.
#[derive(Debug)]
pub struct Refused<S> {
    /// The state, exactly as it was before the attempt.
    pub state: S,
    /// Why the transition was refused.
    pub error: TransitionError,
}

impl<S> Refused<S> {
    fn new(state: S, error: impl Into<TransitionError>) -> Self {
        Self {
            state,
            error: error.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Awaiting Team Proposal
// ─────────────────────────────────────────────────────────────

/// The leader has yet to propose a team this round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwaitingTeamProposal {
    situation: Situation,
    rejected_proposals: usize,
}

impl AwaitingTeamProposal {
    /// Begins play from a freshly built or restored situation.
    ///
    /// Any staged team is cleared.
    #[instrument(skip(situation), fields(round = situation.round_number()))]
    pub fn new(mut situation: Situation) -> Self {
        situation.clear_team();
        Self {
            situation,
            rejected_proposals: 0,
        }
    }

    /// The underlying situation.
    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    /// Consecutive proposals rejected this round.
    pub fn rejected_proposals(&self) -> usize {
        self.rejected_proposals
    }

    /// Proposes a team, checking leader, membership, and size.
    #[instrument(skip(self, proposal), fields(proposal = %proposal))]
    pub fn propose_team(mut self, proposal: TeamProposal) -> Result<TeamProposed, Refused<Self>> {
        if let Err(error) = ProposalContract::pre(&self.situation, &proposal) {
            return Err(Refused::new(self, error));
        }

        #[cfg(debug_assertions)]
        let before = self.situation.clone();

        if let Err(error) = self.situation.set_team(&proposal.members) {
            return Err(Refused::new(self, error));
        }

        #[cfg(debug_assertions)]
        if let Err(error) = ProposalContract::post(&before, &self.situation) {
            return Err(Refused::new(self, error));
        }

        info!("Team proposed");
        Ok(TeamProposed {
            situation: self.situation,
            rejected_proposals: self.rejected_proposals,
        })
    }

    /// Returns to a plain situation, e.g. for persistence.
    pub fn into_situation(self) -> Situation {
        self.situation
    }
}

// ─────────────────────────────────────────────────────────────
//  Team Proposed
// ─────────────────────────────────────────────────────────────

/// A team is on the table awaiting the approval vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamProposed {
    situation: Situation,
    rejected_proposals: usize,
}

/// Result of putting a proposal to the vote.
#[derive(Debug)]
pub enum VoteResult {
    /// The team goes on the mission.
    Approved(MissionUnderway),
    /// Leadership passed on; propose again.
    Rejected(AwaitingTeamProposal),
    /// Too many rejections in a row; the spies win.
    Finished(GameFinished),
}

impl TeamProposed {
    /// The underlying situation.
    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    /// The proposed team, in table order.
    pub fn team(&self) -> Vec<&PlayerCharacter> {
        self.situation.team()
    }

    /// Applies a completed vote.
    #[instrument(skip(self, vote))]
    pub fn decide(self, vote: &TeamVote) -> Result<VoteResult, Refused<Self>> {
        match vote.decide(&self.situation) {
            Ok(true) => Ok(VoteResult::Approved(self.approve())),
            Ok(false) => Ok(self.reject()),
            Err(error) => Err(Refused::new(self, error)),
        }
    }

    /// The table approved the team.
    #[instrument(skip(self))]
    pub fn approve(self) -> MissionUnderway {
        info!(size = self.situation.team.len(), "Team approved");
        MissionUnderway {
            situation: self.situation,
            rejected_proposals: self.rejected_proposals,
        }
    }

    /// The table rejected the team: leadership passes on and the team is cleared.
    ///
    /// The fifth consecutive rejection ends the game for the spies.
    #[instrument(skip(self))]
    pub fn reject(mut self) -> VoteResult {
        let rejected = self.rejected_proposals + 1;
        if rejected >= MAX_REJECTED_PROPOSALS {
            warn!(rejected, "Too many rejected proposals");
            return VoteResult::Finished(GameFinished {
                situation: self.situation,
                outcome: GameOutcome::SpyWin,
                rejected_proposals: rejected,
            });
        }

        self.situation.clear_team();
        self.situation.advance_leader();
        info!(rejected, "Team rejected");
        VoteResult::Rejected(AwaitingTeamProposal {
            situation: self.situation,
            rejected_proposals: rejected,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Mission Underway
// ─────────────────────────────────────────────────────────────

/// An approved team is out on the mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionUnderway {
    situation: Situation,
    rejected_proposals: usize,
}

impl MissionUnderway {
    /// The underlying situation.
    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    /// Resolves the mission from the cards the team played.
    #[instrument(skip(self, cards))]
    pub fn resolve(self, cards: &MissionCards) -> Result<MissionResolved, Refused<Self>> {
        match cards.resolve(&self.situation) {
            Ok(success) => self.complete(success),
            Err(error) => Err(Refused::new(self, error)),
        }
    }

    /// Records a mission result decided elsewhere.
    #[instrument(skip(self))]
    pub fn complete(self, success: bool) -> Result<MissionResolved, Refused<Self>> {
        let before = self.situation.clone();
        let mut situation = self.situation;
        situation.complete_mission(success);

        if let Err(error) = MissionContract::post_with(&before, &situation, success) {
            let state = MissionUnderway {
                situation: before,
                rejected_proposals: self.rejected_proposals,
            };
            return Err(Refused::new(state, error));
        }

        Ok(MissionResolved { situation, success })
    }
}

// ─────────────────────────────────────────────────────────────
//  Mission Resolved
// ─────────────────────────────────────────────────────────────

/// The mission's result is in and recorded in the tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionResolved {
    situation: Situation,
    success: bool,
}

/// Where play goes after a round.
#[derive(Debug)]
pub enum RoundTransition {
    /// Play continues with a new leader.
    Continue(AwaitingTeamProposal),
    /// One side has won.
    Finished(GameFinished),
}

impl MissionResolved {
    /// The underlying situation.
    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    /// Whether the mission succeeded.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Evaluates the tally; if nobody has won, hands leadership on.
    #[instrument(skip(self), fields(success = self.success))]
    pub fn next_round(mut self) -> RoundTransition {
        let outcome = self.situation.outcome();
        if outcome.is_decided() {
            info!(%outcome, "Game over");
            return RoundTransition::Finished(GameFinished {
                situation: self.situation,
                outcome,
                rejected_proposals: 0,
            });
        }

        self.situation.clear_team();
        self.situation.advance_leader();
        RoundTransition::Continue(AwaitingTeamProposal {
            situation: self.situation,
            rejected_proposals: 0,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Game Finished
// ─────────────────────────────────────────────────────────────

/// The game is over. The outcome is always decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFinished {
    situation: Situation,
    outcome: GameOutcome,
    rejected_proposals: usize,
}

impl GameFinished {
    /// Who won. Never [`GameOutcome::Ongoing`].
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// The final situation.
    pub fn situation(&self) -> &Situation {
        &self.situation
    }

    /// Reveals the spies to everyone now that the game is over.
    pub fn reveal_spies(&self) -> Vec<&PlayerCharacter> {
        self.situation
            .spies(&Viewer::Moderator)
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────
//  Any phase
// ─────────────────────────────────────────────────────────────

/// Any round phase, for owners that hold a session across calls.
#[derive(Debug)]
pub enum RoundPhase {
    /// See [`AwaitingTeamProposal`].
    AwaitingTeamProposal(AwaitingTeamProposal),
    /// See [`TeamProposed`].
    TeamProposed(TeamProposed),
    /// See [`MissionUnderway`].
    MissionUnderway(MissionUnderway),
    /// See [`GameFinished`].
    Finished(GameFinished),
}

impl RoundPhase {
    /// The situation inside whichever phase this is.
    pub fn situation(&self) -> &Situation {
        match self {
            RoundPhase::AwaitingTeamProposal(p) => p.situation(),
            RoundPhase::TeamProposed(p) => p.situation(),
            RoundPhase::MissionUnderway(p) => p.situation(),
            RoundPhase::Finished(p) => p.situation(),
        }
    }

    /// Captures the phase for persistence.
    pub fn snapshot(&self) -> RoundSnapshot {
        let (situation, phase, rejected_proposals) = match self {
            RoundPhase::AwaitingTeamProposal(p) => {
                (&p.situation, PhaseTag::AwaitingTeamProposal, p.rejected_proposals)
            }
            RoundPhase::TeamProposed(p) => {
                (&p.situation, PhaseTag::TeamProposed, p.rejected_proposals)
            }
            RoundPhase::MissionUnderway(p) => {
                (&p.situation, PhaseTag::MissionUnderway, p.rejected_proposals)
            }
            RoundPhase::Finished(p) => (
                &p.situation,
                PhaseTag::Finished {
                    outcome: p.outcome,
                },
                p.rejected_proposals,
            ),
        };
        RoundSnapshot {
            situation: situation.clone(),
            phase,
            rejected_proposals,
        }
    }

    /// Restores a phase from a snapshot, rejecting inconsistent ones.
    ///
    /// A finished game must carry an outcome its tally or rejection count
    /// accounts for; an unfinished one must have an undecided tally, fewer
    /// than [`MAX_REJECTED_PROPOSALS`] rejections, and a team that fits
    /// its phase.
    #[instrument(skip(snapshot), fields(round = snapshot.situation.round_number()))]
    pub fn restore(snapshot: RoundSnapshot) -> Result<Self, SituationError> {
        let RoundSnapshot {
            situation,
            phase,
            rejected_proposals,
        } = snapshot;

        let phase = match phase {
            PhaseTag::Finished { outcome } => {
                check_finished(&situation, outcome, rejected_proposals)?;
                RoundPhase::Finished(GameFinished {
                    situation,
                    outcome,
                    rejected_proposals,
                })
            }
            PhaseTag::AwaitingTeamProposal => {
                check_unfinished(&situation, rejected_proposals)?;
                if !situation.team.is_empty() {
                    return Err(SituationError::InvariantViolation(
                        "Team staged before any proposal".to_string(),
                    ));
                }
                RoundPhase::AwaitingTeamProposal(AwaitingTeamProposal {
                    situation,
                    rejected_proposals,
                })
            }
            PhaseTag::TeamProposed => {
                check_unfinished(&situation, rejected_proposals)?;
                check_team_size(&situation)?;
                RoundPhase::TeamProposed(TeamProposed {
                    situation,
                    rejected_proposals,
                })
            }
            PhaseTag::MissionUnderway => {
                check_unfinished(&situation, rejected_proposals)?;
                check_team_size(&situation)?;
                RoundPhase::MissionUnderway(MissionUnderway {
                    situation,
                    rejected_proposals,
                })
            }
        };
        info!(phase = phase.name(), rejected_proposals, "Round restored");
        Ok(phase)
    }

    /// Short name of the phase.
    pub fn name(&self) -> &'static str {
        match self {
            RoundPhase::AwaitingTeamProposal(_) => "awaiting team proposal",
            RoundPhase::TeamProposed(_) => "team proposed",
            RoundPhase::MissionUnderway(_) => "mission underway",
            RoundPhase::Finished(_) => "finished",
        }
    }
}

/// A finished game's outcome must be explained by its tally, or by
/// the rejection limit while the tally is still open.
fn check_finished(
    situation: &Situation,
    outcome: GameOutcome,
    rejected_proposals: usize,
) -> Result<(), SituationError> {
    let tally = situation.outcome();
    let explained = match outcome {
        GameOutcome::Ongoing => false,
        GameOutcome::SpyWin if tally == GameOutcome::Ongoing => {
            rejected_proposals >= MAX_REJECTED_PROPOSALS
        }
        decided => tally == decided,
    };
    if !explained {
        warn!(%outcome, %tally, "Finished snapshot contradicts its tally");
        return Err(SituationError::InvariantViolation(format!(
            "Finished with {} but tally reads {} after {} rejections",
            outcome, tally, rejected_proposals
        )));
    }
    Ok(())
}

fn check_unfinished(situation: &Situation, rejected_proposals: usize) -> Result<(), SituationError> {
    let tally = situation.outcome();
    if tally.is_decided() {
        return Err(SituationError::InvariantViolation(format!(
            "Tally reads {} but the game is not finished",
            tally
        )));
    }
    if rejected_proposals >= MAX_REJECTED_PROPOSALS {
        return Err(SituationError::InvariantViolation(format!(
            "{} rejections but the game is not finished",
            rejected_proposals
        )));
    }
    Ok(())
}

fn check_team_size(situation: &Situation) -> Result<(), SituationError> {
    let required = situation.required_team_size()?;
    let team = situation.team.len();
    if team != required {
        return Err(SituationError::InvariantViolation(format!(
            "Team of {} where the round needs {}",
            team, required
        )));
    }
    Ok(())
}

impl From<VoteResult> for RoundPhase {
    fn from(result: VoteResult) -> Self {
        match result {
            VoteResult::Approved(p) => RoundPhase::MissionUnderway(p),
            VoteResult::Rejected(p) => RoundPhase::AwaitingTeamProposal(p),
            VoteResult::Finished(p) => RoundPhase::Finished(p),
        }
    }
}

impl From<RoundTransition> for RoundPhase {
    fn from(transition: RoundTransition) -> Self {
        match transition {
            RoundTransition::Continue(p) => RoundPhase::AwaitingTeamProposal(p),
            RoundTransition::Finished(p) => RoundPhase::Finished(p),
        }
    }
}

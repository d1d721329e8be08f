//! Persisted layout of a [`Situation`] and of the round around it.
//!
//! A snapshot names the leader and team by player so the file reads
//! naturally and survives reordering bugs; restoring re-checks every
//! invariant before handing back a live situation.
//!
//! Snapshots are the one place roles are serialized. They are meant for
//! the orchestrator's own storage, never for players.

use crate::error::SituationError;
use crate::outcome::GameOutcome;
use crate::player::{Player, PlayerCharacter, Role};
use crate::situation::Situation;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One seat as persisted: the player and their role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SeatRecord {
    player: Player,
    role: Role,
}

/// Serializable record of a full situation, roles included.
///
/// The seating is not exposed through accessors; read roles from a
/// restored [`Situation`] with a [`Viewer`](crate::Viewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SituationSnapshot {
    /// Characters in table order.
    #[getter(skip)]
    seating: Vec<SeatRecord>,
    /// Current leader.
    leader: Player,
    /// Proposed team, in table order.
    team: Vec<Player>,
    /// Current round, 1-indexed.
    round: usize,
    /// Successful missions so far.
    mission_successes: usize,
}

impl From<&Situation> for SituationSnapshot {
    fn from(situation: &Situation) -> Self {
        Self {
            seating: situation
                .seating
                .iter()
                .map(|pc| SeatRecord {
                    player: pc.player().clone(),
                    role: pc.role(),
                })
                .collect(),
            leader: situation.leader().player().clone(),
            team: situation
                .team()
                .into_iter()
                .map(|pc| pc.player().clone())
                .collect(),
            round: situation.round,
            mission_successes: situation.mission_successes,
        }
    }
}

impl From<Situation> for SituationSnapshot {
    fn from(situation: Situation) -> Self {
        Self::from(&situation)
    }
}

impl TryFrom<SituationSnapshot> for Situation {
    type Error = SituationError;

    #[instrument(skip(snapshot), fields(round = snapshot.round))]
    fn try_from(snapshot: SituationSnapshot) -> Result<Self, Self::Error> {
        let seating = snapshot
            .seating
            .into_iter()
            .map(|seat| PlayerCharacter::new(seat.player, seat.role))
            .collect();
        Situation::from_parts(
            seating,
            &snapshot.leader,
            &snapshot.team,
            snapshot.round,
            snapshot.mission_successes,
        )
    }
}

impl Situation {
    /// Captures the full state for persistence.
    pub fn snapshot(&self) -> SituationSnapshot {
        SituationSnapshot::from(self)
    }

    /// Restores a situation from a snapshot, rejecting inconsistent ones.
    pub fn restore(snapshot: SituationSnapshot) -> Result<Self, SituationError> {
        Self::try_from(snapshot)
    }
}

/// Which phase of the round a [`RoundSnapshot`] was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseTag {
    /// Waiting for the leader's proposal.
    AwaitingTeamProposal,
    /// The situation's team is up for the vote.
    TeamProposed,
    /// The situation's team is on the mission.
    MissionUnderway,
    /// The game is over.
    Finished {
        /// Who won.
        outcome: GameOutcome,
    },
}

/// Serializable record of a [`RoundPhase`](crate::RoundPhase).
///
/// Carries what the situation alone cannot: the phase, the consecutive
/// rejections this round, and the outcome of a game that ended by
/// rejection while the tally still reads `Ongoing`.
/// Restore with [`RoundPhase::restore`](crate::RoundPhase::restore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RoundSnapshot {
    /// The situation, roles included.
    pub(crate) situation: Situation,
    /// Phase the round was in.
    pub(crate) phase: PhaseTag,
    /// Consecutive proposals rejected this round.
    pub(crate) rejected_proposals: usize,
}

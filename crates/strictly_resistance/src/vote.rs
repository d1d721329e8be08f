//! Approval vote on a proposed team.

use crate::error::{SituationError, TransitionError};
use crate::player::Player;
use crate::situation::Situation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Tally of approve/reject votes from the seated players.
///
/// Each seated player votes once. The team is approved when approvals
/// are a strict majority of the whole table.
///
/// Deserialized votes are unchecked until [`replay`](Self::replay)ed
/// against the situation they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamVote {
    ballots: BTreeMap<Player, bool>,
}

impl TeamVote {
    /// Starts an empty vote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `voter`'s ballot.
    #[instrument(skip(self, situation, voter), fields(voter = %voter))]
    pub fn cast(
        &mut self,
        situation: &Situation,
        voter: &Player,
        approve: bool,
    ) -> Result<(), TransitionError> {
        if situation.seat_of(voter).is_none() {
            warn!("Vote from unseated player");
            return Err(SituationError::NotSeated(voter.clone()).into());
        }
        if self.ballots.contains_key(voter) {
            warn!("Duplicate vote");
            return Err(TransitionError::AlreadyActed(voter.clone()));
        }
        self.ballots.insert(voter.clone(), approve);
        debug!(cast = self.ballots.len(), "Vote recorded");
        Ok(())
    }

    /// Re-casts every ballot against `situation`, e.g. after loading.
    #[instrument(skip(self, situation), fields(ballots = self.ballots.len()))]
    pub fn replay(&self, situation: &Situation) -> Result<Self, TransitionError> {
        let mut vote = Self::new();
        for (voter, &approve) in &self.ballots {
            vote.cast(situation, voter, approve)?;
        }
        Ok(vote)
    }

    /// Number of ballots cast.
    pub fn cast_count(&self) -> usize {
        self.ballots.len()
    }

    /// Number of approvals.
    pub fn approvals(&self) -> usize {
        self.ballots.values().filter(|&&approve| approve).count()
    }

    /// Number of rejections.
    pub fn rejections(&self) -> usize {
        self.cast_count() - self.approvals()
    }

    /// Returns true once every seated player has voted.
    pub fn is_complete(&self, situation: &Situation) -> bool {
        self.ballots.len() == situation.player_count()
    }

    /// Decides the vote: `true` if the team is approved.
    ///
    /// Fails with [`TransitionError::Incomplete`] while ballots are missing.
    pub fn decide(&self, situation: &Situation) -> Result<bool, TransitionError> {
        let table = situation.player_count();
        if self.ballots.len() < table {
            return Err(TransitionError::Incomplete(table - self.ballots.len()));
        }
        Ok(self.approvals() * 2 > situation.player_count())
    }

    /// How each player voted, once the vote is public.
    pub fn ballots(&self) -> &BTreeMap<Player, bool> {
        &self.ballots
    }
}

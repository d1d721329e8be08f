//! Mission cards played by the team.

use crate::error::{SituationError, TransitionError};
use crate::player::Player;
use crate::situation::Situation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// A card played face down on a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MissionCard {
    /// Support the mission.
    Success,
    /// Sabotage the mission. Only spies may play this.
    Fail,
}

/// Cards collected from the current team.
///
/// Only team members may play, once each, and resistance members may
/// only play [`MissionCard::Success`]. Who played which card is never
/// exposed; only the counts are. The serialized form is the exception
/// and belongs in the orchestrator's own storage; deserialized cards are
/// unchecked until [`replay`](Self::replay)ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionCards {
    played: BTreeMap<Player, MissionCard>,
}

impl MissionCards {
    /// Starts an empty mission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `player`'s card.
    #[instrument(skip(self, situation, player, card), fields(player = %player))]
    pub fn play(
        &mut self,
        situation: &Situation,
        player: &Player,
        card: MissionCard,
    ) -> Result<(), TransitionError> {
        let character = situation
            .player_character_for(player)
            .map_err(|_| SituationError::NotSeated(player.clone()))?;
        if !situation.is_on_team(player) {
            warn!("Card from player off the team");
            return Err(TransitionError::NotOnTeam(player.clone()));
        }
        if self.played.contains_key(player) {
            warn!("Duplicate card");
            return Err(TransitionError::AlreadyActed(player.clone()));
        }
        if card == MissionCard::Fail && !character.is_spy() {
            warn!("Illegal card rejected");
            return Err(TransitionError::IllegalCard(player.clone()));
        }
        self.played.insert(player.clone(), card);
        debug!(played = self.played.len(), "Card recorded");
        Ok(())
    }

    /// Re-plays every card against `situation`, e.g. after loading.
    #[instrument(skip(self, situation), fields(played = self.played.len()))]
    pub fn replay(&self, situation: &Situation) -> Result<Self, TransitionError> {
        let mut cards = Self::new();
        for (player, &card) in &self.played {
            cards.play(situation, player, card)?;
        }
        Ok(cards)
    }

    /// Number of cards played.
    pub fn played_count(&self) -> usize {
        self.played.len()
    }

    /// Number of fail cards played.
    pub fn fail_count(&self) -> usize {
        self.played
            .values()
            .filter(|&&card| card == MissionCard::Fail)
            .count()
    }

    /// Decides the mission: `true` if it succeeded.
    ///
    /// Every team member must have played. The mission fails once the
    /// fail cards reach the round's threshold.
    #[instrument(skip(self, situation))]
    pub fn resolve(&self, situation: &Situation) -> Result<bool, TransitionError> {
        let team = situation.team().len();
        if self.played.len() < team {
            return Err(TransitionError::Incomplete(team - self.played.len()));
        }
        let threshold = situation.fails_required()?;
        let fails = self.fail_count();
        let success = fails < threshold;
        info!(fails, threshold, success, "Mission resolved");
        Ok(success)
    }
}

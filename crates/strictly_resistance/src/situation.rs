//! The live state of one session: seating, leader, team, and mission tally.

use crate::error::SituationError;
use crate::invariants::{InvariantSet, SituationInvariants};
use crate::outcome::{GameOutcome, GameOutcomeEvaluator};
use crate::player::{Player, PlayerCharacter, Role};
use crate::rules::RulesRegistry;
use crate::secrecy::{Clearance, Viewer};
use crate::snapshot::SituationSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Current situation of a game: who sits where, who leads, who is on
/// the proposed team, and how the missions have gone so far.
///
/// Rounds are 1-indexed to line up with the ruleset tables: round 1 is
/// the first mission. `mission_successes` never exceeds the number of
/// completed rounds.
///
/// The seating is fixed for the session. The leader and team are stored
/// as seat indices so they can never name someone outside the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SituationSnapshot", into = "SituationSnapshot")]
pub struct Situation {
    pub(crate) seating: Vec<PlayerCharacter>,
    pub(crate) leader: usize,
    pub(crate) team: BTreeSet<usize>,
    pub(crate) round: usize,
    pub(crate) mission_successes: usize,
}

impl Situation {
    /// Seats the players in the given order with the first seat leading.
    ///
    /// Starts at round 1 with no successes and an empty team. Seating
    /// sizes outside the ruleset are accepted here; they surface later as
    /// [`SituationError::Configuration`] from [`required_team_size`](Self::required_team_size).
    #[instrument(skip(seating), fields(players = seating.len()))]
    pub fn new(seating: Vec<PlayerCharacter>) -> Result<Self, SituationError> {
        let leader = seating
            .first()
            .map(|pc| pc.player().clone())
            .ok_or(SituationError::EmptySeating)?;
        Self::with_leader(seating, &leader)
    }

    /// Seats the players with an explicit first leader.
    #[instrument(skip(seating, leader), fields(players = seating.len(), leader = %leader))]
    pub fn with_leader(seating: Vec<PlayerCharacter>, leader: &Player) -> Result<Self, SituationError> {
        Self::from_parts(seating, leader, std::iter::empty(), 1, 0)
    }

    /// Rebuilds a situation from its parts, checking every invariant.
    pub(crate) fn from_parts<'a>(
        seating: Vec<PlayerCharacter>,
        leader: &Player,
        team: impl IntoIterator<Item = &'a Player>,
        round: usize,
        mission_successes: usize,
    ) -> Result<Self, SituationError> {
        if seating.is_empty() {
            return Err(SituationError::EmptySeating);
        }

        let mut seen = BTreeSet::new();
        for pc in &seating {
            if !seen.insert(pc.player()) {
                warn!(player = %pc.player(), "Duplicate seat rejected");
                return Err(SituationError::DuplicateSeat(pc.player().clone()));
            }
        }

        let leader = seat_index(&seating, leader)?;
        let team = team
            .into_iter()
            .map(|member| seat_index(&seating, member))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let situation = Self {
            seating,
            leader,
            team,
            round,
            mission_successes,
        };

        SituationInvariants::check_all(&situation).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            SituationError::InvariantViolation(descriptions)
        })?;

        info!(
            players = situation.seating.len(),
            leader = %situation.leader().player(),
            round,
            "Situation ready"
        );
        Ok(situation)
    }

    /// Players and their characters in table order.
    pub fn seating(&self) -> &[PlayerCharacter] {
        &self.seating
    }

    /// Number of seated players.
    pub fn player_count(&self) -> usize {
        self.seating.len()
    }

    /// Returns the spies, in table order, if the viewer may see them.
    ///
    /// Only the moderator and seated spies are cleared; everyone else
    /// gets [`SituationError::Unauthorized`].
    #[instrument(skip(self))]
    pub fn spies(&self, viewer: &Viewer) -> Result<Vec<&PlayerCharacter>, SituationError> {
        if Clearance::resolve(viewer, &self.seating) != Clearance::All {
            warn!("Spy list requested without clearance");
            return Err(SituationError::Unauthorized("the spy list".to_string()));
        }
        Ok(self.spy_characters().collect())
    }

    pub(crate) fn spy_characters(&self) -> impl Iterator<Item = &PlayerCharacter> {
        self.seating.iter().filter(|pc| pc.is_spy())
    }

    /// Returns `target`'s role if the viewer may see it.
    #[instrument(skip(self, target), fields(target = %target))]
    pub fn role_of(&self, target: &Player, viewer: &Viewer) -> Result<Role, SituationError> {
        let character = self.player_character_for(target)?;
        if !Clearance::resolve(viewer, &self.seating).permits(viewer, target) {
            warn!("Role requested without clearance");
            return Err(SituationError::Unauthorized(format!("{}'s role", target)));
        }
        Ok(character.role())
    }

    /// The player currently proposing teams.
    pub fn leader(&self) -> &PlayerCharacter {
        &self.seating[self.leader]
    }

    /// Team size the ruleset demands for the current round.
    ///
    /// An unsupported seating size is a fatal configuration error for
    /// the session, not something a player can fix.
    #[instrument(skip(self), fields(players = self.seating.len(), round = self.round))]
    pub fn required_team_size(&self) -> Result<usize, SituationError> {
        let player_count = self.seating.len();
        if !RulesRegistry::supports(player_count) {
            return Err(SituationError::Configuration { player_count });
        }
        RulesRegistry::required_team_size(player_count, self.round)
            .ok_or(SituationError::RoundOutOfRange { round: self.round })
    }

    /// Fail cards needed to sink the current mission.
    pub fn fails_required(&self) -> Result<usize, SituationError> {
        self.required_team_size()?;
        RulesRegistry::fails_required(self.seating.len(), self.round)
            .ok_or(SituationError::RoundOutOfRange { round: self.round })
    }

    /// Looks up the character played by `player`.
    #[instrument(skip(self, player), fields(player = %player))]
    pub fn player_character_for(&self, player: &Player) -> Result<&PlayerCharacter, SituationError> {
        self.seat_of(player)
            .map(|seat| &self.seating[seat])
            .ok_or_else(|| {
                debug!("Player not in this session");
                SituationError::NotFound(player.clone())
            })
    }

    pub(crate) fn seat_of(&self, player: &Player) -> Option<usize> {
        self.seating.iter().position(|pc| pc.player() == player)
    }

    /// Replaces the proposed team.
    ///
    /// Every member must be seated; otherwise nothing changes. Team size
    /// is not checked here so a team can be staged one member at a time.
    #[instrument(skip(self, members))]
    pub fn set_team<'a>(
        &mut self,
        members: impl IntoIterator<Item = &'a Player>,
    ) -> Result<(), SituationError> {
        let team = members
            .into_iter()
            .map(|member| {
                self.seat_of(member).ok_or_else(|| {
                    warn!(player = %member, "Unseated player proposed for team");
                    SituationError::NotSeated(member.clone())
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        debug!(size = team.len(), "Team replaced");
        self.team = team;
        Ok(())
    }

    /// Empties the proposed team.
    pub fn clear_team(&mut self) {
        self.team.clear();
    }

    /// Proposed team members in table order.
    pub fn team(&self) -> Vec<&PlayerCharacter> {
        self.team.iter().map(|&seat| &self.seating[seat]).collect()
    }

    /// Returns true if `player` is on the proposed team.
    pub fn is_on_team(&self, player: &Player) -> bool {
        self.seat_of(player)
            .is_some_and(|seat| self.team.contains(&seat))
    }

    /// Passes leadership to the next seat, wrapping after the last.
    ///
    /// This is the only way leadership moves; it does not care whether
    /// the last proposal was rejected or a mission was completed.
    #[instrument(skip(self))]
    pub fn advance_leader(&mut self) {
        self.leader = (self.leader + 1) % self.seating.len();
        info!(leader = %self.leader().player(), "Leader advanced");
    }

    /// Missions that succeeded so far.
    pub fn mission_successes(&self) -> usize {
        self.mission_successes
    }

    /// Missions that failed so far: completed rounds minus successes.
    pub fn mission_fails(&self) -> usize {
        (self.round - 1) - self.mission_successes
    }

    /// Records a resolved mission and moves to the next round.
    ///
    /// Call exactly once per resolved mission. Calls past the last
    /// mission are accepted; deciding when the game ends is the
    /// caller's job (see [`outcome`](Self::outcome)).
    #[instrument(skip(self), fields(round = self.round))]
    pub fn complete_mission(&mut self, success: bool) {
        self.round += 1;
        if success {
            self.mission_successes += 1;
        }
        info!(
            successes = self.mission_successes,
            fails = self.mission_fails(),
            next_round = self.round,
            "Mission completed"
        );
        debug_assert!(SituationInvariants::check_all(self).is_ok());
    }

    /// Current round, starting at 1.
    pub fn round_number(&self) -> usize {
        self.round
    }

    /// Evaluates the tally with [`GameOutcomeEvaluator`].
    pub fn outcome(&self) -> GameOutcome {
        GameOutcomeEvaluator::evaluate(self.mission_successes(), self.mission_fails())
    }
}

fn seat_index(seating: &[PlayerCharacter], player: &Player) -> Result<usize, SituationError> {
    seating
        .iter()
        .position(|pc| pc.player() == player)
        .ok_or_else(|| SituationError::NotSeated(player.clone()))
}

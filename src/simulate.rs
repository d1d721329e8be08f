//! Scripted self-play: deal roles and run a whole game to its end.

use crate::config::TableConfig;
use crate::session::{GameSession, SessionError};
use derive_getters::Getters;
use derive_new::new;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use strictly_resistance::{
    GameOutcome, MissionCard, Player, Role, Situation, TeamProposal, Viewer, assign_roles,
};
use tracing::{debug, info, instrument};

/// Chance that a seated player approves a proposed team.
const APPROVAL_RATE: f64 = 0.6;

/// Chance that a spy on a mission plays a fail card.
const SABOTAGE_RATE: f64 = 0.7;

/// Summary of a simulated game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct SimulationReport {
    /// Seed the game was dealt and played with.
    seed: u64,
    /// The final outcome, never `Ongoing`.
    outcome: GameOutcome,
    /// Missions played.
    rounds: usize,
    /// Team proposals put to the vote, rejected ones included.
    proposals: usize,
    /// The spies, revealed at the end.
    spies: Vec<Player>,
}

/// Builds the opening situation for a configured table.
///
/// Roles are dealt with `rng`; the first leader is the configured one or
/// the first seat.
#[instrument(skip(config, rng), fields(session = %config.session()))]
pub fn deal_table<R: Rng + ?Sized>(config: &TableConfig, rng: &mut R) -> Result<Situation, SessionError> {
    let seating = assign_roles(config.seated_players(), rng)?;
    let situation = match config.first_leader() {
        Some(leader) => Situation::with_leader(seating, &Player::new(leader.as_str()))?,
        None => Situation::new(seating)?,
    };
    info!(players = situation.player_count(), "Table dealt");
    Ok(situation)
}

/// Plays a whole game with random teams, votes, and sabotage.
///
/// The configured seed makes the game reproducible; without one a seed
/// is drawn and reported.
#[instrument(skip(config), fields(session = %config.session()))]
pub fn simulate(config: &TableConfig) -> Result<SimulationReport, SessionError> {
    let seed = (*config.seed()).unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let situation = deal_table(config, &mut rng)?;
    let mut session = GameSession::new(config.session().clone(), situation);

    let mut proposals = 0;
    while !session.outcome().is_decided() {
        play_proposal(&mut session, &mut rng)?;
        proposals += 1;
    }

    let outcome = session.outcome();
    let situation = session.situation()?;
    let spies = situation
        .spies(&Viewer::Moderator)?
        .into_iter()
        .map(|pc| pc.player().clone())
        .collect();
    let rounds = situation.mission_successes() + situation.mission_fails();

    info!(seed, %outcome, rounds, proposals, "Simulation finished");
    Ok(SimulationReport::new(seed, outcome, rounds, proposals, spies))
}

/// One proposal, its vote, and the mission if the team goes.
#[instrument(skip_all, fields(round = tracing::field::Empty))]
fn play_proposal<R: Rng + ?Sized>(session: &mut GameSession, rng: &mut R) -> Result<(), SessionError> {
    let situation = session.situation()?;
    tracing::Span::current().record("round", situation.round_number());

    let leader = situation.leader().player().clone();
    let size = situation.required_team_size()?;
    let table: Vec<Player> = situation
        .seating()
        .iter()
        .map(|pc| pc.player().clone())
        .collect();
    let members: Vec<Player> = table.choose_multiple(rng, size).cloned().collect();
    debug!(leader = %leader, size, "Proposing random team");
    session.propose(TeamProposal::new(leader, members.clone()))?;

    let mut approved = None;
    for voter in &table {
        approved = session.vote(voter, rng.gen_bool(APPROVAL_RATE))?;
    }
    if approved != Some(true) {
        return Ok(());
    }

    for member in &members {
        let role = session.situation()?.role_of(member, &Viewer::Moderator)?;
        let card = if role == Role::Spy && rng.gen_bool(SABOTAGE_RATE) {
            MissionCard::Fail
        } else {
            MissionCard::Success
        };
        session.play_card(member, card)?;
    }
    Ok(())
}

//! Session orchestration: one engine per table, isolated and serialized.

use crate::store::{SessionRecord, SnapshotStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use strictly_resistance::{
    AwaitingTeamProposal, GameOutcome, MissionCard, MissionCards, Player, RoundPhase,
    RoundTransition, Situation, SituationError, TeamProposal, TeamVote, TransitionError,
    VoteResult,
};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Error raised while driving a session.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum SessionError {
    /// The engine refused a transition.
    #[display("{}", _0)]
    #[from]
    Transition(TransitionError),

    /// The engine rejected a query or mutation.
    #[display("{}", _0)]
    #[from]
    Situation(SituationError),

    /// Snapshot persistence failed.
    #[display("{}", _0)]
    #[from]
    Store(StoreError),

    /// The action does not fit the current phase.
    #[display("Cannot {} while {}", action, phase)]
    WrongPhase {
        /// What was attempted.
        action: &'static str,
        /// The current phase.
        phase: &'static str,
    },

    /// No session has this id.
    #[display("Session '{}' not found", _0)]
    UnknownSession(SessionId),

    /// A session with this id already exists.
    #[display("Session '{}' already exists", _0)]
    DuplicateSession(SessionId),

    /// A previous transition was interrupted and left no phase behind.
    #[display("Session '{}' lost its state", _0)]
    Corrupted(SessionId),
}

impl std::error::Error for SessionError {}

/// A game session: the round phase plus ballots and cards in flight.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    phase: Option<RoundPhase>,
    vote: TeamVote,
    cards: MissionCards,
}

impl GameSession {
    /// Starts a session at the beginning of the situation's current round.
    #[instrument(skip(situation), fields(players = situation.player_count()))]
    pub fn new(id: SessionId, situation: Situation) -> Self {
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            phase: Some(RoundPhase::AwaitingTeamProposal(AwaitingTeamProposal::new(
                situation,
            ))),
            vote: TeamVote::new(),
            cards: MissionCards::new(),
        }
    }

    /// Rebuilds a session from its record, phase and streak included.
    ///
    /// Recorded ballots and cards are replayed against the situation so a
    /// tampered record cannot smuggle in an illegal vote or card.
    #[instrument(skip(record), fields(round = record.situation().round_number()))]
    pub fn restore(id: SessionId, record: SessionRecord) -> Result<Self, SessionError> {
        let phase = RoundPhase::restore(record.round().clone())?;
        let mut vote = TeamVote::new();
        let mut cards = MissionCards::new();

        match &phase {
            RoundPhase::TeamProposed(proposed) => {
                vote = record.vote().replay(proposed.situation())?;
                if vote.is_complete(proposed.situation()) {
                    return Err(SituationError::InvariantViolation(
                        "Every ballot is in but the vote was never decided".to_string(),
                    )
                    .into());
                }
            }
            RoundPhase::MissionUnderway(underway) => {
                cards = record.cards().replay(underway.situation())?;
                if cards.played_count() >= underway.situation().team().len() {
                    return Err(SituationError::InvariantViolation(
                        "Every card is in but the mission was never resolved".to_string(),
                    )
                    .into());
                }
            }
            RoundPhase::AwaitingTeamProposal(_) | RoundPhase::Finished(_) => {}
        }

        info!(session_id = %id, phase = phase.name(), "Restored game session");
        Ok(Self {
            id,
            phase: Some(phase),
            vote,
            cards,
        })
    }

    /// Captures the session for persistence.
    ///
    /// Ballots and cards left over from an earlier phase are not recorded.
    pub fn record(&self) -> Result<SessionRecord, SessionError> {
        let phase = self
            .phase
            .as_ref()
            .ok_or_else(|| SessionError::Corrupted(self.id.clone()))?;
        let vote = match phase {
            RoundPhase::TeamProposed(_) => self.vote.clone(),
            _ => TeamVote::new(),
        };
        let cards = match phase {
            RoundPhase::MissionUnderway(_) => self.cards.clone(),
            _ => MissionCards::new(),
        };
        Ok(SessionRecord::new(phase.snapshot(), vote, cards))
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current situation.
    pub fn situation(&self) -> Result<&Situation, SessionError> {
        self.phase
            .as_ref()
            .map(RoundPhase::situation)
            .ok_or_else(|| SessionError::Corrupted(self.id.clone()))
    }

    /// Name of the current phase.
    pub fn phase_name(&self) -> &'static str {
        self.phase.as_ref().map_or("corrupted", RoundPhase::name)
    }

    /// The winner, or [`GameOutcome::Ongoing`].
    pub fn outcome(&self) -> GameOutcome {
        match &self.phase {
            Some(RoundPhase::Finished(done)) => done.outcome(),
            Some(phase) => phase.situation().outcome(),
            None => GameOutcome::Ongoing,
        }
    }

    fn take_phase(&mut self) -> Result<RoundPhase, SessionError> {
        self.phase
            .take()
            .ok_or_else(|| SessionError::Corrupted(self.id.clone()))
    }

    fn wrong_phase(&mut self, phase: RoundPhase, action: &'static str) -> SessionError {
        let name = phase.name();
        self.phase = Some(phase);
        warn!(session_id = %self.id, action, phase = name, "Action out of phase");
        SessionError::WrongPhase {
            action,
            phase: name,
        }
    }

    /// The leader proposes a team.
    #[instrument(skip(self, proposal), fields(session_id = %self.id, proposal = %proposal))]
    pub fn propose(&mut self, proposal: TeamProposal) -> Result<(), SessionError> {
        let awaiting = match self.take_phase()? {
            RoundPhase::AwaitingTeamProposal(awaiting) => awaiting,
            other => return Err(self.wrong_phase(other, "propose a team")),
        };

        match awaiting.propose_team(proposal) {
            Ok(proposed) => {
                self.vote = TeamVote::new();
                self.phase = Some(RoundPhase::TeamProposed(proposed));
                Ok(())
            }
            Err(refused) => {
                self.phase = Some(RoundPhase::AwaitingTeamProposal(refused.state));
                Err(refused.error.into())
            }
        }
    }

    /// Records a ballot. Once everyone has voted, returns whether the
    /// team was approved and moves the session on.
    #[instrument(skip(self, voter), fields(session_id = %self.id, voter = %voter))]
    pub fn vote(&mut self, voter: &Player, approve: bool) -> Result<Option<bool>, SessionError> {
        let proposed = match self.take_phase()? {
            RoundPhase::TeamProposed(proposed) => proposed,
            other => return Err(self.wrong_phase(other, "vote")),
        };

        if let Err(error) = self.vote.cast(proposed.situation(), voter, approve) {
            self.phase = Some(RoundPhase::TeamProposed(proposed));
            return Err(error.into());
        }
        if !self.vote.is_complete(proposed.situation()) {
            self.phase = Some(RoundPhase::TeamProposed(proposed));
            return Ok(None);
        }

        match proposed.decide(&self.vote) {
            Ok(result) => {
                let approved = matches!(result, VoteResult::Approved(_));
                self.cards = MissionCards::new();
                self.phase = Some(result.into());
                info!(approved, phase = self.phase_name(), "Vote decided");
                Ok(Some(approved))
            }
            Err(refused) => {
                self.phase = Some(RoundPhase::TeamProposed(refused.state));
                Err(refused.error.into())
            }
        }
    }

    /// Records a mission card. Once the whole team has played, returns
    /// whether the mission succeeded and moves to the next round.
    #[instrument(skip(self, player, card), fields(session_id = %self.id, player = %player))]
    pub fn play_card(&mut self, player: &Player, card: MissionCard) -> Result<Option<bool>, SessionError> {
        let underway = match self.take_phase()? {
            RoundPhase::MissionUnderway(underway) => underway,
            other => return Err(self.wrong_phase(other, "play a mission card")),
        };

        if let Err(error) = self.cards.play(underway.situation(), player, card) {
            self.phase = Some(RoundPhase::MissionUnderway(underway));
            return Err(error.into());
        }
        if self.cards.played_count() < underway.situation().team().len() {
            self.phase = Some(RoundPhase::MissionUnderway(underway));
            return Ok(None);
        }

        match underway.resolve(&self.cards) {
            Ok(resolved) => {
                let success = resolved.success();
                let transition = resolved.next_round();
                if let RoundTransition::Finished(done) = &transition {
                    info!(outcome = %done.outcome(), "Session finished");
                }
                self.phase = Some(transition.into());
                Ok(Some(success))
            }
            Err(refused) => {
                self.phase = Some(RoundPhase::MissionUnderway(refused.state));
                Err(refused.error.into())
            }
        }
    }

    /// Records a mission result decided outside the card flow.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn complete_mission(&mut self, success: bool) -> Result<(), SessionError> {
        let underway = match self.take_phase()? {
            RoundPhase::MissionUnderway(underway) => underway,
            other => return Err(self.wrong_phase(other, "complete a mission")),
        };
        match underway.complete(success) {
            Ok(resolved) => {
                self.phase = Some(resolved.next_round().into());
                Ok(())
            }
            Err(refused) => {
                self.phase = Some(RoundPhase::MissionUnderway(refused.state));
                Err(refused.error.into())
            }
        }
    }
}

/// Holds every active session, each behind its own lock.
///
/// Distinct sessions never share state, and calls on one session are
/// serialized by that session's mutex.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<GameSession>>>>>,
    store: Option<SnapshotStore>,
}

impl SessionManager {
    /// Creates a manager that keeps sessions in memory only.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    /// Creates a manager that saves a snapshot after every change.
    #[instrument(skip(store))]
    pub fn with_store(store: SnapshotStore) -> Self {
        info!("Creating session manager with snapshot store");
        Self {
            sessions: Arc::default(),
            store: Some(store),
        }
    }

    /// Creates a new session.
    #[instrument(skip(self, situation))]
    pub fn create_session(&self, id: SessionId, situation: Situation) -> Result<SessionId, SessionError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionError::DuplicateSession(id));
        }

        let session = GameSession::new(id.clone(), situation);
        if let Some(store) = &self.store {
            store.save(&id, &session.record()?)?;
        }
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        info!(session_id = %id, "Created new session");
        Ok(id)
    }

    /// Reopens a session from its snapshot, in the phase it was saved in.
    #[instrument(skip(self))]
    pub fn resume_session(&self, id: SessionId) -> Result<SessionId, SessionError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| SessionError::UnknownSession(id.clone()))?;
        let session = GameSession::restore(id.clone(), store.load(&id)?)?;

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(&id) {
            return Err(SessionError::DuplicateSession(id));
        }
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        info!(session_id = %id, "Resumed session");
        Ok(id)
    }

    /// Runs `f` with exclusive access to one session.
    ///
    /// The manager-wide lock is released before `f` runs, so other
    /// sessions stay available. With a store configured, the session is
    /// saved after `f` returns, even when it fails part way, so the file
    /// always matches memory.
    #[instrument(skip(self, f))]
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(id).cloned().ok_or_else(|| {
                debug!(session_id = id, "Session not found");
                SessionError::UnknownSession(id.to_string())
            })?
        };

        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut session);
        if let Some(store) = &self.store {
            let saved = session
                .record()
                .and_then(|record| Ok(store.save(id, &record)?));
            if let Err(error) = saved {
                warn!(session_id = id, error = %error, "Failed to save session");
                if result.is_ok() {
                    return Err(error);
                }
            }
        }
        result
    }

    /// Ends a session, dropping its state and snapshot.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Result<(), SessionError> {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_none() {
            return Err(SessionError::UnknownSession(id.to_string()));
        }
        if let Some(store) = &self.store {
            store.remove(id)?;
        }
        info!(session_id = id, "Removed session");
        Ok(())
    }

    /// Lists all active session ids.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort();
        info!(count = ids.len(), "Listed sessions");
        ids
    }
}

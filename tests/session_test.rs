//! Tests for session isolation, serialization, and phase handling.

use resistance_table::{GameSession, SessionError, SessionManager, SnapshotStore};
use std::sync::Arc;
use std::thread;
use strictly_resistance::{
    GameOutcome, MissionCard, Player, PlayerCharacter, Role, Situation, TeamProposal,
};

/// Five seats, p1 and p2 are spies, p1 leads.
fn table() -> Situation {
    let seating = (1..=5)
        .map(|i| {
            let role = if i <= 2 { Role::Spy } else { Role::Resistance };
            PlayerCharacter::new(Player::new(format!("p{}", i)), role)
        })
        .collect();
    Situation::new(seating).expect("Valid seating")
}

fn handles(names: &[&str]) -> Vec<Player> {
    names.iter().copied().map(Player::new).collect()
}

/// The current leader proposes the first two seats and everyone rejects.
fn propose_and_reject(s: &mut GameSession) -> Result<Option<bool>, SessionError> {
    let leader = s.situation()?.leader().player().clone();
    s.propose(TeamProposal::new(leader, handles(&["p1", "p2"])))?;
    let mut decided = None;
    for voter in handles(&["p1", "p2", "p3", "p4", "p5"]) {
        decided = s.vote(&voter, false)?;
    }
    Ok(decided)
}

fn setup_manager() -> (tempfile::TempDir, SnapshotStore, SessionManager) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SnapshotStore::open(dir.path()).expect("Failed to open store");
    let sessions = SessionManager::with_store(store.clone());
    (dir, store, sessions)
}

#[test]
fn test_duplicate_session_fails() {
    let sessions = SessionManager::new();
    sessions
        .create_session("s1".to_string(), table())
        .expect("First create failed");
    let result = sessions.create_session("s1".to_string(), table());
    assert!(matches!(result, Err(SessionError::DuplicateSession(_))));
}

#[test]
fn test_unknown_session() {
    let sessions = SessionManager::new();
    let result = sessions.with_session("missing", |s| Ok(s.phase_name()));
    assert!(matches!(result, Err(SessionError::UnknownSession(_))));
}

#[test]
fn test_full_mission_through_session() {
    let sessions = SessionManager::new();
    let id = sessions
        .create_session("s1".to_string(), table())
        .expect("Create failed");

    let success = sessions
        .with_session(&id, |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p1", "p3"])))?;
            let mut decided = None;
            for voter in handles(&["p1", "p2", "p3", "p4", "p5"]) {
                decided = s.vote(&voter, true)?;
            }
            assert_eq!(decided, Some(true));
            assert_eq!(s.play_card(&Player::new("p1"), MissionCard::Fail)?, None);
            s.play_card(&Player::new("p3"), MissionCard::Success)
        })
        .expect("Round failed");
    assert_eq!(success, Some(false));

    sessions
        .with_session(&id, |s| {
            let situation = s.situation()?;
            assert_eq!(situation.round_number(), 2);
            assert_eq!(situation.mission_fails(), 1);
            assert_eq!(situation.leader().player(), &Player::new("p2"));
            assert_eq!(s.phase_name(), "awaiting team proposal");
            assert_eq!(s.outcome(), GameOutcome::Ongoing);
            Ok(())
        })
        .expect("Inspect failed");
}

#[test]
fn test_out_of_phase_action_keeps_phase() {
    let sessions = SessionManager::new();
    let id = sessions
        .create_session("s1".to_string(), table())
        .expect("Create failed");

    let result = sessions.with_session(&id, |s| s.vote(&Player::new("p2"), true));
    assert!(matches!(result, Err(SessionError::WrongPhase { .. })));

    let phase = sessions
        .with_session(&id, |s| Ok(s.phase_name()))
        .expect("Inspect failed");
    assert_eq!(phase, "awaiting team proposal");
}

#[test]
fn test_refused_proposal_keeps_phase() {
    let sessions = SessionManager::new();
    let id = sessions
        .create_session("s1".to_string(), table())
        .expect("Create failed");

    let result = sessions.with_session(&id, |s| {
        s.propose(TeamProposal::new(Player::new("p2"), handles(&["p1", "p3"])))
    });
    assert!(matches!(result, Err(SessionError::Transition(_))));

    sessions
        .with_session(&id, |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p4", "p5"])))
        })
        .expect("Leader's proposal refused");
}

#[test]
fn test_sessions_are_isolated() {
    let sessions = SessionManager::new();
    sessions
        .create_session("a".to_string(), table())
        .expect("Create failed");
    sessions
        .create_session("b".to_string(), table())
        .expect("Create failed");

    sessions
        .with_session("a", |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))?;
            for voter in handles(&["p1", "p2", "p3", "p4", "p5"]) {
                s.vote(&voter, false)?;
            }
            Ok(())
        })
        .expect("Round failed");

    let leader_a = sessions
        .with_session("a", |s| Ok(s.situation()?.leader().player().clone()))
        .expect("Inspect failed");
    let leader_b = sessions
        .with_session("b", |s| Ok(s.situation()?.leader().player().clone()))
        .expect("Inspect failed");
    assert_eq!(leader_a, Player::new("p2"));
    assert_eq!(leader_b, Player::new("p1"));
    assert_eq!(sessions.list_sessions(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_concurrent_votes_are_serialized() {
    let sessions = Arc::new(SessionManager::new());
    let id = sessions
        .create_session("s1".to_string(), table())
        .expect("Create failed");
    sessions
        .with_session(&id, |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))
        })
        .expect("Proposal failed");

    let workers: Vec<_> = handles(&["p1", "p2", "p3", "p4", "p5"])
        .into_iter()
        .map(|voter| {
            let sessions = Arc::clone(&sessions);
            let id = id.clone();
            thread::spawn(move || sessions.with_session(&id, |s| s.vote(&voter, true)))
        })
        .collect();

    let decisions: Vec<_> = workers
        .into_iter()
        .map(|w| w.join().expect("Worker panicked").expect("Vote failed"))
        .collect();
    assert_eq!(decisions.iter().filter(|d| d.is_some()).count(), 1);

    let phase = sessions
        .with_session(&id, |s| Ok(s.phase_name()))
        .expect("Inspect failed");
    assert_eq!(phase, "mission underway");
}

#[test]
fn test_store_follows_session() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SnapshotStore::open(dir.path()).expect("Failed to open store");
    let sessions = SessionManager::with_store(store.clone());
    let id = sessions
        .create_session("saved".to_string(), table())
        .expect("Create failed");
    assert!(store.exists(&id));

    sessions
        .with_session(&id, |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))?;
            for voter in handles(&["p1", "p2", "p3", "p4", "p5"]) {
                s.vote(&voter, true)?;
            }
            s.play_card(&Player::new("p3"), MissionCard::Success)?;
            s.play_card(&Player::new("p4"), MissionCard::Success)
        })
        .expect("Round failed");

    let saved = store.load(&id).expect("Load failed");
    assert_eq!(saved.situation().round_number(), 2);
    assert_eq!(saved.situation().mission_successes(), 1);

    let fresh = SessionManager::with_store(store.clone());
    fresh.resume_session(id.clone()).expect("Resume failed");
    let round = fresh
        .with_session(&id, |s| Ok(s.situation()?.round_number()))
        .expect("Inspect failed");
    assert_eq!(round, 2);

    sessions.remove_session(&id).expect("Remove failed");
    assert!(!store.exists(&id));
}

#[test]
fn test_rejection_win_survives_resume() {
    let (_dir, store, sessions) = setup_manager();
    let id = sessions
        .create_session("doomed".to_string(), table())
        .expect("Create failed");
    for _ in 0..5 {
        let decided = sessions
            .with_session(&id, propose_and_reject)
            .expect("Rejection failed");
        assert_eq!(decided, Some(false));
    }

    let fresh = SessionManager::with_store(store);
    fresh.resume_session(id.clone()).expect("Resume failed");
    let (outcome, phase) = fresh
        .with_session(&id, |s| Ok((s.outcome(), s.phase_name())))
        .expect("Inspect failed");
    assert_eq!(outcome, GameOutcome::SpyWin);
    assert_eq!(phase, "finished");

    let result = fresh.with_session(&id, |s| {
        s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))
    });
    assert!(matches!(result, Err(SessionError::WrongPhase { .. })));
}

#[test]
fn test_rejection_streak_survives_resume() {
    let (_dir, store, sessions) = setup_manager();
    let id = sessions
        .create_session("streak".to_string(), table())
        .expect("Create failed");
    for _ in 0..3 {
        sessions
            .with_session(&id, propose_and_reject)
            .expect("Rejection failed");
    }

    let fresh = SessionManager::with_store(store);
    fresh.resume_session(id.clone()).expect("Resume failed");
    for _ in 0..2 {
        fresh
            .with_session(&id, propose_and_reject)
            .expect("Rejection failed");
    }
    let outcome = fresh
        .with_session(&id, |s| Ok(s.outcome()))
        .expect("Inspect failed");
    assert_eq!(outcome, GameOutcome::SpyWin);
}

#[test]
fn test_ballots_survive_resume() {
    let (_dir, store, sessions) = setup_manager();
    let id = sessions
        .create_session("midvote".to_string(), table())
        .expect("Create failed");
    sessions
        .with_session(&id, |s| {
            s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))?;
            s.vote(&Player::new("p1"), true)?;
            s.vote(&Player::new("p2"), true)
        })
        .expect("Partial vote failed");

    let fresh = SessionManager::with_store(store);
    fresh.resume_session(id.clone()).expect("Resume failed");
    let result = fresh.with_session(&id, |s| s.vote(&Player::new("p2"), false));
    assert!(matches!(result, Err(SessionError::Transition(_))));

    let decided = fresh
        .with_session(&id, |s| {
            s.vote(&Player::new("p3"), true)?;
            s.vote(&Player::new("p4"), false)?;
            s.vote(&Player::new("p5"), false)
        })
        .expect("Vote failed");
    assert_eq!(decided, Some(true));
}

#[test]
fn test_failed_closure_still_saves_progress() {
    let (_dir, store, sessions) = setup_manager();
    let id = sessions
        .create_session("partial".to_string(), table())
        .expect("Create failed");

    let result = sessions.with_session(&id, |s| {
        s.propose(TeamProposal::new(Player::new("p1"), handles(&["p3", "p4"])))?;
        s.vote(&Player::new("ghost"), true)
    });
    assert!(result.is_err());

    let saved = store.load(&id).expect("Load failed");
    assert_eq!(saved.situation().team().len(), 2);
    let restored = GameSession::restore(id.clone(), saved).expect("Restore failed");
    assert_eq!(restored.phase_name(), "team proposed");
}

#[test]
fn test_escaping_session_id_rejected() {
    let (dir, _store, sessions) = setup_manager();
    let result = sessions.create_session("../escaped".to_string(), table());
    assert!(matches!(result, Err(SessionError::Store(_))));
    assert!(sessions.list_sessions().is_empty());
    assert!(
        !dir.path()
            .parent()
            .expect("Temp dir has a parent")
            .join("escaped.json")
            .exists()
    );
}

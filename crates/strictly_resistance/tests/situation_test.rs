//! Tests for the situation's turn progression and queries.

use strictly_resistance::{
    GameOutcome, GameOutcomeEvaluator, Player, PlayerCharacter, Role, RulesRegistry, Situation,
    SituationError, Viewer,
};

/// Seats `n` players named p1..pn; the first `spies` are spies.
fn table(n: usize, spies: usize) -> Situation {
    let seating = (1..=n)
        .map(|i| {
            let role = if i <= spies { Role::Spy } else { Role::Resistance };
            PlayerCharacter::new(Player::new(format!("p{}", i)), role)
        })
        .collect();
    Situation::new(seating).expect("valid seating")
}

#[test]
fn test_five_player_scenario() {
    let mut situation = table(5, 2);
    assert_eq!(situation.round_number(), 1);
    assert_eq!(situation.mission_successes(), 0);
    assert_eq!(situation.leader().player(), &Player::new("p1"));
    assert_eq!(situation.required_team_size(), Ok(2));

    situation.complete_mission(true);
    assert_eq!(situation.round_number(), 2);
    assert_eq!(situation.mission_successes(), 1);
    assert_eq!(situation.mission_fails(), 0);

    situation.complete_mission(false);
    assert_eq!(situation.round_number(), 3);
    assert_eq!(situation.mission_successes(), 1);
    assert_eq!(situation.mission_fails(), 1);

    for _ in 0..5 {
        situation.advance_leader();
    }
    assert_eq!(situation.leader().player(), &Player::new("p1"));
}

#[test]
fn test_required_team_size_tracks_round() {
    for n in 5..=10 {
        let mut situation = table(n, RulesRegistry::spy_count(n).expect("supported"));
        for round in 1..=5 {
            assert_eq!(
                situation.required_team_size().ok(),
                RulesRegistry::required_team_size(n, round)
            );
            situation.complete_mission(round % 2 == 0);
        }
    }
}

#[test]
fn test_rotation_period_equals_seating() {
    for n in 1..=12 {
        let mut situation = table(n, 0);
        let original = situation.leader().clone();
        for step in 1..=n {
            situation.advance_leader();
            if step < n {
                assert_ne!(situation.leader(), &original, "{} seats, step {}", n, step);
            }
        }
        assert_eq!(situation.leader(), &original);
    }
}

#[test]
fn test_tally_adds_up_for_any_sequence() {
    let sequences: [&[bool]; 4] = [
        &[],
        &[true, true, true],
        &[false, true, false, true, false, true, true],
        &[false; 9],
    ];
    for results in sequences {
        let mut situation = table(5, 2);
        for &success in results {
            situation.complete_mission(success);
        }
        let k = results.len();
        assert_eq!(situation.mission_successes() + situation.mission_fails(), k);
        assert_eq!(situation.round_number(), 1 + k);
    }
}

#[test]
fn test_rejected_team_leaves_team_unchanged() {
    let mut situation = table(5, 2);
    let p2 = Player::new("p2");
    let p4 = Player::new("p4");
    situation.set_team([&p2, &p4]).expect("seated members");
    let before: Vec<_> = situation.team().into_iter().cloned().collect();

    let stranger = Player::new("stranger");
    assert_eq!(
        situation.set_team([&p2, &stranger]),
        Err(SituationError::NotSeated(stranger))
    );
    let after: Vec<_> = situation.team().into_iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn test_team_may_be_staged_below_required_size() {
    let mut situation = table(5, 2);
    situation.set_team([&Player::new("p3")]).expect("seated member");
    assert_eq!(situation.team().len(), 1);
    assert_eq!(situation.required_team_size(), Ok(2));
}

#[test]
fn test_spies_match_role_and_count() {
    for n in 5..=10 {
        let spies = RulesRegistry::spy_count(n).expect("supported");
        let situation = table(n, spies);
        let visible = situation.spies(&Viewer::Moderator).expect("moderator");
        assert_eq!(visible.len(), spies);
        for pc in visible {
            assert_eq!(situation.role_of(pc.player(), &Viewer::Moderator), Ok(Role::Spy));
        }
    }
}

#[test]
fn test_player_character_lookup() {
    let situation = table(5, 2);
    let found = situation
        .player_character_for(&Player::new("p4"))
        .expect("seated");
    assert_eq!(found.player().handle(), "p4");
    assert_eq!(
        situation.player_character_for(&Player::new("p9")),
        Err(SituationError::NotFound(Player::new("p9")))
    );
}

#[test]
fn test_missions_accepted_past_game_length() {
    let mut situation = table(5, 2);
    for _ in 0..8 {
        situation.complete_mission(true);
    }
    assert_eq!(situation.round_number(), 9);
    assert_eq!(situation.mission_successes(), 8);
    assert_eq!(situation.outcome(), GameOutcome::ResistanceWin);
}

#[test]
fn test_outcome_scenarios() {
    let mut resistance = table(5, 2);
    for _ in 0..3 {
        resistance.complete_mission(true);
    }
    assert_eq!(
        GameOutcomeEvaluator::evaluate(resistance.mission_successes(), resistance.mission_fails()),
        GameOutcome::ResistanceWin
    );

    let mut spies = table(5, 2);
    for _ in 0..3 {
        spies.complete_mission(false);
    }
    assert_eq!(spies.outcome(), GameOutcome::SpyWin);

    let mut mixed = table(5, 2);
    for success in [true, false, true, false] {
        mixed.complete_mission(success);
    }
    assert_eq!(mixed.outcome(), GameOutcome::Ongoing);
}

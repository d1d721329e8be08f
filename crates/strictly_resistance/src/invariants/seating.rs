//! Seating invariants: unique seats, seated leader, seated team.

use super::Invariant;
use crate::Situation;
use std::collections::BTreeSet;

/// Invariant: nobody occupies two seats.
pub struct UniqueSeatingInvariant;

impl Invariant<Situation> for UniqueSeatingInvariant {
    fn holds(situation: &Situation) -> bool {
        let mut seen = BTreeSet::new();
        situation.seating.iter().all(|pc| seen.insert(pc.player()))
    }

    fn description() -> &'static str {
        "Every seated player is unique"
    }
}

/// Invariant: the leader is one of the seated players.
pub struct LeaderSeatedInvariant;

impl Invariant<Situation> for LeaderSeatedInvariant {
    fn holds(situation: &Situation) -> bool {
        situation.leader < situation.seating.len()
    }

    fn description() -> &'static str {
        "Leader is seated at the table"
    }
}

/// Invariant: the proposed team is a subset of the seating.
pub struct TeamSeatedInvariant;

impl Invariant<Situation> for TeamSeatedInvariant {
    fn holds(situation: &Situation) -> bool {
        situation
            .team
            .iter()
            .all(|&seat| seat < situation.seating.len())
    }

    fn description() -> &'static str {
        "Team members are all seated"
    }
}

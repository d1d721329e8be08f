//! First-class actions that drive a round forward.

use crate::player::Player;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A leader's proposal of who goes on the mission.
///
/// Proposals are domain events: they can be validated before they are
/// applied, logged, and serialized alongside the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamProposal {
    /// The player making the proposal.
    pub leader: Player,
    /// The proposed members, in any order.
    pub members: Vec<Player>,
}

impl TeamProposal {
    /// Creates a new proposal.
    #[instrument(skip(leader, members), fields(leader = %leader, size = members.len()))]
    pub fn new(leader: Player, members: Vec<Player>) -> Self {
        Self { leader, members }
    }

    /// Number of distinct members proposed.
    pub fn distinct_members(&self) -> usize {
        self.members
            .iter()
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }
}

impl std::fmt::Display for TeamProposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members = self
            .members
            .iter()
            .map(Player::handle)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} proposes [{}]", self.leader, members)
    }
}

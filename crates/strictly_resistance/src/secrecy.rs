//! Who may see which hidden roles.
//!
//! Access rules:
//! - The moderator (the orchestrator acting for itself) sees every role.
//! - A seated spy sees every spy, and so every role at the table.
//! - A seated resistance member sees only their own role.
//! - Anyone not seated sees nothing.

use crate::player::{Player, PlayerCharacter, Role};
use serde::{Deserialize, Serialize};

/// The party asking for secret information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    /// The session orchestrator itself, e.g. for the end-of-game reveal.
    Moderator,
    /// A player asking on their own behalf.
    Seat(Player),
}

impl Viewer {
    /// Viewer asking as the given player.
    pub fn seat(player: impl Into<Player>) -> Self {
        Viewer::Seat(player.into())
    }
}

impl From<Player> for Viewer {
    fn from(player: Player) -> Self {
        Viewer::Seat(player)
    }
}

/// What a viewer is cleared to see, resolved against one seating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clearance {
    /// Every role.
    All,
    /// Only the viewer's own role.
    Own,
    /// Nothing.
    None,
}

impl Clearance {
    /// Resolves a viewer's clearance at this table.
    pub(crate) fn resolve(viewer: &Viewer, seating: &[PlayerCharacter]) -> Self {
        match viewer {
            Viewer::Moderator => Clearance::All,
            Viewer::Seat(player) => match seating.iter().find(|pc| pc.player() == player) {
                Some(pc) if pc.role() == Role::Spy => Clearance::All,
                Some(_) => Clearance::Own,
                None => Clearance::None,
            },
        }
    }

    /// Returns true if the viewer may see `target`'s role.
    pub(crate) fn permits(self, viewer: &Viewer, target: &Player) -> bool {
        match self {
            Clearance::All => true,
            Clearance::Own => matches!(viewer, Viewer::Seat(p) if p == target),
            Clearance::None => false,
        }
    }
}

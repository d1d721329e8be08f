//! Core identity types: players, hidden roles, and the characters binding them.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A participant's stable identity (their chat handle).
///
/// Players carry no game knowledge. Two players are the same
/// player exactly when their handles match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
#[display("{}", handle)]
pub struct Player {
    handle: String,
}

impl Player {
    /// Creates a player from a handle.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }

    /// Returns the player's handle.
    pub fn handle(&self) -> &str {
        &self.handle
    }
}

impl From<&str> for Player {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}

/// Hidden allegiance held by a player for one session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Loyal member trying to make three missions succeed.
    Resistance,
    /// Infiltrator trying to make three missions fail.
    Spy,
}

/// A player bound to their secret role for one session.
///
/// Created once when roles are dealt and never changed afterwards.
/// The role is only readable inside this crate; outside callers go
/// through [`Situation::role_of`](crate::Situation::role_of) and
/// [`Situation::spies`](crate::Situation::spies), which check who is asking.
/// Neither `Debug` nor `Display` output includes the role, and the type is
/// not serializable on its own; persisted roles live in
/// [`SituationSnapshot`](crate::SituationSnapshot).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Getters)]
pub struct PlayerCharacter {
    /// The underlying identity.
    player: Player,
    #[getter(skip)]
    role: Role,
}

impl PlayerCharacter {
    /// Binds a player to a role.
    #[instrument(skip(role), fields(player = %player))]
    pub fn new(player: Player, role: Role) -> Self {
        Self { player, role }
    }

    /// Returns the secret role.
    pub(crate) fn role(&self) -> Role {
        self.role
    }

    /// Returns true if this character is a spy.
    pub(crate) fn is_spy(&self) -> bool {
        self.role == Role::Spy
    }
}

impl std::fmt::Debug for PlayerCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerCharacter")
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for PlayerCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Roles never appear in display output.
        write!(f, "{}", self.player)
    }
}

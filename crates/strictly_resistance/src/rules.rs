//! Canonical ruleset tables for The Resistance.
//!
//! All rules are data, not branching logic, so every value can be
//! checked directly against the published tables. Lookups outside the
//! supported range return `None` instead of panicking: a missing value
//! means the session is misconfigured, which is distinct from any real
//! table entry.

use tracing::{instrument, warn};

/// Fewest players the ruleset supports.
pub const MIN_PLAYERS: usize = 5;

/// Most players the ruleset supports.
pub const MAX_PLAYERS: usize = 10;

/// Number of missions in a full game.
pub const ROUNDS: usize = 5;

/// Mission outcomes of one kind needed to win.
pub const WINNING_MISSIONS: usize = 3;

/// Consecutive rejected team proposals that hand the game to the spies.
pub const MAX_REJECTED_PROPOSALS: usize = 5;

/// Team size per (player count, round). Rows start at [`MIN_PLAYERS`],
/// columns at round 1.
static TEAM_SIZES: [[usize; ROUNDS]; MAX_PLAYERS - MIN_PLAYERS + 1] = [
    [2, 3, 2, 3, 3], // 5 players
    [2, 3, 4, 3, 4], // 6 players
    [2, 3, 3, 4, 4], // 7 players
    [3, 4, 4, 5, 5], // 8 players
    [3, 4, 4, 5, 5], // 9 players
    [3, 4, 4, 5, 5], // 10 players
];

/// Spies per player count, starting at [`MIN_PLAYERS`].
static SPY_COUNTS: [usize; MAX_PLAYERS - MIN_PLAYERS + 1] = [2, 2, 3, 3, 3, 4];

/// Fail cards needed to sink round 4 with this many players or more.
const TWO_FAIL_MIN_PLAYERS: usize = 7;
const TWO_FAIL_ROUND: usize = 4;

/// Stateless lookups into the canonical ruleset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesRegistry;

impl RulesRegistry {
    /// Number of players that must go on the mission in `round` (1-indexed).
    ///
    /// Returns `None` when the player count or round is outside the table.
    #[instrument]
    pub fn required_team_size(player_count: usize, round: usize) -> Option<usize> {
        let size = Self::row(player_count)
            .and_then(|row| round.checked_sub(1).and_then(|col| TEAM_SIZES[row].get(col)))
            .copied();
        if size.is_none() {
            warn!(player_count, round, "No team size for this table");
        }
        size
    }

    /// Number of spies dealt for `player_count` players.
    #[instrument]
    pub fn spy_count(player_count: usize) -> Option<usize> {
        Self::row(player_count).map(|row| SPY_COUNTS[row])
    }

    /// Number of fail cards that make the mission in `round` fail.
    ///
    /// Round 4 needs two fails once seven or more players are seated;
    /// every other mission fails on a single fail card.
    #[instrument]
    pub fn fails_required(player_count: usize, round: usize) -> Option<usize> {
        Self::required_team_size(player_count, round)?;
        if round == TWO_FAIL_ROUND && player_count >= TWO_FAIL_MIN_PLAYERS {
            Some(2)
        } else {
            Some(1)
        }
    }

    /// Returns true if the ruleset covers this many players.
    pub fn supports(player_count: usize) -> bool {
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count)
    }

    fn row(player_count: usize) -> Option<usize> {
        Self::supports(player_count).then(|| player_count - MIN_PLAYERS)
    }
}

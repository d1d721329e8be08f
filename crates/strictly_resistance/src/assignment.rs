//! Dealing secret roles at the start of a session.

use crate::error::SituationError;
use crate::player::{Player, PlayerCharacter, Role};
use crate::rules::RulesRegistry;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Deals roles to `players`, keeping their seating order.
///
/// Exactly [`RulesRegistry::spy_count`] players become spies, chosen
/// uniformly at random from `rng`.
#[instrument(skip(players, rng), fields(players = players.len()))]
pub fn assign_roles<R: Rng + ?Sized>(
    players: Vec<Player>,
    rng: &mut R,
) -> Result<Vec<PlayerCharacter>, SituationError> {
    let player_count = players.len();
    let spies = RulesRegistry::spy_count(player_count).ok_or_else(|| {
        warn!(player_count, "Cannot deal roles for this table size");
        SituationError::Configuration { player_count }
    })?;

    let mut seen = BTreeSet::new();
    if let Some(dup) = players.iter().find(|p| !seen.insert(*p)) {
        return Err(SituationError::DuplicateSeat(dup.clone()));
    }

    let mut seats: Vec<usize> = (0..player_count).collect();
    seats.shuffle(rng);
    let spy_seats: BTreeSet<usize> = seats.into_iter().take(spies).collect();

    info!(player_count, spies, "Roles dealt");
    Ok(players
        .into_iter()
        .enumerate()
        .map(|(seat, player)| {
            let role = if spy_seats.contains(&seat) {
                Role::Spy
            } else {
                Role::Resistance
            };
            PlayerCharacter::new(player, role)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn players(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::new(format!("agent{}", i))).collect()
    }

    #[test]
    fn test_spy_count_matches_rules() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 5..=10 {
            let dealt = assign_roles(players(n), &mut rng).expect("supported size");
            let spies = dealt.iter().filter(|pc| pc.is_spy()).count();
            assert_eq!(Some(spies), RulesRegistry::spy_count(n));
        }
    }

    #[test]
    fn test_seating_order_preserved() {
        let mut rng = StdRng::seed_from_u64(1);
        let dealt = assign_roles(players(6), &mut rng).expect("supported size");
        let order: Vec<_> = dealt.iter().map(|pc| pc.player().clone()).collect();
        assert_eq!(order, players(6));
    }

    #[test]
    fn test_same_seed_same_deal() {
        let a = assign_roles(players(8), &mut StdRng::seed_from_u64(42)).expect("deal");
        let b = assign_roles(players(8), &mut StdRng::seed_from_u64(42)).expect("deal");
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsupported_size_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            assign_roles(players(4), &mut rng),
            Err(SituationError::Configuration { player_count: 4 })
        );
    }

    #[test]
    fn test_duplicate_players_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut list = players(4);
        list.push(Player::new("agent0"));
        assert_eq!(
            assign_roles(list, &mut rng),
            Err(SituationError::DuplicateSeat(Player::new("agent0")))
        );
    }
}

//! Role distribution at game start.

use rand::seq::SliceRandom;
use rand::Rng;
use saming_protocol::Role;

use crate::config::MIN_SUPPORTED_PLAYERS;
use crate::{GameError, Player};

/// Builds the role multiset for `n` seats.
///
/// Always one hunter and one shaman; one tiger below seven players, and
/// an alpha tiger alongside the tiger from seven up; villagers fill the
/// rest.
pub fn role_deck(n: usize) -> Result<Vec<Role>, GameError> {
    if n < MIN_SUPPORTED_PLAYERS {
        return Err(GameError::NotEnoughPlayers(MIN_SUPPORTED_PLAYERS));
    }
    let mut deck = vec![Role::Hunter, Role::Shaman, Role::Tiger];
    if n >= 7 {
        deck.push(Role::AlphaTiger);
    }
    deck.resize(n, Role::Villager);
    Ok(deck)
}

/// Shuffles a deck for `players.len()` and deals it in seat order.
///
/// The caller passes seats already in join order, so the shuffle is the
/// only source of non-determinism. Per-game flags are reset on every
/// seat; `can_shoot` is armed only on the hunter.
pub fn assign_roles(
    players: &mut [Player],
    rng: &mut impl Rng,
) -> Result<(), GameError> {
    let mut deck = role_deck(players.len())?;
    deck.shuffle(rng);

    for (player, role) in players.iter_mut().zip(deck) {
        player.role = Some(role);
        player.alive = true;
        player.cursed = false;
        player.has_used_curse = false;
        player.can_shoot = role == Role::Hunter;
        player.last_protected = None;
        player.has_acted_tonight = false;
        player.voted_for = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use saming_protocol::PlayerId;

    use super::*;

    fn seats(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(PlayerId::new(), &format!("p{i}"), i as u64))
            .collect()
    }

    fn count(deck: &[Role], role: Role) -> usize {
        deck.iter().filter(|r| **r == role).count()
    }

    #[test]
    fn test_deck_rejects_below_minimum() {
        assert_eq!(role_deck(4), Err(GameError::NotEnoughPlayers(5)));
    }

    #[test]
    fn test_deck_for_five_players() {
        let deck = role_deck(5).unwrap();
        assert_eq!(count(&deck, Role::Tiger), 1);
        assert_eq!(count(&deck, Role::AlphaTiger), 0);
        assert_eq!(count(&deck, Role::Hunter), 1);
        assert_eq!(count(&deck, Role::Shaman), 1);
        assert_eq!(count(&deck, Role::Villager), 2);
    }

    #[test]
    fn test_alpha_tiger_appears_from_seven_players() {
        for n in 5..=10 {
            let deck = role_deck(n).unwrap();
            let expected = usize::from(n >= 7);
            assert_eq!(count(&deck, Role::AlphaTiger), expected, "n = {n}");
            assert_eq!(count(&deck, Role::Tiger), 1, "n = {n}");
            assert_eq!(count(&deck, Role::Hunter), 1, "n = {n}");
            assert_eq!(count(&deck, Role::Shaman), 1, "n = {n}");
            assert_eq!(deck.len(), n);
        }
    }

    #[test]
    fn test_assign_deals_full_deck_and_resets_flags() {
        let mut players = seats(7);
        players[0].cursed = true;
        players[1].has_used_curse = true;
        players[2].voted_for = Some(players[0].id);

        let mut rng = StdRng::seed_from_u64(7);
        assign_roles(&mut players, &mut rng).unwrap();

        let roles: Vec<Role> = players.iter().map(|p| p.role.unwrap()).collect();
        assert_eq!(count(&roles, Role::AlphaTiger), 1);
        for p in &players {
            assert!(p.alive);
            assert!(!p.cursed);
            assert!(!p.has_used_curse);
            assert_eq!(p.can_shoot, p.is(Role::Hunter));
            assert_eq!(p.last_protected, None);
            assert_eq!(p.voted_for, None);
        }
    }

    #[test]
    fn test_assign_propagates_not_enough_players() {
        let mut players = seats(3);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_roles(&mut players, &mut rng).is_err());
    }
}

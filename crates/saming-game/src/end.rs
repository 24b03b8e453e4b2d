//! End-condition check.

use saming_protocol::{Role, Team};

use crate::Player;

/// The team that has won, if any, given the current seats.
///
/// Humans win when every tiger is dead; tigers win when they equal or
/// outnumber the living humans. Otherwise the game continues.
pub fn winner(players: &[Player]) -> Option<Team> {
    let mut tigers = 0usize;
    let mut humans = 0usize;
    for p in players.iter().filter(|p| p.alive) {
        match p.role.map(Role::team) {
            Some(Team::Tigers) => tigers += 1,
            Some(Team::Humans) => humans += 1,
            None => {}
        }
    }

    if tigers == 0 {
        Some(Team::Humans)
    } else if tigers >= humans {
        Some(Team::Tigers)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use saming_protocol::PlayerId;

    use super::*;

    fn seats(layout: &[(Role, bool)]) -> Vec<Player> {
        layout
            .iter()
            .map(|(role, alive)| {
                let mut p = Player::new(PlayerId::new(), "seat", 0);
                p.role = Some(*role);
                p.alive = *alive;
                p
            })
            .collect()
    }

    #[test]
    fn test_game_continues_while_tigers_are_outnumbered() {
        let players = seats(&[
            (Role::Tiger, true),
            (Role::Shaman, true),
            (Role::Hunter, true),
            (Role::Villager, true),
        ]);
        assert_eq!(winner(&players), None);
    }

    #[test]
    fn test_humans_win_when_all_tigers_dead() {
        let players = seats(&[
            (Role::Tiger, false),
            (Role::AlphaTiger, false),
            (Role::Shaman, true),
            (Role::Villager, true),
        ]);
        assert_eq!(winner(&players), Some(Team::Humans));
    }

    #[test]
    fn test_tigers_win_on_parity() {
        let players = seats(&[
            (Role::Tiger, true),
            (Role::Villager, true),
            (Role::Shaman, false),
        ]);
        assert_eq!(winner(&players), Some(Team::Tigers));
    }

    #[test]
    fn test_dead_players_do_not_count() {
        let players = seats(&[
            (Role::Tiger, true),
            (Role::Villager, false),
            (Role::Villager, false),
            (Role::Hunter, true),
            (Role::Shaman, true),
        ]);
        // 1 tiger vs 2 humans — still going.
        assert_eq!(winner(&players), None);
    }
}

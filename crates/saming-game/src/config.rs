//! Game configuration.

use saming_protocol::Role;

/// Fewest seats a deck can be built for.
pub const MIN_SUPPORTED_PLAYERS: usize = 5;

/// Most seats a room will hold.
pub const MAX_SUPPORTED_PLAYERS: usize = 10;

/// The canonical order in which role tables act at night. Roles with no
/// living holder are skipped when a night begins.
pub const DEFAULT_NIGHT_ORDER: [Role; 4] =
    [Role::Hunter, Role::Tiger, Role::AlphaTiger, Role::Shaman];

/// Tunables for a single room.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Day discussion length in seconds.
    pub day_secs: u64,
    /// Voting length in seconds.
    pub voting_secs: u64,
    /// Seats required before the host can start. Never below
    /// [`MIN_SUPPORTED_PLAYERS`].
    pub min_players: usize,
    /// Seat cap. Never above [`MAX_SUPPORTED_PLAYERS`].
    pub max_players: usize,
    /// Night turn order. Only night-acting roles are meaningful here.
    pub night_order: Vec<Role>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            day_secs: 120,
            voting_secs: 120,
            min_players: MIN_SUPPORTED_PLAYERS,
            max_players: MAX_SUPPORTED_PLAYERS,
            night_order: DEFAULT_NIGHT_ORDER.to_vec(),
        }
    }
}

impl GameConfig {
    /// Clamp out-of-range values so the config is safe to use. Called by
    /// the room on construction.
    pub fn validated(mut self) -> Self {
        if self.min_players < MIN_SUPPORTED_PLAYERS {
            tracing::warn!(
                min = self.min_players,
                "min_players below role-deck minimum — clamping"
            );
            self.min_players = MIN_SUPPORTED_PLAYERS;
        }
        if self.max_players > MAX_SUPPORTED_PLAYERS {
            tracing::warn!(
                max = self.max_players,
                "max_players above supported maximum — clamping"
            );
            self.max_players = MAX_SUPPORTED_PLAYERS;
        }
        if self.min_players > self.max_players {
            self.min_players = self.max_players;
        }
        self.night_order.retain(|r| r.acts_at_night());
        if self.night_order.is_empty() {
            self.night_order = DEFAULT_NIGHT_ORDER.to_vec();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.day_secs, 120);
        assert_eq!(cfg.voting_secs, 120);
        assert_eq!(cfg.min_players, 5);
        assert_eq!(cfg.max_players, 10);
        assert_eq!(cfg.night_order, DEFAULT_NIGHT_ORDER.to_vec());
    }

    #[test]
    fn test_validated_clamps_player_bounds() {
        let cfg = GameConfig {
            min_players: 2,
            max_players: 50,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.min_players, MIN_SUPPORTED_PLAYERS);
        assert_eq!(cfg.max_players, MAX_SUPPORTED_PLAYERS);
    }

    #[test]
    fn test_validated_drops_villager_from_night_order() {
        let cfg = GameConfig {
            night_order: vec![Role::Villager, Role::Tiger, Role::Shaman],
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.night_order, vec![Role::Tiger, Role::Shaman]);
    }

    #[test]
    fn test_validated_restores_empty_night_order() {
        let cfg = GameConfig {
            night_order: vec![Role::Villager],
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.night_order, DEFAULT_NIGHT_ORDER.to_vec());
    }
}

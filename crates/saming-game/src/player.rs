//! A seat in a room.

use saming_protocol::{PlayerId, Role};

/// One player's authoritative state.
///
/// `role`, `cursed`, `has_used_curse`, `can_shoot`, and `last_protected`
/// are hidden fields: they leave the server only through the view
/// projector, and only toward their owner (or everyone, after the game
/// ends).
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    /// `None` until roles are dealt at game start.
    pub role: Option<Role>,
    pub alive: bool,
    /// Marked by the alpha tiger's curse; persists for the rest of the
    /// game and makes the shaman read this player as a tiger.
    pub cursed: bool,
    /// The alpha tiger has spent its one-shot curse. Monotonic.
    pub has_used_curse: bool,
    /// The hunter may still take the dying retaliation shot.
    pub can_shoot: bool,
    /// Who the hunter protected last night; protecting the same player
    /// two nights running is rejected.
    pub last_protected: Option<PlayerId>,
    /// Cleared when a night begins.
    pub has_acted_tonight: bool,
    /// Cleared on entering voting and after the tally.
    pub voted_for: Option<PlayerId>,
    /// Unix milliseconds; seats are enumerated in join order.
    pub joined_at: u64,
}

impl Player {
    pub fn new(id: PlayerId, username: &str, joined_at: u64) -> Self {
        Self {
            id,
            username: username.to_string(),
            role: None,
            alive: true,
            cursed: false,
            has_used_curse: false,
            can_shoot: false,
            last_protected: None,
            has_acted_tonight: false,
            voted_for: None,
            joined_at,
        }
    }

    /// Whether this player holds `role`.
    pub fn is(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

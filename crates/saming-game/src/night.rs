//! Night resolution.
//!
//! The resolver is a pure read over the seats and the collected intents;
//! the room controller applies the kill and clears the intents afterwards.

use saming_protocol::{NightSummary, PlayerId, Reading, Role};

use crate::Player;

/// Intents collected during one night, one slot per table.
///
/// `tiger_target` is shared by the tiger and the alpha tiger — whichever
/// acts later overwrites it. `cursed_player` records who the alpha spent
/// its curse on tonight (the durable mark lives on the player).
#[derive(Debug, Clone, Default)]
pub struct NightIntents {
    pub tiger_target: Option<PlayerId>,
    pub hunter_protection: Option<PlayerId>,
    pub shaman_vision: Option<PlayerId>,
    pub cursed_player: Option<PlayerId>,
}

/// The shaman's private reading for the night.
#[derive(Debug, Clone, PartialEq)]
pub struct Vision {
    pub target_id: PlayerId,
    pub username: String,
    pub reading: Reading,
}

/// What one night did, before the controller applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct NightResult {
    pub killed: Option<PlayerId>,
    pub protected: bool,
    pub shaman_saved: bool,
    pub vision: Option<Vision>,
}

impl NightResult {
    /// The public slice of this result, safe to broadcast.
    pub fn summary(&self) -> NightSummary {
        NightSummary {
            killed: self.killed,
            protected: self.protected,
            shaman_saved: self.shaman_saved,
        }
    }
}

/// Resolves the night.
///
/// Kill resolution order: hunter protection beats the kill outright; a
/// shaman victim who pointed tonight's vision at the *still-hidden* alpha
/// tiger (curse unspent) escapes; anyone else dies. The vision reads
/// cursed players as tigers regardless of true role, and the alpha as
/// human until its curse is spent.
pub fn resolve(players: &[Player], intents: &NightIntents) -> NightResult {
    let find = |id: PlayerId| players.iter().find(|p| p.id == id);

    let mut result = NightResult {
        killed: None,
        protected: false,
        shaman_saved: false,
        vision: None,
    };

    if let Some(target_id) = intents.tiger_target {
        if intents.hunter_protection == Some(target_id) {
            result.protected = true;
        } else if let Some(victim) = find(target_id) {
            let lucky = victim.is(Role::Shaman)
                && intents
                    .shaman_vision
                    .and_then(find)
                    .is_some_and(|seen| {
                        seen.is(Role::AlphaTiger) && !seen.has_used_curse
                    });
            if lucky {
                result.shaman_saved = true;
            } else {
                result.killed = Some(target_id);
            }
        }
    }

    if let Some(seen_id) = intents.shaman_vision {
        if let Some(seen) = find(seen_id) {
            let reading = if seen.cursed {
                Reading::Tiger
            } else {
                match seen.role {
                    Some(Role::AlphaTiger) if seen.has_used_curse => Reading::Tiger,
                    Some(Role::AlphaTiger) => Reading::Human,
                    Some(Role::Tiger) => Reading::Tiger,
                    _ => Reading::Human,
                }
            };
            result.vision = Some(Vision {
                target_id: seen_id,
                username: seen.username.clone(),
                reading,
            });
        }
    }

    result
}

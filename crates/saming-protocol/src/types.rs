//! Core protocol vocabulary shared by every layer.
//!
//! Everything here travels on the wire in some form: identifiers, roles,
//! phases, and the routing tag that says who a server event is for. The
//! serialized names are the contract with the client — changing a
//! `rename_all` here breaks every connected frontend.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A server-issued player identifier.
///
/// Newtype over a v4 UUID so a `PlayerId` can never be confused with a
/// room code or a raw string. `#[serde(transparent)]` keeps the JSON a
/// plain string (`"4f0c..."`), not a wrapper object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Issues a fresh random id. Only the server calls this; clients are
    /// handed their id in the `welcome` event and echo it nowhere.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length of a room code in characters.
pub const ROOM_CODE_LEN: usize = 6;

/// A six-character room code, canonically uppercase.
///
/// Codes are case-insensitive on input and stored uppercase, so `"ab12cd"`
/// and `"AB12CD"` name the same room. Construction goes through
/// [`RoomCode::parse`]; there is no way to hold a malformed code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates and normalizes a raw code: exactly [`ROOM_CODE_LEN`]
    /// ASCII alphanumeric characters, uppercased.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if trimmed.len() != ROOM_CODE_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ProtocolError::InvalidRoomCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The canonical (uppercase) code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// The closed set of roles in a Tiger-Shaman game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// พญาสมิง — the alpha with a one-shot curse; reads "human" to the
    /// shaman while the curse is unspent.
    AlphaTiger,
    /// เสือสมิง — the ordinary killer on the tiger team.
    Tiger,
    /// หมอผี — reads one player per night as tiger or human.
    Shaman,
    /// นายพราน — protects one player per night; shoots back on death.
    Hunter,
    /// ชาวบ้าน — no night power.
    Villager,
}

impl Role {
    /// The team this role wins with.
    pub fn team(self) -> Team {
        match self {
            Role::AlphaTiger | Role::Tiger => Team::Tigers,
            Role::Shaman | Role::Hunter | Role::Villager => Team::Humans,
        }
    }

    /// Whether this role takes a turn during the night sub-protocol.
    pub fn acts_at_night(self) -> bool {
        !matches!(self, Role::Villager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::AlphaTiger => "alpha_tiger",
            Role::Tiger => "tiger",
            Role::Shaman => "shaman",
            Role::Hunter => "hunter",
            Role::Villager => "villager",
        };
        f.write_str(name)
    }
}

/// The two winning sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Tigers,
    Humans,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Team::Tigers => "tigers",
            Team::Humans => "humans",
        })
    }
}

/// The game phase, as shown to clients.
///
/// Legal transitions are enforced by the room controller, not here:
/// `Waiting → Day → Voting → Night → Day → …`, with `Ended` reachable
/// from any running phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Day,
    Voting,
    Night,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Waiting => "waiting",
            Phase::Day => "day",
            Phase::Voting => "voting",
            Phase::Night => "night",
            Phase::Ended => "ended",
        })
    }
}

/// What the shaman's vision reports about a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Tiger,
    Human,
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a server event?
// ---------------------------------------------------------------------------

/// Routing scope for an outbound event.
///
/// Controller operations return `(Recipient, ServerEvent)` pairs; the room
/// actor delivers them. Anything carrying private data must be
/// `Player`-scoped — broadcast events may only contain public state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected player in the room.
    All,
    /// One specific player.
    Player(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let id = PlayerId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[test]
    fn test_room_code_normalizes_to_uppercase() {
        let code = RoomCode::parse("ab12cd").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
        assert_eq!(code, RoomCode::parse("AB12cd").unwrap());
    }

    #[test]
    fn test_room_code_rejects_bad_input() {
        assert!(RoomCode::parse("").is_err());
        assert!(RoomCode::parse("ABC").is_err());
        assert!(RoomCode::parse("ABCDEFG").is_err());
        assert!(RoomCode::parse("AB-12!").is_err());
    }

    #[test]
    fn test_role_teams() {
        assert_eq!(Role::AlphaTiger.team(), Team::Tigers);
        assert_eq!(Role::Tiger.team(), Team::Tigers);
        assert_eq!(Role::Shaman.team(), Team::Humans);
        assert_eq!(Role::Hunter.team(), Team::Humans);
        assert_eq!(Role::Villager.team(), Team::Humans);
    }

    #[test]
    fn test_villager_has_no_night_turn() {
        assert!(!Role::Villager.acts_at_night());
        assert!(Role::Shaman.acts_at_night());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::AlphaTiger).unwrap();
        assert_eq!(json, "\"alpha_tiger\"");
        let back: Role = serde_json::from_str("\"villager\"").unwrap();
        assert_eq!(back, Role::Villager);
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Phase::Ended).unwrap(), "\"ended\"");
    }
}

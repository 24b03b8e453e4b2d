//! Client → server commands.
//!
//! Every inbound frame is one `{type, payload}` envelope. Adjacent tagging
//! (`tag = "type", content = "payload"`) reproduces that shape while giving
//! each command a typed payload — the game controller never touches
//! untyped JSON. Unknown `type` strings fail to deserialize, which the
//! connection handler answers with a direct `error` event.

use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// A command sent by a client.
///
/// The first three variants are lobby commands handled by the connection
/// layer; the rest are routed into the player's room and validated by the
/// room controller against the current phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientCommand {
    /// First frame on every connection. The server answers with `welcome`
    /// carrying the issued [`PlayerId`].
    Hello { username: String },

    /// Create a room and become its host.
    CreateRoom,

    /// Join an existing room by code (case-insensitive).
    JoinRoom { code: String },

    /// Leave the current room.
    LeaveRoom,

    /// Host only, `waiting` phase: assign roles and begin the first day.
    StartGame,

    /// Host only: end the current timed phase immediately.
    SkipPhase,

    /// Decline to use the current night power.
    SkipAction,

    /// Submit the acting role's night target.
    NightAction { target_id: PlayerId },

    /// Alpha tiger only: spend the one-shot curse on a player. Does not
    /// end the alpha's turn — that takes a `night_action` or `skip_action`.
    CurseAction { target_id: PlayerId },

    /// Vote to eliminate a player. Re-voting replaces the earlier vote.
    Vote { target_id: PlayerId },

    /// The dying hunter's retaliation shot.
    HunterShoot { target_id: PlayerId },

    /// Free-form chat, relayed to the room without arbitration.
    ChatMessage { content: String },
}

//! Server → client events.
//!
//! Same `{type, payload}` envelope as the inbound direction. Events that
//! carry a [`RoomSnapshot`] are always emitted per recipient (the snapshot
//! is viewer-tailored); the rest are safe to broadcast as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{NightSummary, PlayerId, Reading, Role, RoomSnapshot, Team};

/// An event sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `hello`: the issued identity.
    Welcome { player_id: PlayerId },

    /// Reply to `create_room`: the fresh room, host seated.
    RoomCreated { room: RoomSnapshot },

    /// Someone joined (the joiner's own copy doubles as state sync).
    PlayerJoined {
        player_id: PlayerId,
        username: String,
        room: RoomSnapshot,
    },

    /// Someone left. During a running game the seat stays in play and
    /// only the connection is gone.
    PlayerLeft {
        player_id: PlayerId,
        room: RoomSnapshot,
    },

    /// Roles are dealt; the snapshot shows the recipient their own role.
    GameStarted { room: RoomSnapshot },

    /// A phase transition. `night` carries the public night outcome when
    /// the transition leaves the night phase.
    PhaseChanged {
        room: RoomSnapshot,
        night: Option<NightSummary>,
    },

    /// The night turn moved to another role's table.
    NightRoleChange { role: Role },

    /// Shaman only: what tonight's vision reported.
    VisionResult {
        target_id: PlayerId,
        username: String,
        result: Reading,
    },

    /// Live tally refresh; votes are public.
    VoteUpdate {
        vote_results: BTreeMap<PlayerId, u32>,
        votes: BTreeMap<PlayerId, PlayerId>,
    },

    /// The vote is final. `eliminated` is `None` on a tie or a silent room.
    VoteResult {
        eliminated: Option<PlayerId>,
        vote_results: BTreeMap<PlayerId, u32>,
    },

    /// A death, by any cause. Roles are not revealed here.
    PlayerDied {
        player_id: PlayerId,
        username: String,
    },

    /// Prompt to the dying hunter: pick a retaliation target.
    HunterShoot { hunter_id: PlayerId },

    /// Terminal. Snapshots attached to this event reveal every role.
    GameEnded {
        winning_team: Team,
        room: RoomSnapshot,
    },

    /// Relayed chat.
    ChatMessage {
        player_id: PlayerId,
        username: String,
        content: String,
    },

    /// Direct to the offending sender, never broadcast.
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape_is_type_payload() {
        let event = ServerEvent::NightRoleChange { role: Role::Hunter };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "night_role_change");
        assert_eq!(json["payload"]["role"], "hunter");
    }

    #[test]
    fn test_error_event_shape() {
        let event = ServerEvent::Error {
            code: "not_your_turn".into(),
            message: "it is the shaman's turn".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["code"], "not_your_turn");
    }

    #[test]
    fn test_vision_result_round_trip() {
        let event = ServerEvent::VisionResult {
            target_id: PlayerId::new(),
            username: "prasert".into(),
            result: Reading::Tiger,
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let back: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_vote_update_round_trip() {
        let (a, b) = (PlayerId::new(), PlayerId::new());
        let event = ServerEvent::VoteUpdate {
            vote_results: BTreeMap::from([(a, 2)]),
            votes: BTreeMap::from([(a, a), (b, a)]),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let back: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, back);
    }
}

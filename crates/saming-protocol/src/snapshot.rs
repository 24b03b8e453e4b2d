//! Per-recipient room snapshots.
//!
//! A snapshot is always built *for* a viewer. Public state is identical in
//! every copy; `role` and `private` are populated only for the viewer's own
//! seat (and, once the game has ended, `role` for everyone). Hiding lives
//! in the projector that fills these structs — a snapshot type cannot
//! express "someone else's role" at all, so a generic serializer can never
//! leak one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Phase, PlayerId, Role, RoomCode, Team};

/// One player's row in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub username: String,
    pub alive: bool,
    /// Present during voting; votes are public.
    pub voted_for: Option<PlayerId>,
    /// The viewer's own role — or everyone's, once the game has ended.
    pub role: Option<Role>,
    /// Private flags, viewer's own seat only.
    pub private: Option<PrivateView>,
}

/// Hidden per-player flags, shown only to their owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrivateView {
    pub cursed: bool,
    pub has_used_curse: bool,
    pub can_shoot: bool,
    pub last_protected: Option<PlayerId>,
}

/// The public outcome of a night, attached to the `phase_changed` event
/// that leaves the night. The shaman's reading is *not* here — it travels
/// in a direct `vision_result` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSummary {
    /// Who died tonight, if anyone.
    pub killed: Option<PlayerId>,
    /// The hunter's protection stopped the kill.
    pub protected: bool,
    /// The shaman escaped the kill by correctly naming the hidden alpha.
    pub shaman_saved: bool,
}

/// A recipient-tailored view of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub phase: Phase,
    /// 1-based; increments each time a new day begins.
    pub round: u32,
    /// Unix milliseconds.
    pub created_at: u64,
    pub started_at: Option<u64>,
    /// Absolute deadline of the current phase (unix milliseconds), absent
    /// for untimed phases.
    pub phase_end_time: Option<u64>,
    /// Which role's table is acting, during the night.
    pub current_night_role: Option<Role>,
    pub waiting_hunter_shoot: bool,
    pub killed_tonight: Option<PlayerId>,
    /// Live vote tallies, target → count.
    pub vote_results: BTreeMap<PlayerId, u32>,
    pub winning_team: Option<Team>,
    /// In join order.
    pub players: Vec<PlayerView>,
}

//! View projection: recipient-tailored snapshots.
//!
//! Hidden-field omission is enforced here, in one place. Callers never
//! hand a raw [`Room`] or [`crate::Player`] to a serializer.

use saming_protocol::{Phase, PlayerId, PlayerView, PrivateView, RoomSnapshot};

use crate::Room;

/// Builds `viewer`'s snapshot of the room.
///
/// Public state is identical for every viewer. `role` is filled for the
/// viewer's own seat — and for every seat once the game has ended.
/// `private` flags are only ever filled for the viewer's own seat.
pub fn snapshot_for(room: &Room, viewer: PlayerId) -> RoomSnapshot {
    let reveal_roles = room.phase == Phase::Ended;

    let players = room
        .players
        .iter()
        .map(|p| {
            let own = p.id == viewer;
            PlayerView {
                id: p.id,
                username: p.username.clone(),
                alive: p.alive,
                voted_for: p.voted_for,
                role: if own || reveal_roles { p.role } else { None },
                private: own.then(|| PrivateView {
                    cursed: p.cursed,
                    has_used_curse: p.has_used_curse,
                    can_shoot: p.can_shoot,
                    last_protected: p.last_protected,
                }),
            }
        })
        .collect();

    RoomSnapshot {
        code: room.code.clone(),
        host_id: room.host_id,
        phase: room.phase,
        round: room.round,
        created_at: room.created_at,
        started_at: room.started_at,
        phase_end_time: room.phase_end_time,
        current_night_role: room.current_night_role,
        waiting_hunter_shoot: room.waiting_hunter_shoot,
        killed_tonight: room.killed_tonight,
        vote_results: room.vote_results.clone(),
        winning_team: room.winning_team,
        players,
    }
}

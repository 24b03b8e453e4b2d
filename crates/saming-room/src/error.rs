//! Error types for the room layer.

use saming_game::GameError;
use saming_protocol::RoomCode;

/// Errors from room lookup and delivery, plus rejected game operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room under this code.
    #[error("room {0:?} not found")]
    NotFound(String),

    /// The room's command channel is closed or full — the actor is gone
    /// or shutting down.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The room controller rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl RoomError {
    /// Stable code for the wire `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::NotFound(_) => "room_not_found",
            RoomError::Unavailable(_) => "room_unavailable",
            RoomError::Game(e) => e.code(),
        }
    }
}

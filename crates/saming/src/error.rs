//! Unified error type for the server crate.

use saming_protocol::ProtocolError;
use saming_room::RoomError;

/// Top-level error wrapping the lower layers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Encoding/decoding a frame failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The websocket connection failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The client never completed the hello exchange.
    #[error("handshake failed: {0}")]
    Handshake(&'static str),
}

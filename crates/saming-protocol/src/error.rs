//! Error type for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type` tag, or
    /// a payload that doesn't match the command's shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that isn't six ASCII alphanumerics.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// Structurally valid data that breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

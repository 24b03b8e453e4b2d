//! Codec trait and the JSON implementation.
//!
//! The connection layer doesn't care how frames are serialized; it goes
//! through [`Codec`]. JSON is the only implementation today (it is what
//! browser clients speak), kept behind the default-on `json` feature so a
//! binary codec can be added without touching callers.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts between protocol values and raw frame bytes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientCommand, ServerEvent};

    #[test]
    fn test_command_round_trip_through_codec() {
        let codec = JsonCodec;
        let cmd = ClientCommand::JoinRoom {
            code: "AB12CD".into(),
        };
        let bytes = codec.encode(&cmd).unwrap();
        let back: ClientCommand = codec.decode(&bytes).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let codec = JsonCodec;
        let result: Result<ServerEvent, _> = codec.decode(b"not json");
        assert!(result.is_err());
    }
}

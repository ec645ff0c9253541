//! Codec trait and the JSON implementation.
//!
//! A codec converts between wire types and raw frame bytes. The server
//! is generic over [`Codec`] so the encoding can change without touching
//! the coordinator or the connection handler. Browser clients speak JSON,
//! so [`JsonCodec`] is what the server uses by default.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use memoria_protocol::{ClientMessage, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage =
///     codec.decode(br#"{"type":"join-room","room_id":3}"#).unwrap();
/// assert_eq!(msg, ClientMessage::JoinRoom { room_id: RoomId(3) });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RelayKind, RelayMessage, ServerMessage};

    #[test]
    fn test_json_codec_encodes_server_message_as_text() {
        let bytes = JsonCodec
            .encode(&ServerMessage::Relay(RelayMessage {
                kind: RelayKind::PassTurn,
                data: serde_json::json!(true),
            }))
            .unwrap();
        let text = std::str::from_utf8(&bytes).expect("json is utf-8");
        assert!(text.contains(r#""kind":"passTurn""#));
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<ServerMessage, _> =
            JsonCodec.decode(b"definitely not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}

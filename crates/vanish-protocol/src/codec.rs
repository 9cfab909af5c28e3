//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and the text
//! frames that travel over the socket. The connection manager doesn't care
//! HOW messages are serialized; it only needs something that implements
//! [`Codec`]. The game server speaks JSON, so [`JsonCodec`] is the default.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to text frames and decode them back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between tasks (the connection manager
///   lives inside a spawned Tokio task).
/// - `'static` → the codec owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the frame, so the frame can be dropped right after.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed, carries an
    /// unknown message type, or doesn't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use vanish_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let frame = codec.encode(&ClientMessage::MakeMove { row: 1, col: 2 }).unwrap();
/// assert_eq!(frame, r#"{"type":"make_move","row":1,"col":2}"#);
///
/// let msg: ServerMessage = codec
///     .decode(r#"{"type":"error","message":"Invalid move"}"#)
///     .unwrap();
/// assert_eq!(msg, ServerMessage::Error { message: "Invalid move".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, ServerMessage};

    #[test]
    fn test_json_codec_encode_join_queue() {
        let frame = JsonCodec.encode(&ClientMessage::JoinQueue).unwrap();
        assert_eq!(frame, r#"{"type":"join_queue"}"#);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<ServerMessage, _> = JsonCodec.decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_unknown_type_returns_decode_error() {
        let result: Result<ServerMessage, _> =
            JsonCodec.decode(r#"{"type":"fly_to_moon","speed":9000}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}

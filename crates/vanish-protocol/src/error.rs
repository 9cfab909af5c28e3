//! Error types for the protocol layer.
//!
//! Each crate in Vanish defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning frames into messages (or back),
//! not in networking or session bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into a Rust value).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, missing
    /// required fields, or a board that isn't 3×3.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is well-formed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

//! Error types for the connection layer.

use vanish_protocol::ProtocolError;

/// Errors returned by [`ConnectionManager`](crate::ConnectionManager) and
/// [`Endpoint`](crate::Endpoint).
///
/// Transport failures never show up here: a dropped socket is reported as a
/// [`ConnectionEvent::Closed`](crate::ConnectionEvent::Closed) and handled
/// by the reconnect loop instead.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// A frame was sent while the connection wasn't open.
    #[error("not connected")]
    NotConnected,

    /// The origin or endpoint couldn't be turned into a socket URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The outbound message couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

//! Client-side transport abstraction for Vanish.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! the duplex, text-framed socket the game server speaks. Everything above
//! this crate works in whole frames; framing, pings and the WebSocket
//! handshake stay down here.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket connector via `tokio-tungstenite`

use std::fmt;
use std::future::Future;

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Dials outgoing connections.
///
/// The connection manager only ever holds one `Connector` and asks it for a
/// fresh [`Connection`] on every (re)connect attempt. Tests swap in an
/// in-memory implementation so reconnect logic runs without sockets.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;
    /// The error type for dial failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Opens a connection to `url` and completes the transport handshake.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;
}

/// A single duplex connection carrying UTF-8 text frames.
///
/// Methods take `&self` so a reader task and a writer task can share one
/// connection behind an `Arc`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one text frame to the remote peer.
    fn send(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next text frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_transport_error_connect_failed_mentions_url() {
        let err = TransportError::ConnectFailed {
            url: "ws://localhost:8000/ws/p1".into(),
            reason: "connection refused".into(),
        };
        let text = err.to_string();
        assert!(text.contains("ws://localhost:8000/ws/p1"));
        assert!(text.contains("connection refused"));
    }
}

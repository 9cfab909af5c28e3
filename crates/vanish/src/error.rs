//! Unified error type for the Vanish client.

use vanish_connection::ConnectionError;
use vanish_protocol::ProtocolError;
use vanish_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum VanishError {
    /// A transport-level error (dial, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection-level error (bad endpoint, not connected).
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The client's driver task is no longer running.
    #[error("client has stopped")]
    ClientStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let vanish_err: VanishError = err.into();
        assert!(matches!(vanish_err, VanishError::Transport(_)));
        assert!(vanish_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let vanish_err: VanishError = err.into();
        assert!(matches!(vanish_err, VanishError::Protocol(_)));
    }

    #[test]
    fn test_from_connection_error() {
        let err = ConnectionError::InvalidEndpoint("ftp://x".into());
        let vanish_err: VanishError = err.into();
        assert!(matches!(vanish_err, VanishError::Connection(_)));
        assert!(vanish_err.to_string().contains("ftp://x"));
    }

    #[test]
    fn test_client_stopped_message() {
        assert_eq!(VanishError::ClientStopped.to_string(), "client has stopped");
    }
}

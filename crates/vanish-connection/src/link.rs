//! The seam between the session state machine and the network.

use vanish_protocol::ClientMessage;

use crate::ConnectionError;

/// Lifecycle of the logical connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// A dial is in flight.
    Connecting,
    /// The socket is open; `send` will be accepted.
    Open,
    /// No socket. A reconnect may or may not be scheduled.
    #[default]
    Closed,
}

/// What the session machine needs from a connection.
///
/// [`ConnectionManager`](crate::ConnectionManager) is the production
/// implementation. Session tests plug in a recorder instead so they can
/// assert on outbound frames without sockets or timers.
pub trait Link {
    /// Opens the connection unless it is already open or opening.
    fn connect(&mut self);

    /// Closes the connection and suppresses automatic reconnection.
    fn disconnect(&mut self);

    /// Sends one message.
    ///
    /// # Errors
    /// [`ConnectionError::NotConnected`] unless the state is
    /// [`ConnectionState::Open`].
    fn send(&mut self, message: &ClientMessage) -> Result<(), ConnectionError>;

    fn state(&self) -> ConnectionState;
}

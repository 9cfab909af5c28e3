//! `ClientBuilder`: wires transport, connection and session together.

use vanish_connection::{ConnectionManager, Endpoint, ReconnectPolicy};
use vanish_protocol::PlayerId;
use vanish_session::{SessionConfig, SessionMachine};
use vanish_transport::{Connector, WebSocketConnector};

use crate::{GameClient, VanishError};

/// Builder for configuring and starting a [`GameClient`].
///
/// # Example
///
/// ```rust,no_run
/// use vanish::prelude::*;
///
/// # async fn run() -> Result<(), VanishError> {
/// let client = GameClient::builder()
///     .origin("http://localhost:3000")?
///     .build(PlayerId::generate());
/// client.join_queue()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: Endpoint,
    port: Option<u16>,
    policy: ReconnectPolicy,
    session: SessionConfig,
}

impl ClientBuilder {
    /// Creates a builder pointing at `ws://localhost:8000/ws`.
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::new("localhost"),
            port: None,
            policy: ReconnectPolicy::default(),
            session: SessionConfig::default(),
        }
    }

    /// Derives the endpoint from the origin the client was served from.
    ///
    /// # Errors
    /// [`VanishError::Connection`] if the origin can't be parsed.
    pub fn origin(mut self, origin: &str) -> Result<Self, VanishError> {
        self.endpoint = Endpoint::from_origin(origin)?;
        Ok(self)
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Overrides the server port, whichever way the endpoint was set.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session = config;
        self
    }

    /// The socket URL the client will dial for `identity`.
    pub fn url_for(&self, identity: &PlayerId) -> String {
        self.resolved_endpoint().url_for(identity)
    }

    /// Starts a client that dials over WebSocket.
    ///
    /// # Panics
    /// When called outside a Tokio runtime.
    pub fn build(self, identity: PlayerId) -> GameClient {
        self.build_with(WebSocketConnector, identity)
    }

    /// Starts a client on any [`Connector`].
    ///
    /// # Panics
    /// When called outside a Tokio runtime.
    pub fn build_with<C: Connector>(self, connector: C, identity: PlayerId) -> GameClient {
        let url = self.url_for(&identity);
        let link = ConnectionManager::new(connector, url).with_policy(self.policy);
        GameClient::spawn(SessionMachine::new(identity, link, self.session))
    }

    fn resolved_endpoint(&self) -> Endpoint {
        match self.port {
            Some(port) => self.endpoint.clone().with_port(port),
            None => self.endpoint.clone(),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_defaults_to_localhost() {
        let url = ClientBuilder::new().url_for(&PlayerId::new("p1"));
        assert_eq!(url, "ws://localhost:8000/ws/p1");
    }

    #[test]
    fn test_url_for_origin_and_port_override() {
        let url = ClientBuilder::new()
            .port(9000)
            .origin("https://play.example.com")
            .unwrap()
            .url_for(&PlayerId::new("p1"));
        assert_eq!(url, "wss://play.example.com:9000/ws/p1");
    }

    #[test]
    fn test_origin_invalid_returns_error() {
        let result = ClientBuilder::new().origin("not an origin");
        assert!(matches!(result, Err(VanishError::Connection(_))));
    }
}

//! Socket addressing.
//!
//! The game server listens on a fixed port of the same host that served the
//! client, so the socket URL is derived from an origin such as
//! `https://play.example.com` by swapping the scheme and port and appending
//! the player's identity: `wss://play.example.com:8000/ws/<player_id>`.

use std::fmt::{self, Write as _};

use vanish_protocol::PlayerId;

use crate::ConnectionError;

/// Where the game server's socket lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    secure: bool,
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_PATH: &'static str = "/ws";

    /// A plain `ws://` endpoint on the default port and path.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            secure: false,
            host: host.into(),
            port: Self::DEFAULT_PORT,
            path: Self::DEFAULT_PATH.to_string(),
        }
    }

    /// Derives the endpoint from the origin the client was loaded from.
    ///
    /// Accepts `scheme://host[:port][/path]` where the scheme is one of
    /// `http`, `https`, `ws` or `wss`. Bracketed IPv6 hosts are kept as is.
    /// The origin's own port and path are discarded in favour of
    /// [`Self::DEFAULT_PORT`] and [`Self::DEFAULT_PATH`].
    ///
    /// # Errors
    /// [`ConnectionError::InvalidEndpoint`] for an unknown scheme, a missing
    /// host, or a non-numeric port.
    pub fn from_origin(origin: &str) -> Result<Self, ConnectionError> {
        let invalid = |why: &str| ConnectionError::InvalidEndpoint(format!("{origin:?}: {why}"));

        let (scheme, rest) = origin
            .trim()
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        let secure = match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => false,
            "https" | "wss" => true,
            _ => return Err(invalid("unsupported scheme")),
        };

        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let authority = authority.rsplit_once('@').map_or(authority, |(_, a)| a);

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (inner, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 host"))?;
            if inner.is_empty() {
                return Err(invalid("empty host"));
            }
            let port = match after {
                "" => None,
                p => Some(p.strip_prefix(':').ok_or_else(|| invalid("junk after host"))?),
            };
            (format!("[{inner}]"), port)
        } else {
            match authority.split_once(':') {
                Some((h, p)) => (h.to_string(), Some(p)),
                None => (authority.to_string(), None),
            }
        };

        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(invalid("missing host"));
        }
        if let Some(port) = port {
            port.parse::<u16>().map_err(|_| invalid("bad port"))?;
        }

        Ok(Self {
            secure,
            host,
            port: Self::DEFAULT_PORT,
            path: Self::DEFAULT_PATH.to_string(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Replaces the path prefix the identity is appended to.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let trimmed = path.trim_end_matches('/');
        self.path = if trimmed.starts_with('/') || trimmed.is_empty() {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The full socket URL for one player.
    ///
    /// The identity is opaque, so it is percent-encoded as a single path
    /// segment. Generated ids contain only unreserved characters and pass
    /// through unchanged.
    pub fn url_for(&self, player: &PlayerId) -> String {
        format!("{self}/{}", encode_segment(player.as_str()))
    }
}

/// Percent-encodes everything outside RFC 3986's unreserved set.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte));
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "wss" } else { "ws" };
        write!(f, "{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

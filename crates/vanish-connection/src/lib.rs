//! Connection management for the Vanish client.
//!
//! [`ConnectionManager`] owns the single logical connection to the game
//! server: it dials through a [`vanish_transport::Connector`], decodes
//! inbound frames into [`ServerMessage`](vanish_protocol::ServerMessage)s,
//! and reconnects with bounded exponential backoff
//! ([`ReconnectPolicy`]) when the socket drops.
//!
//! ```text
//!            connect()            dial ok
//!  Closed ─────────────► Connecting ─────────► Open
//!    ▲  ▲                    │                  │
//!    │  └── backoff timer ───┤ dial failed      │ socket lost
//!    │                       ▼                  │
//!    └─────────────────── Closed ◄──────────────┘
//! ```
//!
//! The session state machine talks to it through the [`Link`] trait.

use std::future;

use tokio::time::Instant;

mod endpoint;
mod error;
mod link;
mod manager;
mod policy;

pub use endpoint::Endpoint;
pub use error::ConnectionError;
pub use link::{ConnectionState, Link};
pub use manager::{ConnectionEvent, ConnectionManager, Retry};
pub use policy::ReconnectPolicy;

/// Sleeps until `deadline`, or forever when there is none.
///
/// Lets an optional timer sit in a `tokio::select!` branch.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => future::pending().await,
    }
}

//! # Vanish
//!
//! Realtime client core for tic-tac-toe with vanishing marks.
//!
//! Vanish keeps one logical session with the game server alive over an
//! unreliable WebSocket: it reconnects with bounded backoff, applies
//! server snapshots as they arrive, and guards the player's intents so a
//! double click can never send two moves.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vanish::prelude::*;
//!
//! # async fn run() -> Result<(), VanishError> {
//! let client = GameClient::builder()
//!     .origin("http://localhost:3000")?
//!     .build(PlayerId::generate());
//!
//! let mut updates = client.subscribe();
//! client.join_queue()?;
//! while updates.changed().await.is_ok() {
//!     let state = updates.borrow().clone();
//!     println!("{:?}", state.phase());
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod error;

pub use builder::ClientBuilder;
pub use client::GameClient;
pub use error::VanishError;

pub use vanish_connection as connection;
pub use vanish_protocol as protocol;
pub use vanish_session as session;
pub use vanish_transport as transport;

/// Installs a `tracing` subscriber that writes to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Does nothing if
/// a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything an embedder usually needs.
pub mod prelude {
    pub use crate::{ClientBuilder, GameClient, VanishError};
    pub use vanish_connection::{ConnectionState, Endpoint, ReconnectPolicy};
    pub use vanish_protocol::{
        Board, Cell, Coord, GamePhase, GameSnapshot, Outcome, PlayerId, PlayerRecord,
    };
    pub use vanish_session::{Connectivity, Matchmaking, SessionConfig, SessionPhase, SessionState};
}

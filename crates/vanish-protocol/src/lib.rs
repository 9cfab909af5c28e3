//! Wire protocol for Vanish.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`ServerMessage`], [`ClientMessage`], [`PlayerId`]): the
//!   frames that travel on the wire.
//! - **Snapshots** ([`GameSnapshot`], [`Board`], [`Cell`]): the
//!   server-authoritative game state those frames carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages are turned
//!   into text frames and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the
//! connection manager (typed events). It knows nothing about sockets or
//! session state.
//!
//! ```text
//! Transport (frames) → Protocol (ServerMessage) → Connection → Session
//! ```

mod codec;
mod error;
mod snapshot;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use snapshot::{
    BOARD_SIZE, Board, Cell, Coord, GamePhase, GameSnapshot, Outcome, PlayerRecord,
};
pub use types::{ClientMessage, GameId, PlayerId, ServerMessage};

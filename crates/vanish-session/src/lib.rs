//! Session state machine for the Vanish client.
//!
//! This crate turns the stream coming out of the connection manager into a
//! [`SessionState`] a UI can render, and guards the player's intents:
//!
//! 1. **Inbound**: server snapshots replace the local game wholesale;
//!    errors and departures become self-clearing notices.
//! 2. **Intents**: `join_queue`, `submit_move` and `leave_game` are checked
//!    against the current state before anything is sent.
//! 3. **Pending-move lock**: at most one move is in flight; the next
//!    snapshot or error releases it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Driver (above)  ← owns the machine, feeds it inputs, publishes state
//!     ↕
//! Session Layer (this crate)  ← SessionMachine, SessionState
//!     ↕
//! Connection Layer (below)  ← Link trait, ConnectionEvent
//! ```

mod machine;
mod state;

pub use machine::{Input, Intent, SessionMachine};
pub use state::{Connectivity, Matchmaking, SessionConfig, SessionPhase, SessionState};

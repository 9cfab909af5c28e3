//! Wire messages exchanged with the game server.
//!
//! This module defines every type that travels "on the wire": the inbound
//! [`ServerMessage`] stream and the outbound [`ClientMessage`] intents, plus
//! the identity newtypes they carry. Board snapshots are
//! [`GameSnapshot`](crate::GameSnapshot)s.
//!
//! Every frame is one JSON object with a `type` discriminator. Both enums use
//! serde's "internally tagged" representation, so
//! `ClientMessage::MakeMove { row: 0, col: 2 }` becomes
//! `{"type":"make_move","row":0,"col":2}`.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::GameSnapshot;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The stable identity of a player.
///
/// An opaque string token created once and persisted by whoever embeds the
/// client (a file, browser storage, ...). The server addresses the socket by
/// it and reports it back in `current_turn`, `winner` and `players`, so it's
/// the key the session uses to decide "is it my turn?".
///
/// `#[serde(transparent)]` serializes `PlayerId("p1")` as plain `"p1"`.
/// `Ord` is derived so ids can key a `BTreeMap` deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an existing identity token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh identity of the form `player_<unix-millis>_<9 chars>`.
    ///
    /// Call this once and persist the result; a player that generates a new
    /// id on every start looks like a stranger to the server.
    pub fn generate() -> Self {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut rng = rand::rng();
        let suffix: String = (0..9)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();

        Self(format!("player_{millis}_{suffix}"))
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Server-assigned identifier of one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ServerMessage (inbound)
// ---------------------------------------------------------------------------

/// Everything the server can push to a client.
///
/// Decoding fails closed: an unknown `type`, a missing field, or a
/// snapshot of the wrong shape is a [`ProtocolError`](crate::ProtocolError),
/// and the connection manager drops the frame instead of forwarding a
/// half-typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once the socket is registered on the server.
    Connected { player_id: PlayerId, message: String },

    /// The player is queued and waiting for an opponent.
    Waiting { message: String },

    /// A match was found. Carries the opening snapshot.
    GameStart { game: GameSnapshot },

    /// A move was applied. Carries the full new snapshot.
    GameUpdate { game: GameSnapshot },

    /// The match ended. `winner` is `None` for a draw.
    GameOver {
        game: GameSnapshot,
        winner: Option<PlayerId>,
    },

    /// The opponent left via `leave_game`.
    PlayerLeft { player_id: PlayerId, message: String },

    /// The opponent's socket dropped.
    PlayerDisconnected { player_id: PlayerId, message: String },

    /// A protocol-level failure ("Invalid move", "You are not in a game").
    Error { message: String },
}

impl ServerMessage {
    /// The wire `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Waiting { .. } => "waiting",
            Self::GameStart { .. } => "game_start",
            Self::GameUpdate { .. } => "game_update",
            Self::GameOver { .. } => "game_over",
            Self::PlayerLeft { .. } => "player_left",
            Self::PlayerDisconnected { .. } => "player_disconnected",
            Self::Error { .. } => "error",
        }
    }

    /// Returns the snapshot carried by `game_start`, `game_update` and
    /// `game_over`.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        match self {
            Self::GameStart { game } | Self::GameUpdate { game } | Self::GameOver { game, .. } => {
                Some(game)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage (outbound)
// ---------------------------------------------------------------------------

/// Everything a client can ask of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the matchmaking queue.
    JoinQueue,

    /// Place a mark at `(row, col)`. The server decides legality.
    MakeMove { row: usize, col: usize },

    /// Abandon the current match.
    LeaveGame,
}

#[cfg(test)]
mod tests {
    //! The server defines the exact JSON shapes. These tests pin our serde
    //! attributes to them, because a mismatch means every frame is dropped.

    use super::*;

    // =====================================================================
    // Identity
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("player_1")).unwrap();
        assert_eq!(json, "\"player_1\"");
    }

    #[test]
    fn test_player_id_display_is_raw_token() {
        assert_eq!(PlayerId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_player_id_generate_has_expected_shape() {
        let id = PlayerId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();

        assert_eq!(parts.len(), 3, "got {id}");
        assert_eq!(parts[0], "player");
        assert!(parts[1].parse::<u128>().is_ok(), "timestamp part: {}", parts[1]);
        assert_eq!(parts[2].len(), 9);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_player_id_generate_is_unique() {
        assert_ne!(PlayerId::generate(), PlayerId::generate());
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_server_message_connected_from_server_json() {
        let json = r#"{"type":"connected","player_id":"p1","message":"Connected to game server"}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Connected {
                player_id: PlayerId::new("p1"),
                message: "Connected to game server".into(),
            }
        );
        assert_eq!(msg.kind(), "connected");
    }

    #[test]
    fn test_server_message_waiting_from_server_json() {
        let json = r#"{"type":"waiting","message":"Waiting for opponent..."}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ServerMessage::Waiting { .. }));
        assert!(msg.snapshot().is_none());
    }

    #[test]
    fn test_server_message_player_disconnected_is_distinct_variant() {
        let json = r#"{"type":"player_disconnected","player_id":"p2","message":"Opponent disconnected"}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            msg,
            ServerMessage::PlayerDisconnected { ref player_id, .. } if player_id.as_str() == "p2"
        ));
    }

    #[test]
    fn test_server_message_game_over_with_null_winner() {
        let json = r#"{
            "type": "game_over",
            "game": {
                "game_id": "g1",
                "board": [["X","O","X"],["X","O","O"],["O","X","X"]],
                "players": [
                    {"player_id": "p1", "symbol": "X"},
                    {"player_id": "p2", "symbol": "O"}
                ],
                "state": "finished",
                "current_turn": "p1",
                "winner": null,
                "move_count": 9,
                "next_vanishing": {}
            },
            "winner": null
        }"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::GameOver { game, winner } => {
                assert!(winner.is_none());
                assert_eq!(game.move_count, 9);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn test_server_message_error_json_format() {
        let msg = ServerMessage::Error {
            message: "Invalid move".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Invalid move");
    }

    #[test]
    fn test_server_message_unknown_type_returns_error() {
        let result: Result<ServerMessage, _> =
            serde_json::from_str(r#"{"type":"spectate","message":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_missing_type_returns_error() {
        let result: Result<ServerMessage, _> = serde_json::from_str(r#"{"message":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_missing_required_field_returns_error() {
        // `game_start` without a `game` is half-typed data; it must not parse.
        let result: Result<ServerMessage, _> = serde_json::from_str(r#"{"type":"game_start"}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_client_message_join_queue_json_format() {
        let json: serde_json::Value = serde_json::to_value(ClientMessage::JoinQueue).unwrap();
        assert_eq!(json, serde_json::json!({"type": "join_queue"}));
    }

    #[test]
    fn test_client_message_make_move_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(ClientMessage::MakeMove { row: 0, col: 0 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "make_move", "row": 0, "col": 0}));
    }

    #[test]
    fn test_client_message_leave_game_json_format() {
        let json: serde_json::Value = serde_json::to_value(ClientMessage::LeaveGame).unwrap();
        assert_eq!(json, serde_json::json!({"type": "leave_game"}));
    }
}

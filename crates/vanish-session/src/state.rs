//! Session types: what the client currently believes about the world.
//!
//! [`SessionState`] is the single value a presentation layer renders. It is
//! only ever mutated by [`SessionMachine`](crate::SessionMachine); everyone
//! else gets clones.

use std::time::Duration;

use vanish_connection::ConnectionState;
use vanish_protocol::{GamePhase, GameSnapshot};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timings for the session's self-clearing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a server `error` stays visible before it clears itself.
    ///
    /// Default: 3 seconds.
    pub notice_ttl: Duration,

    /// How long after the opponent leaves before the finished game is
    /// cleared and the player is back in the lobby.
    ///
    /// Default: 3 seconds.
    pub opponent_left_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            notice_ttl: Duration::from_secs(3),
            opponent_left_grace: Duration::from_secs(3),
        }
    }
}

impl SessionConfig {
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn with_opponent_left_grace(mut self, grace: Duration) -> Self {
        self.opponent_left_grace = grace;
        self
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether the player is queued for a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Matchmaking {
    #[default]
    Idle,
    Waiting,
}

/// The connectivity indicator shown to the player.
///
/// ```text
///   Offline ──(opened)──→ Stable ──(lost)──→ Reconnecting ──(opened)──→ Stable
///                                                │
///                                        (5th attempt failed)
///                                                ▼
///                                            Exhausted
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Connected, or never had a problem.
    Stable,
    /// Lost the socket; attempt `attempt` fires after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// Not connected and nothing scheduled.
    #[default]
    Offline,
    /// Automatic reconnection gave up. Only an explicit connect retries.
    Exhausted { attempts: u32 },
}

/// Where the player is, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    /// Connected, not queued, no game.
    Lobby,
    AwaitingMatch,
    InGame(GamePhase),
}

/// Everything the client knows about its session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Read-only mirror of the connection manager's state.
    pub connection: ConnectionState,
    pub matchmaking: Matchmaking,
    /// The latest server snapshot. Replaced wholesale, never patched.
    pub game: Option<GameSnapshot>,
    /// A move was sent and no snapshot or error has answered it yet.
    pub pending_move: bool,
    /// A short-lived message for the player.
    pub transient_error: Option<String>,
    pub connectivity: Connectivity,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.connection != ConnectionState::Open {
            return SessionPhase::Disconnected;
        }
        match (&self.game, self.matchmaking) {
            (Some(game), _) => SessionPhase::InGame(game.state),
            (None, Matchmaking::Waiting) => SessionPhase::AwaitingMatch,
            (None, Matchmaking::Idle) => SessionPhase::Lobby,
        }
    }

    /// Drops the game and queue membership.
    pub(crate) fn clear_game(&mut self) {
        self.game = None;
        self.matchmaking = Matchmaking::Idle;
        self.pending_move = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanish_protocol::{Board, Cell, GameId, PlayerId, PlayerRecord};

    fn game(state: GamePhase) -> GameSnapshot {
        GameSnapshot {
            game_id: GameId("g1".into()),
            board: Board::default(),
            players: [
                PlayerRecord {
                    player_id: PlayerId::new("a"),
                    symbol: Cell::X,
                },
                PlayerRecord {
                    player_id: PlayerId::new("b"),
                    symbol: Cell::O,
                },
            ],
            state,
            current_turn: Some(PlayerId::new("a")),
            winner: None,
            move_count: 0,
            next_vanishing: Default::default(),
        }
    }

    fn open() -> SessionState {
        SessionState {
            connection: ConnectionState::Open,
            ..SessionState::default()
        }
    }

    #[test]
    fn test_default_state_is_disconnected_and_offline() {
        let state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Disconnected);
        assert_eq!(state.connectivity, Connectivity::Offline);
        assert!(!state.pending_move);
    }

    #[test]
    fn test_phase_open_without_game_is_lobby() {
        assert_eq!(open().phase(), SessionPhase::Lobby);
    }

    #[test]
    fn test_phase_waiting_is_awaiting_match() {
        let state = SessionState {
            matchmaking: Matchmaking::Waiting,
            ..open()
        };
        assert_eq!(state.phase(), SessionPhase::AwaitingMatch);
    }

    #[test]
    fn test_phase_follows_game_state() {
        let mut state = open();
        state.game = Some(game(GamePhase::Playing));
        assert_eq!(state.phase(), SessionPhase::InGame(GamePhase::Playing));

        state.game = Some(game(GamePhase::Finished));
        assert_eq!(state.phase(), SessionPhase::InGame(GamePhase::Finished));
    }

    #[test]
    fn test_phase_connecting_with_game_is_disconnected() {
        let state = SessionState {
            connection: ConnectionState::Connecting,
            game: Some(game(GamePhase::Playing)),
            ..SessionState::default()
        };
        assert_eq!(state.phase(), SessionPhase::Disconnected);
    }

    #[test]
    fn test_session_config_builders() {
        let config = SessionConfig::default()
            .with_notice_ttl(Duration::from_millis(500))
            .with_opponent_left_grace(Duration::from_secs(1));
        assert_eq!(config.notice_ttl, Duration::from_millis(500));
        assert_eq!(config.opponent_left_grace, Duration::from_secs(1));
    }
}

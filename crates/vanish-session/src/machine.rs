//! The session state machine.
//!
//! [`SessionMachine::handle`] is the only way state changes. Every input
//! (a connection event, a player intent, or a timer tick) is applied to
//! completion before the next one is looked at, so there is never a
//! half-updated [`SessionState`] to observe.
//!
//! Timers are plain deadlines. The owner asks for
//! [`next_deadline`](SessionMachine::next_deadline), sleeps until then, and
//! feeds [`Input::Tick`].

use tokio::time::Instant;
use tracing::{debug, info, warn};
use vanish_connection::{ConnectionError, ConnectionEvent, ConnectionState, Link};
use vanish_protocol::{ClientMessage, PlayerId, ServerMessage};

use crate::{Connectivity, Matchmaking, SessionConfig, SessionState};

const OPPONENT_LEFT_FALLBACK: &str = "Opponent has left the game";

/// Something the player wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Disconnect,
    JoinQueue,
    SubmitMove { row: usize, col: usize },
    LeaveGame,
}

/// One unit of work for [`SessionMachine::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Connection(ConnectionEvent),
    Intent(Intent),
    /// Fire any timers whose deadline has passed.
    Tick,
}

impl From<ConnectionEvent> for Input {
    fn from(event: ConnectionEvent) -> Self {
        Self::Connection(event)
    }
}

impl From<Intent> for Input {
    fn from(intent: Intent) -> Self {
        Self::Intent(intent)
    }
}

/// Turns server messages and player intents into [`SessionState`].
///
/// Owns its [`Link`] by value. Intents never return errors: a guard that
/// rejects an intent does nothing, and a failed send becomes a
/// `transient_error` the player can see.
pub struct SessionMachine<L: Link> {
    identity: PlayerId,
    link: L,
    config: SessionConfig,
    state: SessionState,
    error_clear_at: Option<Instant>,
    reset_at: Option<Instant>,
}

impl<L: Link> SessionMachine<L> {
    pub fn new(identity: PlayerId, link: L, config: SessionConfig) -> Self {
        let state = SessionState {
            connection: link.state(),
            ..SessionState::default()
        };
        Self {
            identity,
            link,
            config,
            state,
            error_clear_at: None,
            reset_at: None,
        }
    }

    pub fn identity(&self) -> &PlayerId {
        &self.identity
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// The earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.error_clear_at, self.reset_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Applies one input.
    pub fn handle(&mut self, input: impl Into<Input>) {
        match input.into() {
            Input::Connection(event) => self.on_connection(event),
            Input::Intent(intent) => self.on_intent(intent),
            Input::Tick => self.on_tick(Instant::now()),
        }
        self.state.connection = self.link.state();
    }

    // -----------------------------------------------------------------------
    // Connection events
    // -----------------------------------------------------------------------

    fn on_connection(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => {
                info!(player_id = %self.identity, "session online");
                self.state.connectivity = Connectivity::Stable;
                self.clear_error();
            }
            ConnectionEvent::Message(message) => self.on_message(message),
            ConnectionEvent::Closed { reason, retry } => {
                info!(player_id = %self.identity, %reason, "session lost its connection");
                self.state.clear_game();
                self.reset_at = None;
                self.state.connectivity = match retry {
                    Some(retry) => Connectivity::Reconnecting {
                        attempt: retry.attempt,
                        delay: retry.delay,
                    },
                    None => Connectivity::Offline,
                };
            }
            ConnectionEvent::Reconnecting { attempt } => {
                debug!(player_id = %self.identity, attempt, "redialing");
            }
            ConnectionEvent::GaveUp { attempts } => {
                warn!(player_id = %self.identity, attempts, "server unreachable");
                self.state.connectivity = Connectivity::Exhausted { attempts };
            }
        }
    }

    fn on_message(&mut self, message: ServerMessage) {
        debug!(kind = message.kind(), "applying server message");
        match message {
            ServerMessage::Connected { .. } => {
                self.state.connectivity = Connectivity::Stable;
                self.clear_error();
            }
            ServerMessage::Waiting { .. } => {
                self.state.matchmaking = Matchmaking::Waiting;
                self.state.game = None;
                self.reset_at = None;
            }
            ServerMessage::GameStart { game } => {
                info!(game_id = %game.game_id, "game started");
                self.state.matchmaking = Matchmaking::Idle;
                self.state.game = Some(game);
                self.state.pending_move = false;
                self.reset_at = None;
            }
            ServerMessage::GameUpdate { game } => {
                self.state.matchmaking = Matchmaking::Idle;
                self.state.game = Some(game);
                self.state.pending_move = false;
            }
            ServerMessage::GameOver { game, winner } => {
                info!(
                    game_id = %game.game_id,
                    winner = winner.as_ref().map_or("draw", PlayerId::as_str),
                    "game over"
                );
                self.state.matchmaking = Matchmaking::Idle;
                self.state.game = Some(game);
                self.state.pending_move = false;
            }
            ServerMessage::PlayerLeft { message, .. }
            | ServerMessage::PlayerDisconnected { message, .. } => {
                let text = if message.trim().is_empty() {
                    OPPONENT_LEFT_FALLBACK.to_string()
                } else {
                    message
                };
                info!(%text, "opponent gone");
                self.state.transient_error = Some(text);
                self.state.pending_move = false;
                self.error_clear_at = None;
                self.reset_at = Some(Instant::now() + self.config.opponent_left_grace);
            }
            ServerMessage::Error { message } => {
                debug!(%message, "server error");
                self.state.transient_error = Some(message);
                self.state.pending_move = false;
                self.error_clear_at = Some(Instant::now() + self.config.notice_ttl);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    fn on_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Connect => self.link.connect(),
            Intent::Disconnect => {
                self.link.disconnect();
                self.state.clear_game();
                self.reset_at = None;
                self.state.connectivity = Connectivity::Offline;
            }
            Intent::JoinQueue => self.join_queue(),
            Intent::SubmitMove { row, col } => self.submit_move(row, col),
            Intent::LeaveGame => self.leave_game(),
        }
    }

    fn join_queue(&mut self) {
        if self.link.state() != ConnectionState::Open {
            debug!("join_queue ignored: not connected");
            return;
        }
        self.clear_error();
        if let Err(e) = self.link.send(&ClientMessage::JoinQueue) {
            self.send_failed(e);
        }
    }

    fn submit_move(&mut self, row: usize, col: usize) {
        let Some(game) = &self.state.game else {
            debug!(row, col, "move ignored: no game");
            return;
        };
        if !game.is_turn_of(&self.identity) {
            debug!(row, col, phase = ?game.state, "move ignored: not our turn");
            return;
        }
        if self.state.pending_move {
            debug!(row, col, "move ignored: previous move pending");
            return;
        }
        if !game.board.get(row, col).is_some_and(|cell| cell.is_empty()) {
            debug!(row, col, "move ignored: cell unavailable");
            return;
        }

        self.state.pending_move = true;
        if let Err(e) = self.link.send(&ClientMessage::MakeMove { row, col }) {
            self.state.pending_move = false;
            self.send_failed(e);
        }
    }

    fn leave_game(&mut self) {
        let sent = match self.state.game {
            Some(_) => self.link.send(&ClientMessage::LeaveGame),
            None => Ok(()),
        };

        self.state.clear_game();
        self.clear_error();
        self.reset_at = None;

        if let Err(e) = sent {
            self.send_failed(e);
        }
    }

    fn send_failed(&mut self, error: ConnectionError) {
        warn!(error = %error, "send failed");
        self.state.transient_error = Some(format!("Could not reach the server: {error}"));
        self.error_clear_at = Some(Instant::now() + self.config.notice_ttl);
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn on_tick(&mut self, now: Instant) {
        if self.reset_at.is_some_and(|at| at <= now) {
            debug!("opponent-left grace elapsed");
            self.reset_at = None;
            self.state.clear_game();
        }
        if self.error_clear_at.is_some_and(|at| at <= now) {
            self.clear_error();
        }
    }

    fn clear_error(&mut self) {
        self.state.transient_error = None;
        self.error_clear_at = None;
    }
}

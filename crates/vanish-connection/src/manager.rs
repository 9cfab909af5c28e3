//! The reconnecting connection manager.
//!
//! # Architecture
//!
//! ```text
//!  dial task ──┐
//!  reader task ├─► Signal { generation, .. } ─► ConnectionManager ─► ConnectionEvent
//!  writer task ┘        (unbounded mpsc)          (next_event)
//! ```
//!
//! Helper tasks never touch manager state. They post signals tagged with
//! the generation they were started under, and the manager ignores any
//! signal whose generation is no longer current. That is how a late dial
//! result or a frame from a replaced socket is discarded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use vanish_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
use vanish_transport::{Connection, ConnectionId, Connector};

use crate::{ConnectionError, ConnectionState, Link, ReconnectPolicy, wait_until};

/// A scheduled automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    /// 1-indexed attempt number.
    pub attempt: u32,
    pub delay: Duration,
}

/// What [`ConnectionManager::next_event`] reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The socket is open.
    Opened,
    /// A decoded server frame.
    Message(ServerMessage),
    /// The socket closed or a dial failed. `retry` is `None` when no
    /// automatic reconnect follows.
    Closed {
        reason: String,
        retry: Option<Retry>,
    },
    /// A scheduled reconnect fired and a new dial is underway.
    Reconnecting { attempt: u32 },
    /// The attempt ceiling was hit. Nothing more happens until `connect()`.
    GaveUp { attempts: u32 },
}

enum Signal<T> {
    Dialed {
        generation: u64,
        result: Result<T, String>,
    },
    Frame {
        generation: u64,
        text: String,
    },
    Lost {
        generation: u64,
        reason: String,
    },
}

/// The pieces of an open socket the manager holds on to.
struct Live {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
}

enum Step<T> {
    Signal(Signal<T>),
    Retry,
}

/// Keeps at most one live connection to the game server and hides
/// transient failures behind bounded exponential backoff.
///
/// The manager is driven by polling [`next_event`](Self::next_event), which
/// is cancel-safe and meant to sit inside a `tokio::select!`. Reconnect
/// timers only fire while someone is polling it.
pub struct ConnectionManager<C: Connector, K: Codec = JsonCodec> {
    connector: Arc<C>,
    codec: K,
    url: String,
    policy: ReconnectPolicy,
    state: ConnectionState,
    generation: u64,
    attempts: u32,
    reconnect_at: Option<Instant>,
    dial: Option<JoinHandle<()>>,
    live: Option<Live>,
    pending: VecDeque<ConnectionEvent>,
    signals_tx: mpsc::UnboundedSender<Signal<C::Connection>>,
    signals_rx: mpsc::UnboundedReceiver<Signal<C::Connection>>,
}

impl<C: Connector> ConnectionManager<C, JsonCodec> {
    /// Creates a manager that speaks JSON to `url`. Nothing is dialed until
    /// [`connect`](Self::connect).
    pub fn new(connector: C, url: impl Into<String>) -> Self {
        Self::with_codec(connector, url, JsonCodec)
    }
}

impl<C: Connector, K: Codec> ConnectionManager<C, K> {
    pub fn with_codec(connector: C, url: impl Into<String>, codec: K) -> Self {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        Self {
            connector: Arc::new(connector),
            codec,
            url: url.into(),
            policy: ReconnectPolicy::default(),
            state: ConnectionState::Closed,
            generation: 0,
            attempts: 0,
            reconnect_at: None,
            dial: None,
            live: None,
            pending: VecDeque::new(),
            signals_tx,
            signals_rx,
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failed attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the next automatic dial fires, if one is scheduled.
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Starts a dial unless one is in flight or the socket is already open.
    ///
    /// Cancels a scheduled reconnect and dials right away instead. After the
    /// manager gave up, this also resets the attempt counter.
    pub fn connect(&mut self) {
        if self.state != ConnectionState::Closed {
            debug!(state = ?self.state, "connect ignored");
            return;
        }
        self.reconnect_at = None;
        if self.attempts >= self.policy.max_attempts {
            self.attempts = 0;
        }
        self.start_dial();
    }

    /// Closes the socket and cancels any dial or scheduled reconnect.
    ///
    /// Frames already handed to [`send`](Self::send) are flushed before
    /// the socket closes. Calling this while closed is a no-op.
    pub fn disconnect(&mut self) {
        self.reconnect_at = None;
        if let Some(dial) = self.dial.take() {
            dial.abort();
        }
        if self.state != ConnectionState::Closed {
            info!(url = %self.url, "disconnecting");
        }
        self.teardown();
        self.pending.clear();
        self.state = ConnectionState::Closed;
    }

    /// Encodes `message` and queues it for the writer task.
    ///
    /// # Errors
    /// [`ConnectionError::NotConnected`] unless the socket is open, or
    /// [`ConnectionError::Protocol`] if encoding fails.
    pub fn send(&mut self, message: &ClientMessage) -> Result<(), ConnectionError> {
        let live = match (&self.live, self.state) {
            (Some(live), ConnectionState::Open) => live,
            _ => return Err(ConnectionError::NotConnected),
        };
        let frame = self.codec.encode(message)?;
        trace!(id = %live.id, %frame, "sending frame");
        live.outbound
            .send(frame)
            .map_err(|_| ConnectionError::NotConnected)
    }

    /// Waits for the next connection event.
    ///
    /// Cancel-safe: dropping the future loses nothing, so it can be raced
    /// against other work in `tokio::select!`. Pends forever while closed
    /// with nothing scheduled.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }

            let deadline = self.reconnect_at;
            let step = tokio::select! {
                Some(signal) = self.signals_rx.recv() => Step::Signal(signal),
                () = wait_until(deadline) => Step::Retry,
            };

            match step {
                Step::Signal(signal) => self.on_signal(signal),
                Step::Retry => {
                    self.reconnect_at = None;
                    info!(attempt = self.attempts, url = %self.url, "reconnecting");
                    self.start_dial();
                    return ConnectionEvent::Reconnecting {
                        attempt: self.attempts,
                    };
                }
            }
        }
    }

    fn start_dial(&mut self) {
        self.generation += 1;
        self.state = ConnectionState::Connecting;

        let generation = self.generation;
        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let tx = self.signals_tx.clone();
        debug!(generation, url = %url, "dialing");

        self.dial = Some(tokio::spawn(async move {
            let result = connector.connect(&url).await.map_err(|e| e.to_string());
            let _ = tx.send(Signal::Dialed { generation, result });
        }));
    }

    fn on_signal(&mut self, signal: Signal<C::Connection>) {
        match signal {
            Signal::Dialed { generation, result } if generation != self.generation => {
                if let Ok(conn) = result {
                    debug!(id = %conn.id(), "closing stale connection");
                    tokio::spawn(async move {
                        let _ = conn.close().await;
                    });
                }
            }
            Signal::Dialed { result, .. } => {
                self.dial = None;
                match result {
                    Ok(conn) => self.on_open(conn),
                    Err(reason) => self.on_lost(reason),
                }
            }
            Signal::Frame { generation, text } if generation == self.generation => {
                match self.codec.decode::<ServerMessage>(&text) {
                    Ok(message) => {
                        trace!(kind = message.kind(), "frame received");
                        self.pending.push_back(ConnectionEvent::Message(message));
                    }
                    Err(e) => warn!(error = %e, frame = %text, "dropping malformed frame"),
                }
            }
            Signal::Lost { generation, reason } if generation == self.generation => {
                self.on_lost(reason);
            }
            Signal::Frame { .. } | Signal::Lost { .. } => trace!("ignoring stale signal"),
        }
    }

    fn on_open(&mut self, conn: C::Connection) {
        let id = conn.id();
        let conn = Arc::new(conn);
        let generation = self.generation;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let reader = spawn_reader(Arc::clone(&conn), generation, self.signals_tx.clone());
        spawn_writer(conn, generation, outbound_rx, self.signals_tx.clone());

        info!(%id, url = %self.url, "connected");
        self.live = Some(Live {
            id,
            outbound,
            reader,
        });
        self.attempts = 0;
        self.state = ConnectionState::Open;
        self.pending.push_back(ConnectionEvent::Opened);
    }

    fn on_lost(&mut self, reason: String) {
        self.teardown();
        self.state = ConnectionState::Closed;

        if self.attempts < self.policy.max_attempts {
            self.attempts += 1;
            let delay = self.policy.delay_for(self.attempts);
            self.reconnect_at = Some(Instant::now() + delay);
            warn!(
                attempt = self.attempts,
                delay_ms = delay.as_millis() as u64,
                %reason,
                "connection lost, reconnect scheduled"
            );
            self.pending.push_back(ConnectionEvent::Closed {
                reason,
                retry: Some(Retry {
                    attempt: self.attempts,
                    delay,
                }),
            });
        } else {
            warn!(attempts = self.attempts, %reason, "giving up on reconnecting");
            self.pending.push_back(ConnectionEvent::Closed {
                reason,
                retry: None,
            });
            self.pending.push_back(ConnectionEvent::GaveUp {
                attempts: self.attempts,
            });
        }
    }

    /// Drops the live socket and invalidates every signal already in flight.
    fn teardown(&mut self) {
        self.generation += 1;
        if let Some(live) = self.live.take() {
            debug!(id = %live.id, "closing connection");
            live.reader.abort();
            // Dropping `outbound` lets the writer flush and close.
        }
    }
}

impl<C: Connector, K: Codec> Drop for ConnectionManager<C, K> {
    fn drop(&mut self) {
        if let Some(dial) = self.dial.take() {
            dial.abort();
        }
        self.teardown();
    }
}

impl<C: Connector, K: Codec> Link for ConnectionManager<C, K> {
    fn connect(&mut self) {
        ConnectionManager::connect(self);
    }

    fn disconnect(&mut self) {
        ConnectionManager::disconnect(self);
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), ConnectionError> {
        ConnectionManager::send(self, message)
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}

fn spawn_reader<T: Connection>(
    conn: Arc<T>,
    generation: u64,
    tx: mpsc::UnboundedSender<Signal<T>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let signal = match conn.recv().await {
                Ok(Some(text)) => Signal::Frame { generation, text },
                Ok(None) => Signal::Lost {
                    generation,
                    reason: "connection closed by server".to_string(),
                },
                Err(e) => Signal::Lost {
                    generation,
                    reason: e.to_string(),
                },
            };
            let done = matches!(signal, Signal::Lost { .. });
            if tx.send(signal).is_err() || done {
                break;
            }
        }
    })
}

fn spawn_writer<T: Connection>(
    conn: Arc<T>,
    generation: u64,
    mut frames: mpsc::UnboundedReceiver<String>,
    tx: mpsc::UnboundedSender<Signal<T>>,
) {
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = conn.send(&frame).await {
                let _ = tx.send(Signal::Lost {
                    generation,
                    reason: e.to_string(),
                });
                return;
            }
        }
        if let Err(e) = conn.close().await {
            debug!(id = %conn.id(), error = %e, "close failed");
        }
    });
}

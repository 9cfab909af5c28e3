//! `GameClient` handle and its driver task.
//!
//! The driver is the only place the session is mutated. It loops over three
//! sources and applies whichever is ready first:
//!
//! ```text
//!   connection events ──┐
//!   next timer deadline ├─► SessionMachine::handle ─► watch channel ─► subscribers
//!   handle commands ────┘
//! ```

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use vanish_connection::{ConnectionManager, wait_until};
use vanish_protocol::{Codec, PlayerId};
use vanish_session::{Input, Intent, SessionMachine, SessionState};
use vanish_transport::Connector;

use crate::{ClientBuilder, VanishError};

enum Command {
    Intent(Intent),
    Shutdown,
}

/// A running game client.
///
/// Cheap to query, and every action is fire-and-forget: methods only fail
/// when the driver task is gone. Results show up as new
/// [`SessionState`]s on [`subscribe`](Self::subscribe).
///
/// Dropping the handle aborts the driver; prefer
/// [`shutdown`](Self::shutdown) for an orderly close.
pub struct GameClient {
    identity: PlayerId,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionState>,
    task: Option<JoinHandle<()>>,
}

impl GameClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Spawns the driver for `machine` and starts connecting.
    pub(crate) fn spawn<C, K>(machine: SessionMachine<ConnectionManager<C, K>>) -> Self
    where
        C: Connector,
        K: Codec,
    {
        let identity = machine.identity().clone();
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (publish, state) = watch::channel(machine.state().clone());
        let task = tokio::spawn(drive(machine, commands_rx, publish));

        Self {
            identity,
            commands,
            state,
            task: Some(task),
        }
    }

    pub fn identity(&self) -> &PlayerId {
        &self.identity
    }

    /// The latest published state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn join_queue(&self) -> Result<(), VanishError> {
        self.intent(Intent::JoinQueue)
    }

    /// Asks to place a mark. Ignored unless it's our turn, no move is
    /// pending, and the cell is empty.
    pub fn submit_move(&self, row: usize, col: usize) -> Result<(), VanishError> {
        self.intent(Intent::SubmitMove { row, col })
    }

    pub fn leave_game(&self) -> Result<(), VanishError> {
        self.intent(Intent::LeaveGame)
    }

    /// Connects now, cancelling any backoff. This is the way out after
    /// automatic reconnection gave up.
    pub fn reconnect(&self) -> Result<(), VanishError> {
        self.intent(Intent::Connect)
    }

    pub fn disconnect(&self) -> Result<(), VanishError> {
        self.intent(Intent::Disconnect)
    }

    /// Disconnects and waits for the driver to finish.
    pub async fn shutdown(mut self) -> Result<(), VanishError> {
        let _ = self.commands.send(Command::Shutdown);
        match self.task.take() {
            Some(task) => task.await.map_err(|_| VanishError::ClientStopped),
            None => Ok(()),
        }
    }

    fn intent(&self, intent: Intent) -> Result<(), VanishError> {
        self.commands
            .send(Command::Intent(intent))
            .map_err(|_| VanishError::ClientStopped)
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn drive<C, K>(
    mut machine: SessionMachine<ConnectionManager<C, K>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    publish: watch::Sender<SessionState>,
) where
    C: Connector,
    K: Codec,
{
    info!(player_id = %machine.identity(), url = machine.link().url(), "client started");
    machine.handle(Intent::Connect);
    publish_state(&publish, &machine);

    loop {
        let deadline = machine.next_deadline();
        let input = tokio::select! {
            event = machine.link_mut().next_event() => Input::Connection(event),
            () = wait_until(deadline) => Input::Tick,
            command = commands.recv() => match command {
                Some(Command::Intent(intent)) => Input::Intent(intent),
                Some(Command::Shutdown) | None => break,
            },
        };
        machine.handle(input);
        publish_state(&publish, &machine);
    }

    machine.handle(Intent::Disconnect);
    publish_state(&publish, &machine);
    info!(player_id = %machine.identity(), "client stopped");
}

fn publish_state<C: Connector, K: Codec>(
    publish: &watch::Sender<SessionState>,
    machine: &SessionMachine<ConnectionManager<C, K>>,
) {
    let next = machine.state();
    let changed = publish.send_if_modified(|current| {
        if current == next {
            return false;
        }
        current.clone_from(next);
        true
    });
    if changed {
        debug!(phase = ?next.phase(), "state published");
    }
}

//! Vanish terminal client.
//!
//! Renders the session on every change and forwards typed commands as
//! intents. Logs go to stderr; set `RUST_LOG=debug` to see frames and
//! rejected moves.

mod command;
mod render;

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use vanish::prelude::*;

use crate::command::{Command, HELP};

/// Play vanishing tic-tac-toe from the terminal
#[derive(Parser, Debug)]
#[command(name = "vanish-terminal")]
#[command(version, about, long_about = None)]
struct Args {
    /// Origin the game is served from; the socket uses the same host
    #[arg(long, default_value = "http://localhost:3000")]
    origin: String,

    /// Game server port
    #[arg(long, default_value_t = Endpoint::DEFAULT_PORT)]
    port: u16,

    /// Play as this identity instead of the stored one
    #[arg(long)]
    player_id: Option<String>,

    /// Where the generated identity is kept between runs
    #[arg(long, default_value = ".vanish-player")]
    identity_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("identity file {}: {source}", path.display())]
    Identity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error(transparent)]
    Client(#[from] VanishError),
}

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    vanish::init_tracing();
    let args = Args::parse();

    let identity = match args.player_id {
        Some(id) => PlayerId::new(id),
        None => load_or_create_identity(&args.identity_file)?,
    };

    let client = GameClient::builder()
        .origin(&args.origin)?
        .port(args.port)
        .build(identity.clone());
    info!(player_id = %identity, "starting");
    println!("Playing as {identity}. {HELP}");

    let mut updates = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print!("\n{}", render::render(&state, &identity));
            }
            line = lines.next_line() => {
                let Some(line) = line.map_err(DemoError::Stdin)? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(command) => dispatch(&client, command)?,
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    client.shutdown().await?;
    Ok(())
}

fn dispatch(client: &GameClient, command: Command) -> Result<(), VanishError> {
    match command {
        Command::Join => client.join_queue(),
        Command::Move { row, col } => client.submit_move(row, col),
        Command::Leave => client.leave_game(),
        Command::Reconnect => client.reconnect(),
        Command::Help | Command::Quit => Ok(()),
    }
}

/// Reads the stored identity, generating and saving one on first run.
fn load_or_create_identity(path: &Path) -> Result<PlayerId, DemoError> {
    let io_err = |source| DemoError::Identity {
        path: path.to_path_buf(),
        source,
    };

    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => return Ok(PlayerId::new(text.trim())),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(e)),
    }

    let identity = PlayerId::generate();
    std::fs::write(path, format!("{identity}\n")).map_err(io_err)?;
    info!(player_id = %identity, path = %path.display(), "created new identity");
    Ok(identity)
}

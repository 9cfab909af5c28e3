//! Text rendering of a [`SessionState`].

use std::fmt::Write as _;

use vanish::prelude::*;

/// Renders the whole screen for `state` as seen by `me`.
pub fn render(state: &SessionState, me: &PlayerId) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "── {} ──", connectivity(state));
    match state.phase() {
        SessionPhase::Disconnected => {}
        SessionPhase::Lobby => out.push_str("In the lobby. Type `join` to find a match.\n"),
        SessionPhase::AwaitingMatch => out.push_str("Waiting for an opponent...\n"),
        SessionPhase::InGame(_) => {}
    }
    if let Some(game) = &state.game {
        render_game(&mut out, game, me, state.pending_move);
    }
    if let Some(error) = &state.transient_error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

fn connectivity(state: &SessionState) -> String {
    match (state.connectivity, state.connection) {
        (_, ConnectionState::Open) => "online".to_string(),
        (Connectivity::Reconnecting { attempt, .. }, ConnectionState::Connecting) => {
            format!("reconnecting (attempt {attempt})...")
        }
        (Connectivity::Reconnecting { attempt, delay }, _) => {
            format!("connection lost, retry {attempt} in {}s", delay.as_secs())
        }
        (Connectivity::Exhausted { attempts }, _) => {
            format!("server unreachable after {attempts} attempts; type `reconnect`")
        }
        (_, ConnectionState::Connecting) => "connecting...".to_string(),
        _ => "offline".to_string(),
    }
}

fn render_game(out: &mut String, game: &GameSnapshot, me: &PlayerId, pending: bool) {
    let mine = game.symbol_of(me).map_or('?', Cell::as_char);
    let opponent = game
        .opponent_of(me)
        .map_or_else(|| "?".to_string(), |p| p.player_id.to_string());
    let _ = writeln!(out, "You are {mine} vs {opponent}   (move {})", game.move_count);

    let vanishing = game.next_vanishing_for(me);
    out.push_str("    0 1 2\n");
    for (r, row) in game.board.rows().enumerate() {
        let _ = write!(out, "  {r}");
        for (c, cell) in row.iter().enumerate() {
            let fading = vanishing == Some(Coord { row: r, col: c });
            let mark = if fading {
                cell.as_char().to_ascii_lowercase()
            } else {
                cell.as_char()
            };
            let _ = write!(out, " {mark}");
        }
        out.push('\n');
    }
    if let Some(coord) = vanishing {
        let _ = writeln!(
            out,
            "Your mark at ({}, {}) vanishes on your next move.",
            coord.row, coord.col
        );
    }

    let status = match game.outcome_for(me) {
        Some(Outcome::Won) => "You won!".to_string(),
        Some(Outcome::Lost) => "You lost.".to_string(),
        Some(Outcome::Draw) => "Draw.".to_string(),
        None if pending => "Move sent, waiting for the server...".to_string(),
        None if game.is_turn_of(me) => "Your turn: move <row> <col>".to_string(),
        None => "Opponent's turn.".to_string(),
    };
    let _ = writeln!(out, "{status}");
}

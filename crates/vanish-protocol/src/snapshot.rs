//! Server-authoritative game snapshots.
//!
//! A [`GameSnapshot`] is never patched locally: every `game_start`,
//! `game_update` and `game_over` frame carries a complete one that replaces
//! the previous value wholesale. The helpers below only read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{GameId, PlayerId};

/// Side length of the board.
pub const BOARD_SIZE: usize = 3;

/// One square of the board.
///
/// The server encodes an empty square as the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Single-character rendering, `.` for empty.
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

/// The 3×3 grid, row-major.
///
/// A board with any other shape fails to deserialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(pub [[Cell; BOARD_SIZE]; BOARD_SIZE]);

impl Board {
    /// Returns the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.0.get(row)?.get(col).copied()
    }

    /// Iterates the rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_SIZE]> {
        self.0.iter()
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

/// A seated player and the symbol they place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub symbol: Cell,
}

/// Lifecycle of a match as the server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Playing,
    Finished,
}

/// How a finished match ended from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Draw,
}

/// The full state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub board: Board,
    /// Exactly two seats; any other count fails to deserialize.
    pub players: [PlayerRecord; 2],
    pub state: GamePhase,
    pub current_turn: Option<PlayerId>,
    /// `None` with [`GamePhase::Finished`] means a draw.
    pub winner: Option<PlayerId>,
    pub move_count: u32,
    /// The mark each player will lose on their next move.
    #[serde(default)]
    pub next_vanishing: BTreeMap<PlayerId, Coord>,
}

impl GameSnapshot {
    /// Looks up the seat of `id`.
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| &p.player_id == id)
    }

    /// The other seat, if `id` is seated in this game.
    pub fn opponent_of(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.player(id)?;
        self.players.iter().find(|p| &p.player_id != id)
    }

    pub fn symbol_of(&self, id: &PlayerId) -> Option<Cell> {
        self.player(id).map(|p| p.symbol)
    }

    /// True while the match is live and the server says it's `id`'s move.
    pub fn is_turn_of(&self, id: &PlayerId) -> bool {
        self.state == GamePhase::Playing && self.current_turn.as_ref() == Some(id)
    }

    /// The result for `id`, or `None` while the match is still running.
    pub fn outcome_for(&self, id: &PlayerId) -> Option<Outcome> {
        if self.state != GamePhase::Finished {
            return None;
        }
        Some(match &self.winner {
            None => Outcome::Draw,
            Some(w) if w == id => Outcome::Won,
            Some(_) => Outcome::Lost,
        })
    }

    pub fn next_vanishing_for(&self, id: &PlayerId) -> Option<Coord> {
        self.next_vanishing.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_json() -> serde_json::Value {
        serde_json::json!({
            "game_id": "game_1",
            "board": [["X", "", ""], ["", "O", ""], ["X", "", "O"]],
            "players": [
                {"player_id": "alice", "symbol": "X"},
                {"player_id": "bob", "symbol": "O"}
            ],
            "state": "playing",
            "current_turn": "alice",
            "winner": null,
            "move_count": 4,
            "next_vanishing": {"alice": {"row": 0, "col": 0}}
        })
    }

    fn parse(value: serde_json::Value) -> Result<GameSnapshot, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_snapshot_deserialize_full_server_shape() {
        let snap = parse(snapshot_json()).unwrap();

        assert_eq!(snap.game_id.to_string(), "game_1");
        assert_eq!(snap.board.get(0, 0), Some(Cell::X));
        assert_eq!(snap.board.get(0, 1), Some(Cell::Empty));
        assert_eq!(snap.board.get(2, 2), Some(Cell::O));
        assert_eq!(snap.state, GamePhase::Playing);
        assert_eq!(snap.move_count, 4);
        assert_eq!(
            snap.next_vanishing_for(&"alice".into()),
            Some(Coord { row: 0, col: 0 })
        );
        assert_eq!(snap.next_vanishing_for(&"bob".into()), None);
    }

    #[test]
    fn test_snapshot_missing_next_vanishing_defaults_to_empty() {
        let mut json = snapshot_json();
        json.as_object_mut().unwrap().remove("next_vanishing");

        let snap = parse(json).unwrap();
        assert!(snap.next_vanishing.is_empty());
    }

    #[test]
    fn test_snapshot_board_not_three_by_three_fails() {
        let mut json = snapshot_json();
        json["board"] = serde_json::json!([["X", ""], ["", "O"]]);
        assert!(parse(json).is_err());
    }

    #[test]
    fn test_snapshot_wrong_player_count_fails() {
        let mut json = snapshot_json();
        json["players"] = serde_json::json!([{"player_id": "alice", "symbol": "X"}]);
        assert!(parse(json).is_err());
    }

    #[test]
    fn test_snapshot_unknown_cell_symbol_fails() {
        let mut json = snapshot_json();
        json["board"][1][1] = serde_json::json!("Z");
        assert!(parse(json).is_err());
    }

    #[test]
    fn test_snapshot_unknown_phase_fails() {
        let mut json = snapshot_json();
        json["state"] = serde_json::json!("waiting");
        assert!(parse(json).is_err());
    }

    #[test]
    fn test_cell_empty_serializes_as_empty_string() {
        assert_eq!(serde_json::to_string(&Cell::Empty).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&Cell::O).unwrap(), "\"O\"");
    }

    #[test]
    fn test_board_get_out_of_bounds_returns_none() {
        let board = Board::default();
        assert_eq!(board.get(3, 0), None);
        assert_eq!(board.get(0, 3), None);
        assert_eq!(board.get(2, 2), Some(Cell::Empty));
    }

    #[test]
    fn test_snapshot_player_helpers() {
        let snap = parse(snapshot_json()).unwrap();
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");
        let stranger = PlayerId::new("carol");

        assert_eq!(snap.symbol_of(&alice), Some(Cell::X));
        assert_eq!(snap.opponent_of(&alice).map(|p| &p.player_id), Some(&bob));
        assert!(snap.opponent_of(&stranger).is_none());
        assert!(snap.is_turn_of(&alice));
        assert!(!snap.is_turn_of(&bob));
        assert_eq!(snap.outcome_for(&alice), None);
    }

    #[test]
    fn test_snapshot_outcome_for_finished_game() {
        let mut json = snapshot_json();
        json["state"] = serde_json::json!("finished");
        json["winner"] = serde_json::json!("bob");
        let snap = parse(json).unwrap();

        assert_eq!(snap.outcome_for(&"bob".into()), Some(Outcome::Won));
        assert_eq!(snap.outcome_for(&"alice".into()), Some(Outcome::Lost));
        assert!(!snap.is_turn_of(&"alice".into()), "no turns after the end");
    }

    #[test]
    fn test_snapshot_outcome_for_draw() {
        let mut json = snapshot_json();
        json["state"] = serde_json::json!("finished");
        let snap = parse(json).unwrap();

        assert_eq!(snap.outcome_for(&"alice".into()), Some(Outcome::Draw));
    }
}

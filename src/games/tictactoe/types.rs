//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label used when a session is created without a name.
const DEFAULT_NAME: &str = "Untitled Game";

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A single square of the board: a player's mark, or `None` when empty.
///
/// Serializes as `"X"`, `"O"`, or `null`, matching the wire shape of the board.
pub type Cell = Option<Player>;

/// 3x3 tic-tac-toe board.
///
/// Cells are stored in row-major order (index = row * 3 + col):
///
/// ```text
///  0 | 1 | 2
///  3 | 4 | 5
///  6 | 7 | 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    /// Gets the cell at the given position, or `None` if out of bounds.
    pub fn cell(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: usize) -> bool {
        matches!(self.cell(pos), Some(None))
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Places a mark. Callers must have validated the position and occupancy.
    pub(super) fn set(&mut self, pos: usize, mark: Player) {
        self.cells[pos] = Some(mark);
    }

    /// Checks for a winner on the board.
    ///
    /// The 8 lines are checked in a fixed order (rows, columns, diagonals) so
    /// the result is deterministic; under legal play only one line can be
    /// complete anyway.
    pub fn winner(&self) -> Option<Player> {
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
            [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
            [0, 4, 8], [2, 4, 6],             // Diagonals
        ];

        for [a, b, c] in LINES {
            if let Some(mark) = self.cells[a]
                && self.cells[b] == Some(mark)
                && self.cells[c] == Some(mark)
            {
                return Some(mark);
            }
        }

        None
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.cells[pos] {
                    None => " ".to_string(),
                    Some(Player::X) => "X".to_string(),
                    Some(Player::O) => "O".to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Current status of a game, derived from its terminal fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Player),
    /// Game ended in a draw.
    Draw,
}

/// Complete state of one game session.
///
/// Values are immutable: an accepted move produces a brand-new `GameState`
/// that supersedes the stored one. `id` and `name` are assigned at creation
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Unique session identifier.
    id: String,
    /// Display label for the session.
    name: String,
    /// The board.
    board: Board,
    /// Player whose turn is next.
    current_player: Player,
    /// The winning player, once a winning line exists.
    winner: Option<Player>,
    /// True exactly when all cells are occupied and there is no winner.
    is_draw: bool,
}

impl GameState {
    /// Creates a fresh game with a newly generated unique identifier.
    ///
    /// Identifiers are UUIDs, so they are never reused by later sessions.
    pub fn with_name(name: Option<String>) -> Self {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => DEFAULT_NAME.to_string(),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            board: Board::new(),
            current_player: Player::X,
            winner: None,
            is_draw: false,
        }
    }

    /// Returns the session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player whose turn is next.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the winner, if a winning line exists.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Returns true when the board filled up with no winner.
    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    /// Returns the game status derived from the terminal fields.
    pub fn status(&self) -> GameStatus {
        match self.winner {
            Some(player) => GameStatus::Won(player),
            None if self.is_draw => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// Checks whether further moves are invalid.
    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    /// Returns a copy of this state with the current player's mark placed.
    ///
    /// Callers must have validated the move; this only performs the state
    /// transition: place the mark, flip the turn, recompute the terminal
    /// fields. The original state is untouched.
    pub(super) fn place(&self, position: usize) -> Self {
        let mut next = self.clone();
        next.board.set(position, self.current_player);
        next.current_player = self.current_player.opponent();
        next.winner = next.board.winner();
        next.is_draw = next.winner.is_none() && next.board.is_full();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.cells().iter().all(|c| c.is_none()));
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_opponent_flips() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
    }

    #[test]
    fn test_fresh_game_state() {
        let state = GameState::with_name(None);
        assert_eq!(state.name(), "Untitled Game");
        assert_eq!(state.current_player(), Player::X);
        assert_eq!(state.winner(), None);
        assert!(!state.is_draw());
        assert_eq!(state.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_fresh_games_get_distinct_ids() {
        let a = GameState::with_name(None);
        let b = GameState::with_name(None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_name_falls_back_to_default() {
        let state = GameState::with_name(Some(String::new()));
        assert_eq!(state.name(), "Untitled Game");
    }

    #[test]
    fn test_display_renders_grid() {
        let mut board = Board::new();
        board.set(0, Player::X);
        board.set(4, Player::O);
        assert_eq!(board.display(), "X| | \n-+-+-\n |O| \n-+-+-\n | | ");
    }

    #[test]
    fn test_wire_shape() {
        let state = GameState::with_name(Some("Lunch break".to_string()));
        let value = serde_json::to_value(&state).expect("serialize");

        assert_eq!(value["name"], "Lunch break");
        assert_eq!(value["currentPlayer"], "X");
        assert_eq!(value["winner"], serde_json::Value::Null);
        assert_eq!(value["isDraw"], false);
        let board = value["board"].as_array().expect("board array");
        assert_eq!(board.len(), 9);
        assert!(board.iter().all(|c| c.is_null()));
    }
}

mod rules;
mod types;

pub use rules::{MoveError, apply_move};
pub use types::{Board, Cell, GameState, GameStatus, Player};

/// Alias for clarity in session management.
pub type Mark = Player;

//! Pure rules for tic-tac-toe: move validation and state transition.

use super::types::GameState;
use derive_more::{Display, Error};
use tracing::instrument;

/// Reasons a move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Position is not an integer in `[0, 8]`.
    #[display("position must be an integer between 0 and 8")]
    InvalidPosition,
    /// Target cell already holds a mark.
    #[display("cell is already occupied")]
    CellOccupied,
    /// The game has a winner or ended in a draw.
    #[display("game is already over")]
    GameOver,
}

/// Applies a move for the current player at `position` (0-8).
///
/// Pure function: on success a brand-new [`GameState`] is returned and the
/// input state is left untouched, so any prior holder still observes the
/// pre-move value.
///
/// # Errors
///
/// - [`MoveError::GameOver`] when the game already has a winner or is a draw.
/// - [`MoveError::InvalidPosition`] when `position` is outside `[0, 8]`.
/// - [`MoveError::CellOccupied`] when the target cell is not empty.
#[instrument(skip(state), fields(id = %state.id()))]
pub fn apply_move(state: &GameState, position: usize) -> Result<GameState, MoveError> {
    if state.is_over() {
        return Err(MoveError::GameOver);
    }
    if position >= 9 {
        return Err(MoveError::InvalidPosition);
    }
    if !state.board().is_empty(position) {
        return Err(MoveError::CellOccupied);
    }

    Ok(state.place(position))
}

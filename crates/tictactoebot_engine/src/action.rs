//! Rejections produced when setting up a board or applying a move.
//!
//! Every variant is recoverable: the board is left untouched and the
//! caller re-renders the current state.

use super::{Participant, UserId};

/// Error returned by [`Board::apply_move`](crate::Board::apply_move) and
/// [`Board::apply_ai_move`](crate::Board::apply_ai_move).
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The acting user is not seated at this board.
    #[display("User {} is not playing this game", _0)]
    NotAParticipant(#[error(not(source))] UserId),

    /// The board already holds a winning line or is full.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// Someone else holds the move.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(#[error(not(source))] Participant),

    /// Cell index outside `1..=9`.
    #[display("Cell {} is not on the board", _0)]
    InvalidCell(#[error(not(source))] u8),

    /// Cell already carries a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] u8),
}

/// Error returned when a board cannot be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SetupError {
    /// The author must play `Cross` or `Zero`.
    #[display("A player must pick cross or zero")]
    EmptySymbol,

    /// Author and target are the same user.
    #[display("User {} cannot play against themself", _0)]
    SelfPlay(#[error(not(source))] UserId),
}

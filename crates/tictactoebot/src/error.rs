//! Errors surfaced by the session registry.

use derive_more::{Display, Error, From};
use tictactoebot_engine::{BoardId, MoveError, SetupError};

use crate::ProfileError;

/// Failure of a registry operation.
///
/// Everything except `Profile` is a rejected action: the board is untouched
/// and the caller just re-renders it.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// No live board has this id.
    #[display("Session {_0} not found")]
    SessionNotFound(#[error(not(source))] BoardId),
    /// The move was rejected by the board.
    #[display("{_0}")]
    #[from]
    Move(MoveError),
    /// The board could not be created.
    #[display("{_0}")]
    #[from]
    Setup(SetupError),
    /// The profile store failed.
    #[display("{_0}")]
    #[from]
    Profile(ProfileError),
}

impl SessionError {
    /// Returns true for recoverable rejections that left the board unchanged.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SessionError::Profile(_))
    }
}

//! Tic-tac-toe engine - pure game logic, no I/O.
//!
//! # Architecture
//!
//! - **Types**: marks, difficulty, language and participant identities
//! - **Board**: the 3x3 state machine with turn arbitration
//! - **Rules**: line and fullness checks shared by board and AI
//! - **AI**: random and minimax opponents over a mover-relative [`Position`]
//!
//! # Example
//!
//! ```
//! use tictactoebot_engine::{Board, BoardId, MinimaxAi, Symbol, TerminalState, UserId};
//!
//! let player = UserId::new(7);
//! let mut board = Board::solo(BoardId::new(1), player, Symbol::Cross).unwrap();
//! board.apply_move(player, 5).unwrap();
//! let reply = board.apply_ai_move(&mut MinimaxAi::new()).unwrap();
//! assert_ne!(reply, 5);
//! assert_eq!(board.check_terminal(), TerminalState::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod ai;
mod board;
mod position;
mod rules;
mod types;

pub use action::{MoveError, SetupError};
pub use ai::{MinimaxAi, RandomAi, StandardProvider, Strategy, StrategyProvider};
pub use board::{Board, BoardId, TerminalState};
pub use position::{FREE, OPPONENT, OWN, Position, PositionError};
pub use rules::{LINES, has_line, is_full};
pub use types::{CROSS_GLYPH, Difficulty, Language, Participant, Symbol, UserId, ZERO_GLYPH};

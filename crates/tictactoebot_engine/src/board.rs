//! One game's grid plus seat and turn bookkeeping.
//!
//! A board goes `AwaitingFirstMove -> InProgress -> Won | Draw`. It is
//! mutated only by [`Board::apply_move`] and [`Board::apply_ai_move`];
//! rejected calls leave it exactly as it was.

use crate::ai::Strategy;
use crate::position::{FREE, OPPONENT, OWN};
use crate::{MoveError, Participant, Position, SetupError, Symbol, UserId, rules};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Opaque session identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
pub struct BoardId(u64);

impl BoardId {
    /// Wraps a raw identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    /// No line and at least one free cell.
    InProgress,
    /// The participant owns a complete line.
    Won(Participant),
    /// Full board, no line.
    Draw,
}

impl TerminalState {
    /// Returns true for `Won` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminalState::InProgress)
    }

    /// Returns the winner, if any.
    pub fn winner(&self) -> Option<Participant> {
        match self {
            TerminalState::Won(p) => Some(*p),
            _ => None,
        }
    }
}

/// A single game between an author and a target (human or computer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    author: UserId,
    target: Participant,
    author_symbol: Symbol,
    target_symbol: Symbol,
    cells: [Symbol; 9],
    next_turn: Participant,
    history: Vec<u8>,
}

impl Board {
    /// Creates an empty board. The author moves first.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptySymbol`] if `author_symbol` is `Empty` and
    /// [`SetupError::SelfPlay`] if the target is the author.
    #[instrument(skip_all, fields(%id, %author, %target))]
    pub fn new(
        id: BoardId,
        author: UserId,
        target: Participant,
        author_symbol: Symbol,
    ) -> Result<Self, SetupError> {
        if !author_symbol.is_mark() {
            return Err(SetupError::EmptySymbol);
        }
        if target == Participant::Human(author) {
            return Err(SetupError::SelfPlay(author));
        }

        Ok(Self {
            id,
            author,
            target,
            author_symbol,
            target_symbol: author_symbol.complement(),
            cells: [Symbol::Empty; 9],
            next_turn: Participant::Human(author),
            history: Vec::new(),
        })
    }

    /// Creates a board against the computer.
    pub fn solo(id: BoardId, player: UserId, symbol: Symbol) -> Result<Self, SetupError> {
        Self::new(id, player, Participant::Ai, symbol)
    }

    /// Returns the session identifier.
    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the player who created the game.
    pub fn author(&self) -> UserId {
        self.author
    }

    /// Returns the opponent seat.
    pub fn target(&self) -> Participant {
        self.target
    }

    /// Returns the author's mark.
    pub fn author_symbol(&self) -> Symbol {
        self.author_symbol
    }

    /// Returns the opponent's mark.
    pub fn target_symbol(&self) -> Symbol {
        self.target_symbol
    }

    /// Returns true when the opponent is the computer.
    pub fn is_solo(&self) -> bool {
        self.target.is_ai()
    }

    /// Returns the seat whose move is accepted next.
    pub fn next_turn(&self) -> Participant {
        self.next_turn
    }

    /// Cells in row-major order, offset 0 = cell 1.
    pub fn cells(&self) -> &[Symbol; 9] {
        &self.cells
    }

    /// Returns the content of `cell` (1..=9).
    pub fn cell(&self, cell: u8) -> Option<Symbol> {
        offset(cell).map(|i| self.cells[i])
    }

    /// Returns true if `cell` is on the board and unoccupied.
    pub fn is_cell_empty(&self, cell: u8) -> bool {
        self.cell(cell) == Some(Symbol::Empty)
    }

    /// Cells played this round, in order.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// Returns the mark of a seat, or `None` if it is not at this board.
    pub fn symbol_of(&self, participant: Participant) -> Option<Symbol> {
        if participant == Participant::Human(self.author) {
            Some(self.author_symbol)
        } else if participant == self.target {
            Some(self.target_symbol)
        } else {
            None
        }
    }

    /// Returns the seat facing `participant`.
    pub fn opponent_of(&self, participant: Participant) -> Participant {
        if participant == Participant::Human(self.author) {
            self.target
        } else {
            Participant::Human(self.author)
        }
    }

    /// Applies a human move.
    ///
    /// # Errors
    ///
    /// Checked in order: [`MoveError::NotAParticipant`],
    /// [`MoveError::GameAlreadyOver`], [`MoveError::NotYourTurn`],
    /// [`MoveError::InvalidCell`], [`MoveError::CellOccupied`]. No state
    /// changes on error.
    #[instrument(skip(self), fields(board_id = %self.id))]
    pub fn apply_move(&mut self, user: UserId, cell: u8) -> Result<(), MoveError> {
        let mover = Participant::Human(user);
        if self.symbol_of(mover).is_none() {
            warn!(%user, "Move from outsider");
            return Err(MoveError::NotAParticipant(user));
        }
        if self.check_terminal().is_terminal() {
            debug!("Move after game end");
            return Err(MoveError::GameAlreadyOver);
        }
        if self.next_turn != mover {
            debug!(%user, next = %self.next_turn, "Move out of turn");
            return Err(MoveError::NotYourTurn(mover));
        }
        if offset(cell).is_none() {
            return Err(MoveError::InvalidCell(cell));
        }
        if !self.is_cell_empty(cell) {
            debug!(cell, "Cell occupied");
            return Err(MoveError::CellOccupied(cell));
        }

        self.place(mover, cell);
        Ok(())
    }

    /// Lets `strategy` choose and play the computer's move. Returns the cell played.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameAlreadyOver`] on a terminal board and
    /// [`MoveError::NotYourTurn`] when the computer does not hold the move.
    ///
    /// # Panics
    ///
    /// Panics if the strategy picks a cell that is not free.
    #[instrument(skip(self, strategy), fields(board_id = %self.id))]
    pub fn apply_ai_move(&mut self, strategy: &mut dyn Strategy) -> Result<u8, MoveError> {
        if self.check_terminal().is_terminal() {
            return Err(MoveError::GameAlreadyOver);
        }
        if self.next_turn != Participant::Ai {
            return Err(MoveError::NotYourTurn(Participant::Ai));
        }

        let position = self.position_for(self.target_symbol);
        let cell = strategy.select_move(&position);
        assert!(
            self.is_cell_empty(cell),
            "strategy chose unavailable cell {cell}"
        );

        self.place(Participant::Ai, cell);
        Ok(cell)
    }

    /// Builds the AI view with `mover`'s marks as `+1`.
    pub fn position_for(&self, mover: Symbol) -> Position {
        let mut position = Position::empty();
        for (i, symbol) in self.cells.iter().enumerate() {
            let value = match *symbol {
                Symbol::Empty => FREE,
                s if s == mover => OWN,
                _ => OPPONENT,
            };
            position.set(i as u8 + 1, value);
        }
        position
    }

    /// Evaluates author win, target win, full board, in that order.
    #[instrument(skip(self), fields(board_id = %self.id))]
    pub fn check_terminal(&self) -> TerminalState {
        if rules::has_line(&self.cells, &self.author_symbol) {
            TerminalState::Won(Participant::Human(self.author))
        } else if rules::has_line(&self.cells, &self.target_symbol) {
            TerminalState::Won(self.target)
        } else if rules::is_full(&self.cells, &Symbol::Empty) {
            TerminalState::Draw
        } else {
            TerminalState::InProgress
        }
    }

    /// Clears the grid for a new round. The author moves first.
    #[instrument(skip(self), fields(board_id = %self.id))]
    pub fn reset(&mut self) {
        self.cells = [Symbol::Empty; 9];
        self.history.clear();
        self.next_turn = Participant::Human(self.author);
        debug!("Board reset");
    }

    fn place(&mut self, mover: Participant, cell: u8) {
        let Some(i) = offset(cell) else {
            return;
        };
        let symbol = if mover == self.target {
            self.target_symbol
        } else {
            self.author_symbol
        };
        self.cells[i] = symbol;
        self.history.push(cell);
        self.next_turn = self.opponent_of(mover);

        debug_assert!(marks_balanced(&self.cells), "mark counts drifted apart");
        debug!(cell, %mover, next = %self.next_turn, "Mark placed");
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let i = row * 3 + col;
                match self.cells[i].glyph() {
                    Some(glyph) => write!(f, "{glyph}")?,
                    None => write!(f, "{}", i + 1)?,
                }
                if col < 2 {
                    write!(f, "|")?;
                }
            }
            if row < 2 {
                writeln!(f)?;
                writeln!(f, "-+-+-")?;
            }
        }
        Ok(())
    }
}

fn offset(cell: u8) -> Option<usize> {
    (1..=9).contains(&cell).then(|| usize::from(cell - 1))
}

fn marks_balanced(cells: &[Symbol; 9]) -> bool {
    let crosses = cells.iter().filter(|s| **s == Symbol::Cross).count();
    let zeros = cells.iter().filter(|s| **s == Symbol::Zero).count();
    crosses.abs_diff(zeros) <= 1
}

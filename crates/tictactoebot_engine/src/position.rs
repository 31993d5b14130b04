//! Mover-relative view of a board used by the AI strategies.
//!
//! A position knows nothing about crosses or zeros: `+1` marks belong to the
//! side about to move, `-1` to its opponent and `0` is free. Cells are
//! addressed `1..=9` in row-major order.

use crate::rules;
use derive_more::{Display, Error};

/// Value of a cell held by the side to move.
pub const OWN: i8 = 1;
/// Value of a cell held by the opponent.
pub const OPPONENT: i8 = -1;
/// Value of a free cell.
pub const FREE: i8 = 0;

/// Nine ternary cells, keys `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    cells: [i8; 9],
}

/// A raw array held a value outside `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Cell {cell} holds {value}, expected -1, 0 or 1")]
pub struct PositionError {
    /// Offending cell (1..=9).
    pub cell: u8,
    /// Offending value.
    pub value: i8,
}

impl Position {
    /// Creates a position with every cell free.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the value at `cell` (1..=9), or `None` off the board.
    pub fn get(&self, cell: u8) -> Option<i8> {
        Self::offset(cell).map(|i| self.cells[i])
    }

    /// Writes `value` at `cell`. Off-board cells are ignored.
    pub(crate) fn set(&mut self, cell: u8, value: i8) {
        if let Some(i) = Self::offset(cell) {
            self.cells[i] = value;
        }
    }

    /// Free cells in ascending index order.
    pub fn free_cells(&self) -> Vec<u8> {
        (1..=9).filter(|&c| self.get(c) == Some(FREE)).collect()
    }

    /// Returns true when no cell is free.
    pub fn is_full(&self) -> bool {
        rules::is_full(&self.cells, &FREE)
    }

    /// Returns true when `value` owns a complete line.
    pub fn has_line(&self, value: i8) -> bool {
        rules::has_line(&self.cells, &value)
    }

    /// Raw cell values, offset 0 = cell 1.
    pub fn values(&self) -> &[i8; 9] {
        &self.cells
    }

    fn offset(cell: u8) -> Option<usize> {
        (1..=9).contains(&cell).then(|| usize::from(cell - 1))
    }
}

impl TryFrom<[i8; 9]> for Position {
    type Error = PositionError;

    fn try_from(cells: [i8; 9]) -> Result<Self, Self::Error> {
        if let Some((i, &value)) = cells
            .iter()
            .enumerate()
            .find(|(_, v)| !(OPPONENT..=OWN).contains(*v))
        {
            return Err(PositionError {
                cell: i as u8 + 1,
                value,
            });
        }
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_rejects_out_of_range() {
        let err = Position::try_from([0, 0, 0, 0, 2, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err, PositionError { cell: 5, value: 2 });
    }

    #[test]
    fn test_cells_are_one_based() {
        let pos = Position::try_from([-1, 1, 0, 0, 0, 0, 0, 0, -1]).unwrap();
        assert_eq!(pos.get(1), Some(OPPONENT));
        assert_eq!(pos.get(2), Some(OWN));
        assert_eq!(pos.get(0), None);
        assert_eq!(pos.get(10), None);
        assert_eq!(pos.free_cells(), vec![3, 4, 5, 6, 7, 8]);
    }
}

//! Draw detection.

/// Returns true when no cell equals `empty`.
///
/// A full grid with no line is a draw.
pub fn is_full<T: PartialEq>(cells: &[T; 9], empty: &T) -> bool {
    cells.iter().all(|c| c != empty)
}

#[cfg(test)]
mod tests {
    use super::super::win::has_line;
    use super::*;
    use crate::Symbol;

    #[test]
    fn test_empty_grid_not_full() {
        assert!(!is_full(&[Symbol::Empty; 9], &Symbol::Empty));
    }

    #[test]
    fn test_drawn_grid() {
        use Symbol::{Cross as X, Zero as O};
        // X O X / O X X / O X O
        let cells = [X, O, X, O, X, X, O, X, O];
        assert!(is_full(&cells, &Symbol::Empty));
        assert!(!has_line(&cells, &X));
        assert!(!has_line(&cells, &O));
    }
}

//! Exhaustive minimax opponent.
//!
//! The 3x3 tree has at most 9! leaves, so there is no pruning and no depth
//! discount. Ties at the root go to the lowest cell index.

use super::Strategy;
use crate::position::{FREE, OPPONENT, OWN};
use crate::Position;
use tracing::{debug, instrument};

/// Perfect-play opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimaxAi;

impl MinimaxAi {
    /// Creates a minimax opponent.
    pub fn new() -> Self {
        Self
    }

    /// Returns the first cell, in index order, with the highest minimax score
    /// for the `+1` side.
    ///
    /// # Panics
    ///
    /// Panics if `position` has no free cell or already holds a line.
    pub fn best_move(position: &Position) -> u8 {
        assert!(
            !position.is_full(),
            "minimax requested on a full board"
        );
        assert!(
            !position.has_line(OWN) && !position.has_line(OPPONENT),
            "minimax requested on a decided position"
        );

        let mut scratch = *position;
        let mut best: Option<(u8, i8)> = None;
        for cell in position.free_cells() {
            scratch.set(cell, OWN);
            let score = evaluate(&mut scratch, false);
            scratch.set(cell, FREE);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((cell, score));
            }
        }

        match best {
            Some((cell, score)) => {
                debug!(cell, score, "Minimax move");
                cell
            }
            None => unreachable!("a non-full position has a free cell"),
        }
    }
}

impl Strategy for MinimaxAi {
    #[instrument(skip(self, position))]
    fn select_move(&mut self, position: &Position) -> u8 {
        Self::best_move(position)
    }
}

/// Scores `position` for the `+1` side: `1` win, `-1` loss, `0` draw.
///
/// Each trial mark is cleared before the next candidate is tried.
fn evaluate(position: &mut Position, maximizing: bool) -> i8 {
    if position.has_line(OWN) {
        return 1;
    }
    if position.has_line(OPPONENT) {
        return -1;
    }
    if position.is_full() {
        return 0;
    }

    let (mark, mut best) = if maximizing {
        (OWN, i8::MIN)
    } else {
        (OPPONENT, i8::MAX)
    };
    for cell in 1..=9 {
        if position.get(cell) != Some(FREE) {
            continue;
        }
        position.set(cell, mark);
        let score = evaluate(position, !maximizing);
        position.set(cell, FREE);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(cells: [i8; 9]) -> Position {
        Position::try_from(cells).expect("valid fixture")
    }

    #[test]
    fn test_takes_center_against_split_corners() {
        let p = pos([-1, 1, 0, 0, 0, 0, 0, 0, -1]);
        assert_eq!(MinimaxAi::best_move(&p), 5);
    }

    #[test]
    fn test_blocks_and_forks() {
        let p = pos([-1, 1, 0, -1, 1, 0, 0, 0, -1]);
        assert_eq!(MinimaxAi::best_move(&p), 7);
    }

    #[test]
    fn test_blocks_immediate_threat() {
        // Opponent holds 1 and 2; only 3 avoids an immediate loss.
        let p = pos([-1, -1, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(MinimaxAi::best_move(&p), 3);
    }

    #[test]
    fn test_never_leaves_a_winning_reply() {
        let fixtures = [
            [-1, -1, 0, 0, 1, 0, 0, 0, 0],
            [0, 0, -1, 0, -1, 0, 0, 0, 1],
            [1, 0, 0, -1, -1, 0, 0, 0, 0],
            [-1, 0, 0, 0, 1, 0, 0, 0, -1],
        ];
        for cells in fixtures {
            let p = pos(cells);
            let mut after = p;
            after.set(MinimaxAi::best_move(&p), OWN);
            for reply in after.free_cells() {
                let mut next = after;
                next.set(reply, OPPONENT);
                assert!(
                    !next.has_line(OPPONENT),
                    "{cells:?}: reply {reply} wins for the opponent"
                );
            }
        }
    }

    #[test]
    fn test_input_untouched() {
        let p = pos([-1, 1, 0, 0, 0, 0, 0, 0, -1]);
        let before = p;
        let _ = MinimaxAi::new().select_move(&p);
        assert_eq!(p, before);
    }

    #[test]
    fn test_last_free_cell() {
        let p = pos([1, -1, 1, -1, -1, 1, 0, 1, -1]);
        assert_eq!(MinimaxAi::best_move(&p), 7);
    }

    #[test]
    #[should_panic(expected = "decided position")]
    fn test_decided_position_panics() {
        MinimaxAi::best_move(&pos([1, 1, 1, -1, -1, 0, 0, 0, 0]));
    }
}

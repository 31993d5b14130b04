//! Uniform random opponent.

use super::Strategy;
use crate::Position;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// Plays a uniformly chosen free cell. No look-ahead.
#[derive(Debug, Clone)]
pub struct RandomAi<R> {
    rng: R,
}

impl<R: Rng> RandomAi<R> {
    /// Creates a random opponent drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Strategy for RandomAi<R> {
    #[instrument(skip(self, position))]
    fn select_move(&mut self, position: &Position) -> u8 {
        let free = position.free_cells();
        let Some(&cell) = free.choose(&mut self.rng) else {
            panic!("random move requested on a full board");
        };
        debug!(cell, free = free.len(), "Random move");
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_only_free_cells_chosen() {
        let pos = Position::try_from([1, -1, 1, -1, 0, 1, -1, 0, -1]).unwrap();
        let mut ai = RandomAi::new(StdRng::seed_from_u64(3));
        for _ in 0..200 {
            let cell = ai.select_move(&pos);
            assert!(cell == 5 || cell == 8, "picked occupied cell {cell}");
        }
    }

    #[test]
    fn test_every_free_cell_roughly_uniform() {
        let pos = Position::try_from([1, 0, -1, 0, 1, -1, 0, -1, 1]).unwrap();
        let mut ai = RandomAi::new(StdRng::seed_from_u64(2024));
        let mut counts = [0u32; 10];
        let trials = 9_000;
        for _ in 0..trials {
            counts[usize::from(ai.select_move(&pos))] += 1;
        }

        for cell in [2, 4, 7] {
            let seen = counts[cell];
            // Expected 3000 each; 10% tolerance is far outside sampling noise.
            assert!((2_700..=3_300).contains(&seen), "cell {cell} drawn {seen} times");
        }
        let total: u32 = [2, 4, 7].iter().map(|&c| counts[c]).sum();
        assert_eq!(total, trials);
    }

    #[test]
    #[should_panic(expected = "full board")]
    fn test_full_board_panics() {
        let pos = Position::try_from([1, -1, 1, -1, 1, -1, -1, 1, -1]).unwrap();
        RandomAi::new(StdRng::seed_from_u64(0)).select_move(&pos);
    }
}

//! Computer opponents.
//!
//! Both strategies read a mover-relative [`Position`] and return the cell
//! (1..=9) to play. They never see the board itself and keep nothing
//! between calls beyond their own random source.

mod minimax;
mod random;

pub use minimax::MinimaxAi;
pub use random::RandomAi;

use crate::{Difficulty, Position};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

/// Move selection for the computer seat.
///
/// Implementations panic when asked to move on a position with no free cell:
/// that is a caller bug, not a recoverable condition.
pub trait Strategy {
    /// Returns the cell (1..=9) to play for the `+1` side of `position`.
    fn select_move(&mut self, position: &Position) -> u8;
}

/// Hands out a strategy for a difficulty level.
///
/// This is the seam through which tests substitute scripted or seeded
/// opponents.
pub trait StrategyProvider: Send + Sync {
    /// Returns a strategy answering for `difficulty`.
    fn strategy(&self, difficulty: Difficulty) -> Box<dyn Strategy + Send>;
}

/// `Easy` -> [`RandomAi`], `Hard` -> [`MinimaxAi`].
///
/// Each random opponent gets its own generator, seeded from a master
/// generator so a seeded provider replays identically.
#[derive(Debug)]
pub struct StandardProvider {
    master: Mutex<StdRng>,
}

impl StandardProvider {
    /// Creates a provider seeded from OS entropy.
    #[instrument]
    pub fn new() -> Self {
        Self {
            master: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic provider.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        debug!(seed, "Seeding strategy provider");
        Self {
            master: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StandardProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyProvider for StandardProvider {
    fn strategy(&self, difficulty: Difficulty) -> Box<dyn Strategy + Send> {
        match difficulty {
            Difficulty::Easy => {
                let seed = self
                    .master
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .next_u64();
                Box::new(RandomAi::new(StdRng::seed_from_u64(seed)))
            }
            Difficulty::Hard => Box::new(MinimaxAi::new()),
        }
    }
}

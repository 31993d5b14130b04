//! Player profiles: language, difficulty and cumulative score.
//!
//! The registry talks to profiles only through [`ProfileStore`], so the
//! backing storage can be swapped without touching session logic.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tictactoebot_engine::{Difficulty, Language, UserId};
use tracing::{debug, info, instrument};

use crate::db::DbError;

/// Cumulative round counters of one player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters, new, Display,
)]
#[display("won {player}, lost to bot {bot}, lost to players {enemy}, drawn {draw}")]
pub struct Score {
    player: u32,
    bot: u32,
    enemy: u32,
    draw: u32,
}

impl Score {
    /// Bumps the counter matching `outcome`.
    pub fn apply(&mut self, outcome: ScoreOutcome) {
        match outcome {
            ScoreOutcome::Win => self.player += 1,
            ScoreOutcome::LossToBot => self.bot += 1,
            ScoreOutcome::LossToPlayer => self.enemy += 1,
            ScoreOutcome::Draw => self.draw += 1,
        }
    }

    /// Rounds played in total.
    pub fn total(&self) -> u32 {
        self.player + self.bot + self.enemy + self.draw
    }
}

/// What a finished round means for one human participant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScoreOutcome {
    /// Round won.
    Win,
    /// Round lost to the computer.
    LossToBot,
    /// Round lost to a human opponent.
    LossToPlayer,
    /// Round drawn.
    Draw,
}

/// Everything the registry needs to know about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct UserProfile {
    user: UserId,
    language: Language,
    difficulty: Difficulty,
    score: Score,
}

impl UserProfile {
    pub(crate) fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub(crate) fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }
}

/// Settings given to a player on first contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, new)]
pub struct ProfileDefaults {
    /// Initial interface language.
    pub language: Language,
    /// Initial computer difficulty.
    pub difficulty: Difficulty,
}

/// Profile store failures.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ProfileError {
    /// Storage backend failed.
    #[display("{_0}")]
    #[from]
    Db(DbError),
    /// No profile exists for the user.
    #[display("No profile for user {_0}")]
    UnknownUser(#[error(not(source))] UserId),
    /// Store cannot serve requests right now.
    #[display("Profile store unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
}

/// Durable per-user settings and score counters.
pub trait ProfileStore: Send + Sync + Debug {
    /// Reads a profile, or `None` if the user was never seen.
    fn get_profile(&self, user: UserId) -> Result<Option<UserProfile>, ProfileError>;

    /// Reads a profile, creating it with `defaults` on first contact.
    fn get_or_create(
        &self,
        user: UserId,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, ProfileError>;

    /// Stores a new difficulty.
    fn set_difficulty(&self, user: UserId, difficulty: Difficulty) -> Result<(), ProfileError>;

    /// Stores a new interface language.
    fn set_language(&self, user: UserId, language: Language) -> Result<(), ProfileError>;

    /// Bumps one counter of one user.
    fn increment_score(&self, user: UserId, outcome: ScoreOutcome) -> Result<(), ProfileError>;

    /// Records every outcome of one finished round.
    ///
    /// The default applies them one by one; backends with transactions
    /// override this so a round is recorded whole or not at all.
    fn record_round(&self, outcomes: &[(UserId, ScoreOutcome)]) -> Result<(), ProfileError> {
        for &(user, outcome) in outcomes {
            self.increment_score(user, outcome)?;
        }
        Ok(())
    }
}

/// Volatile store for tests and console play.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<UserId, UserProfile>>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating MemoryProfileStore");
        Self::default()
    }

    fn with_profile<T>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut UserProfile) -> T,
    ) -> Result<T, ProfileError> {
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        profiles
            .get_mut(&user)
            .map(f)
            .ok_or(ProfileError::UnknownUser(user))
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get_profile(&self, user: UserId) -> Result<Option<UserProfile>, ProfileError> {
        let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(&user).cloned())
    }

    #[instrument(skip(self, defaults))]
    fn get_or_create(
        &self,
        user: UserId,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, ProfileError> {
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        let profile = profiles.entry(user).or_insert_with(|| {
            debug!("Creating profile");
            UserProfile::new(user, defaults.language, defaults.difficulty, Score::default())
        });
        Ok(profile.clone())
    }

    fn set_difficulty(&self, user: UserId, difficulty: Difficulty) -> Result<(), ProfileError> {
        self.with_profile(user, |p| p.set_difficulty(difficulty))
    }

    fn set_language(&self, user: UserId, language: Language) -> Result<(), ProfileError> {
        self.with_profile(user, |p| p.set_language(language))
    }

    fn increment_score(&self, user: UserId, outcome: ScoreOutcome) -> Result<(), ProfileError> {
        self.with_profile(user, |p| p.score_mut().apply(outcome))
    }

    // Validates every user first so a round never lands half-recorded.
    fn record_round(&self, outcomes: &[(UserId, ScoreOutcome)]) -> Result<(), ProfileError> {
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&(missing, _)) = outcomes.iter().find(|(u, _)| !profiles.contains_key(u)) {
            return Err(ProfileError::UnknownUser(missing));
        }
        for &(user, outcome) in outcomes {
            if let Some(profile) = profiles.get_mut(&user) {
                profile.score_mut().apply(outcome);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId::new(5);

    #[test]
    fn test_score_apply() {
        let mut score = Score::default();
        score.apply(ScoreOutcome::Win);
        score.apply(ScoreOutcome::Win);
        score.apply(ScoreOutcome::LossToPlayer);
        assert_eq!(score, Score::new(2, 0, 1, 0));
        assert_eq!(score.total(), 3);
    }

    #[test]
    fn test_outcome_strings() {
        assert_eq!(ScoreOutcome::LossToBot.to_string(), "loss_to_bot");
    }

    #[test]
    fn test_memory_store_lazily_creates() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.get_profile(ALICE).unwrap(), None);

        let defaults = ProfileDefaults::new(Language::Russian, Difficulty::Hard);
        let profile = store.get_or_create(ALICE, defaults).unwrap();
        assert_eq!(*profile.language(), Language::Russian);
        assert_eq!(*profile.difficulty(), Difficulty::Hard);

        // Second contact keeps stored settings.
        store.set_difficulty(ALICE, Difficulty::Easy).unwrap();
        let again = store.get_or_create(ALICE, defaults).unwrap();
        assert_eq!(*again.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_memory_store_unknown_user() {
        let store = MemoryProfileStore::new();
        let err = store.increment_score(ALICE, ScoreOutcome::Draw).unwrap_err();
        assert!(matches!(err, ProfileError::UnknownUser(u) if u == ALICE));
    }

    #[test]
    fn test_record_round_is_all_or_nothing() {
        let store = MemoryProfileStore::new();
        store.get_or_create(ALICE, ProfileDefaults::default()).unwrap();

        let round = [
            (ALICE, ScoreOutcome::Win),
            (UserId::new(6), ScoreOutcome::LossToPlayer),
        ];
        assert!(store.record_round(&round).is_err());
        let profile = store.get_profile(ALICE).unwrap().unwrap();
        assert_eq!(*profile.score(), Score::default());
    }
}

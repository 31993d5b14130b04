//! SQLite-backed profile store.

use tictactoebot_engine::{Difficulty, Language, UserId};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, ProfileRepository, User};
use crate::{ProfileDefaults, ProfileError, ProfileStore, ScoreOutcome, UserProfile};

/// Profile store persisting to SQLite through [`ProfileRepository`].
///
/// Adds get-or-create semantics and maps rows to [`UserProfile`].
#[derive(Debug, Clone)]
pub struct SqliteProfileStore {
    repository: ProfileRepository,
}

impl SqliteProfileStore {
    /// Wraps an opened repository.
    #[instrument(skip(repository))]
    pub fn new(repository: ProfileRepository) -> Self {
        info!(path = repository.db_path(), "Creating SqliteProfileStore");
        Self { repository }
    }

    /// Opens (and migrates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened.
    pub fn open(path: impl Into<String>) -> Result<Self, DbError> {
        Ok(Self::new(ProfileRepository::new(path.into())?))
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &ProfileRepository {
        &self.repository
    }

    #[instrument(skip(self, user), fields(user_id = user.id()))]
    fn to_profile(&self, user: &User) -> Result<UserProfile, ProfileError> {
        let score = self.repository.get_score(*user.id())?.to_score();
        Ok(UserProfile::new(
            UserId::new(*user.chat_id()),
            user.parse_language()?,
            user.parse_difficulty()?,
            score,
        ))
    }

    fn expect_one(user: UserId, rows: usize) -> Result<(), ProfileError> {
        if rows == 0 {
            warn!(%user, "Update for unknown user");
            return Err(ProfileError::UnknownUser(user));
        }
        Ok(())
    }
}

impl ProfileStore for SqliteProfileStore {
    #[instrument(skip(self))]
    fn get_profile(&self, user: UserId) -> Result<Option<UserProfile>, ProfileError> {
        self.repository
            .get_user_by_chat_id(user.get())?
            .map(|row| self.to_profile(&row))
            .transpose()
    }

    #[instrument(skip(self, defaults))]
    fn get_or_create(
        &self,
        user: UserId,
        defaults: ProfileDefaults,
    ) -> Result<UserProfile, ProfileError> {
        if let Some(row) = self.repository.get_user_by_chat_id(user.get())? {
            debug!(user_id = row.id(), "Existing user found");
            return self.to_profile(&row);
        }

        // Another caller may create the row first; the repository then
        // hands back theirs.
        info!("Creating new user");
        let row = self.repository.get_or_create_user(
            user.get(),
            defaults.language.as_ref(),
            defaults.difficulty.as_ref(),
        )?;
        self.to_profile(&row)
    }

    #[instrument(skip(self))]
    fn set_difficulty(&self, user: UserId, difficulty: Difficulty) -> Result<(), ProfileError> {
        let rows = self
            .repository
            .update_difficulty(user.get(), difficulty.as_ref())?;
        Self::expect_one(user, rows)
    }

    #[instrument(skip(self))]
    fn set_language(&self, user: UserId, language: Language) -> Result<(), ProfileError> {
        let rows = self
            .repository
            .update_language(user.get(), language.as_ref())?;
        Self::expect_one(user, rows)
    }

    #[instrument(skip(self))]
    fn increment_score(&self, user: UserId, outcome: ScoreOutcome) -> Result<(), ProfileError> {
        self.record_round(&[(user, outcome)])
    }

    #[instrument(skip(self, outcomes), fields(count = outcomes.len()))]
    fn record_round(&self, outcomes: &[(UserId, ScoreOutcome)]) -> Result<(), ProfileError> {
        let raw: Vec<(i64, ScoreOutcome)> = outcomes
            .iter()
            .map(|&(user, outcome)| (user.get(), outcome))
            .collect();
        self.repository.increment_scores(&raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_unknown_user_update_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteProfileStore::open(file.path().to_string_lossy()).unwrap();
        let err = store
            .set_language(UserId::new(3), Language::Hindi)
            .unwrap_err();
        assert!(matches!(err, ProfileError::UnknownUser(_)));
    }
}

//! Database repository for user profiles and score counters.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::ScoreOutcome;
use crate::db::{DbError, DbErrorKind, NewScore, NewUser, ScoreRow, User, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits for another writer before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Database repository for profile operations.
///
/// Opens a fresh connection per call. Writers take the lock up front
/// (`BEGIN IMMEDIATE`) and wait up to [`BUSY_TIMEOUT_MS`] for it, so
/// concurrent commits from different boards queue instead of failing.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db_path: String,
}

impl ProfileRepository {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening ProfileRepository");
        let repository = Self { db_path };
        let mut conn = repository.connection()?;
        // Readers no longer block the writer; the mode persists in the file.
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        info!(count = applied.len(), "Migrations applied");
        Ok(repository)
    }

    /// Path the repository connects to.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Returns the user for `chat_id`, creating it and a zeroed score row
    /// on first contact. Existing settings are never overwritten.
    ///
    /// Safe to call concurrently for the same chat id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_or_create_user(
        &self,
        chat_id: i64,
        language: &str,
        difficulty: &str,
    ) -> Result<User, DbError> {
        let mut conn = self.connection()?;

        let (user, created) = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let inserted = diesel::insert_into(schema::users::table)
                .values(&NewUser::new(
                    chat_id,
                    language.to_string(),
                    difficulty.to_string(),
                ))
                .on_conflict_do_nothing()
                .execute(conn)?;
            let user = schema::users::table
                .filter(schema::users::chat_id.eq(chat_id))
                .select(User::as_select())
                .first(conn)?;
            diesel::insert_into(schema::scores::table)
                .values(&NewScore::new(*user.id()))
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok((user, inserted == 1))
        })?;

        if created {
            info!(user_id = user.id(), chat_id, "User created");
        } else {
            debug!(user_id = user.id(), "User already present");
        }
        Ok(user)
    }

    /// Gets a user by chat id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::chat_id.eq(chat_id))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = user.is_some(), "User lookup");
        Ok(user)
    }

    /// Lists all users, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let mut conn = self.connection()?;

        let users = schema::users::table
            .order(schema::users::created_at.asc())
            .select(User::as_select())
            .load(&mut conn)?;

        info!(count = users.len(), "Users loaded");
        Ok(users)
    }

    /// Stores a new difficulty. Returns the number of rows touched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn update_difficulty(&self, chat_id: i64, difficulty: &str) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let rows = diesel::update(schema::users::table.filter(schema::users::chat_id.eq(chat_id)))
            .set((
                schema::users::difficulty.eq(difficulty),
                schema::users::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;
        debug!(rows, "Difficulty updated");
        Ok(rows)
    }

    /// Stores a new language code. Returns the number of rows touched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn update_language(&self, chat_id: i64, language: &str) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let rows = diesel::update(schema::users::table.filter(schema::users::chat_id.eq(chat_id)))
            .set((
                schema::users::language.eq(language),
                schema::users::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;
        debug!(rows, "Language updated");
        Ok(rows)
    }

    /// Gets the score row of a user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the row is missing or a database error occurs.
    #[instrument(skip(self))]
    pub fn get_score(&self, user_id: i32) -> Result<ScoreRow, DbError> {
        let mut conn = self.connection()?;
        let row = schema::scores::table
            .filter(schema::scores::user_id.eq(user_id))
            .select(ScoreRow::as_select())
            .first(&mut conn)?;
        Ok(row)
    }

    /// Applies every `(chat_id, outcome)` pair in one transaction.
    ///
    /// Either all counters move or none do.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a chat id is unknown or a database error occurs.
    #[instrument(skip(self, outcomes), fields(count = outcomes.len()))]
    pub fn increment_scores(&self, outcomes: &[(i64, ScoreOutcome)]) -> Result<(), DbError> {
        use schema::scores::dsl as s;

        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            for &(chat_id, outcome) in outcomes {
                let user_id: i32 = schema::users::table
                    .filter(schema::users::chat_id.eq(chat_id))
                    .select(schema::users::id)
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| DbError::new(format!("No user with chat id {}", chat_id)))?;

                let target = s::scores.filter(s::user_id.eq(user_id));
                let rows = match outcome {
                    ScoreOutcome::Win => diesel::update(target)
                        .set(s::player.eq(s::player + 1))
                        .execute(conn)?,
                    ScoreOutcome::LossToBot => diesel::update(target)
                        .set(s::bot.eq(s::bot + 1))
                        .execute(conn)?,
                    ScoreOutcome::LossToPlayer => diesel::update(target)
                        .set(s::enemy.eq(s::enemy + 1))
                        .execute(conn)?,
                    ScoreOutcome::Draw => diesel::update(target)
                        .set(s::draw.eq(s::draw + 1))
                        .execute(conn)?,
                };
                if rows != 1 {
                    return Err(DbError::new(format!(
                        "Score row missing for chat id {}",
                        chat_id
                    )));
                }
                debug!(chat_id, %outcome, "Score incremented");
            }
            Ok(())
        })?;

        info!("Scores committed");
        Ok(())
    }
}

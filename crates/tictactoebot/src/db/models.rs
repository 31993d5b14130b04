//! Database rows for profiles and scores.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tictactoebot_engine::{Difficulty, Language};
use tracing::instrument;

use crate::Score;
use crate::db::{DbError, schema};

/// Profile row, keyed by the transport's chat identity.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    chat_id: i64,
    language: String,
    difficulty: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl User {
    /// Parses the stored language code.
    #[instrument(skip(self), fields(language = %self.language))]
    pub fn parse_language(&self) -> Result<Language, DbError> {
        Language::from_str(&self.language)
            .map_err(|_| DbError::new(format!("Invalid language: '{}'", self.language)))
    }

    /// Parses the stored difficulty.
    #[instrument(skip(self), fields(difficulty = %self.difficulty))]
    pub fn parse_difficulty(&self) -> Result<Difficulty, DbError> {
        Difficulty::from_str(&self.difficulty)
            .map_err(|_| DbError::new(format!("Invalid difficulty: '{}'", self.difficulty)))
    }
}

/// Insertable profile.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    chat_id: i64,
    language: String,
    difficulty: String,
}

/// Score counters row; one per user.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
#[diesel(belongs_to(User))]
pub struct ScoreRow {
    id: i32,
    user_id: i32,
    player: i32,
    bot: i32,
    enemy: i32,
    draw: i32,
}

impl ScoreRow {
    /// Converts the row into domain counters. Negative values read as zero.
    pub fn to_score(&self) -> Score {
        let count = |v: i32| u32::try_from(v).unwrap_or(0);
        Score::new(
            count(self.player),
            count(self.bot),
            count(self.enemy),
            count(self.draw),
        )
    }
}

/// Insertable zeroed score row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    user_id: i32,
}

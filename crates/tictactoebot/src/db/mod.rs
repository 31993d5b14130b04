//! SQLite persistence for player profiles and scores.

mod error;
mod models;
mod repository;
mod schema;

pub use error::{DbError, DbErrorKind};
pub use models::{NewScore, NewUser, ScoreRow, User};
pub use repository::ProfileRepository;

//! Errors raised by the profile database.

use derive_more::{Display, Error};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use tracing::instrument;

/// Broad class of a database failure, kept so callers can branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DbErrorKind {
    /// Opening the database file failed.
    Connection,
    /// Applying embedded migrations failed.
    Migration,
    /// Another connection held the lock past the busy timeout.
    Busy,
    /// A unique constraint rejected the write.
    UniqueViolation,
    /// A query expected a row and found none.
    NotFound,
    /// Stored data could not be interpreted.
    Data,
    /// Any other query failure.
    Query,
}

/// Database error with its kind and the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure class.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a data error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Data, message)
    }

    /// Creates an error of `kind` at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns true if retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        self.kind == DbErrorKind::Busy
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error as E;

        let kind = match &err {
            E::NotFound => DbErrorKind::NotFound,
            E::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::UniqueViolation
            }
            // SQLite reports SQLITE_BUSY and SQLITE_LOCKED as plain messages.
            E::DatabaseError(_, info) if info.message().contains("locked") => DbErrorKind::Busy,
            E::DeserializationError(_) => DbErrorKind::Data,
            _ => DbErrorKind::Query,
        };
        Self::with_kind(kind, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::with_kind(DbErrorKind::Connection, err.to_string())
    }
}

// Migration harness errors arrive boxed.
impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::with_kind(DbErrorKind::Migration, err.to_string())
    }
}

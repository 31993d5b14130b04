//! Tic-tac-toe sessions: registry, player profiles and persistence.
//!
//! # Architecture
//!
//! - **Session**: [`SessionRegistry`] owns every live board and locks each one
//!   for a full move cycle
//! - **Profiles**: [`ProfileStore`] with in-memory and SQLite backends
//! - **Config**: [`BotConfig`] from TOML plus environment overrides
//! - **Console**: a line-based transport used by the binary
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tictactoebot::{MemoryProfileStore, SessionRegistry};
//! use tictactoebot_engine::{Symbol, UserId};
//!
//! let registry = SessionRegistry::new(Arc::new(MemoryProfileStore::new()));
//! let player = UserId::new(7);
//! let board = registry.create_solo_session(player, Symbol::Cross).unwrap();
//! let report = registry.play(board, player, 5).unwrap();
//! assert!(report.ai_move().is_some());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod console;
pub mod db;
mod error;
mod profile;
mod profile_service;
mod reaper;
mod session;

pub use config::{
    BotConfig, ConfigError, ENV_DATABASE_PATH, ENV_LOG_LEVEL, ENV_LOG_LEVEL_FALLBACK, ENV_RNG_SEED,
};
pub use db::{DbError, DbErrorKind, ProfileRepository};
pub use error::SessionError;
pub use profile::{
    MemoryProfileStore, ProfileDefaults, ProfileError, ProfileStore, Score, ScoreOutcome,
    UserProfile,
};
pub use profile_service::SqliteProfileStore;
pub use session::{PlayReport, SessionRegistry};

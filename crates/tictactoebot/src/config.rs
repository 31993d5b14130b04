//! Process configuration: a TOML file overridden by environment variables.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tictactoebot_engine::{Difficulty, Language};
use tracing::{debug, info, instrument};

use crate::ProfileDefaults;

/// Overrides `database_path`.
pub const ENV_DATABASE_PATH: &str = "TTT_DATABASE_PATH";
/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "TTT_LOG_LEVEL";
/// Fallback for `log_level`.
pub const ENV_LOG_LEVEL_FALLBACK: &str = "LOG_LEVEL";
/// Overrides `rng_seed`.
pub const ENV_RNG_SEED: &str = "TTT_RNG_SEED";

/// Runtime settings of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct BotConfig {
    /// SQLite file holding profiles.
    database_path: String,

    /// Language of new players.
    default_language: Language,

    /// Difficulty of new players.
    default_difficulty: Difficulty,

    /// Seconds a board may sit untouched before the reaper retires it.
    idle_timeout_secs: u64,

    /// Seconds between reaper passes.
    reaper_interval_secs: u64,

    /// Fixed seed for the easy opponent; entropy when unset.
    rng_seed: Option<u64>,

    /// Filter used when `RUST_LOG` is unset.
    log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            database_path: "gamedata.db".to_string(),
            default_language: Language::default(),
            default_difficulty: Difficulty::default(),
            idle_timeout_secs: 3600,
            reaper_interval_secs: 60,
            rng_seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(database = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), then applies the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unreadable file or a malformed override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                debug!(path = %path.display(), "Config file missing, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `var`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `TTT_RNG_SEED` is not an unsigned integer.
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(path) = var(ENV_DATABASE_PATH) {
            debug!(%path, "Database path overridden");
            self.database_path = path;
        }
        if let Some(level) = var(ENV_LOG_LEVEL).or_else(|| var(ENV_LOG_LEVEL_FALLBACK)) {
            self.log_level = level;
        }
        if let Some(seed) = var(ENV_RNG_SEED) {
            let seed = u64::from_str(seed.trim()).map_err(|e| {
                ConfigError::new(format!("Invalid {}='{}': {}", ENV_RNG_SEED, seed, e))
            })?;
            self.rng_seed = Some(seed);
        }
        Ok(self)
    }

    /// Idle timeout as a duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Reaper period as a duration. Never zero.
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs.max(1))
    }

    /// Settings for first-contact profiles.
    pub fn profile_defaults(&self) -> ProfileDefaults {
        ProfileDefaults::new(self.default_language, self.default_difficulty)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

//! Core domain types for the tic-tac-toe engine.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Glyph used for the cross mark.
pub const CROSS_GLYPH: &str = "❌";
/// Glyph used for the zero mark.
pub const ZERO_GLYPH: &str = "⭕";

/// Content of a single cell.
///
/// `Empty` is the only value a move may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    /// Cross mark.
    Cross,
    /// Zero (nought) mark.
    Zero,
    /// Unoccupied cell.
    #[default]
    Empty,
}

impl Symbol {
    /// Returns the complementary mark (`Cross` <-> `Zero`). `Empty` stays `Empty`.
    pub fn complement(self) -> Self {
        match self {
            Symbol::Cross => Symbol::Zero,
            Symbol::Zero => Symbol::Cross,
            Symbol::Empty => Symbol::Empty,
        }
    }

    /// Returns true for `Cross` and `Zero`.
    pub fn is_mark(self) -> bool {
        self != Symbol::Empty
    }

    /// Returns the glyph shown to players, or `None` for an empty cell.
    pub fn glyph(self) -> Option<&'static str> {
        match self {
            Symbol::Cross => Some(CROSS_GLYPH),
            Symbol::Zero => Some(ZERO_GLYPH),
            Symbol::Empty => None,
        }
    }
}

/// Selects which strategy answers for the computer opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random free cell.
    #[default]
    Easy,
    /// Exhaustive minimax.
    Hard,
}

/// Interface language of a player. Routing only; the engine never branches on it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Language {
    /// English.
    #[default]
    #[serde(rename = "en")]
    #[strum(serialize = "en")]
    English,
    /// Spanish.
    #[serde(rename = "es")]
    #[strum(serialize = "es")]
    Spanish,
    /// Hindi.
    #[serde(rename = "hi")]
    #[strum(serialize = "hi")]
    Hindi,
    /// Indonesian.
    #[serde(rename = "id")]
    #[strum(serialize = "id")]
    Indonesian,
    /// Portuguese.
    #[serde(rename = "pt")]
    #[strum(serialize = "pt")]
    Portuguese,
    /// Russian.
    #[serde(rename = "ru")]
    #[strum(serialize = "ru")]
    Russian,
    /// Arabic.
    #[serde(rename = "ar")]
    #[strum(serialize = "ar")]
    Arabic,
}

/// Identity of a human player as delivered by the transport.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw identity.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identity.
    pub fn get(self) -> i64 {
        self.0
    }
}

/// A seat at the board: a human player or the computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Participant {
    /// Human player.
    #[display("user {_0}")]
    Human(UserId),
    /// Computer opponent.
    #[display("bot")]
    Ai,
}

impl Participant {
    /// Maps a raw transport identity to a participant; `0` is the computer.
    pub fn from_raw(raw: i64) -> Self {
        if raw == 0 {
            Participant::Ai
        } else {
            Participant::Human(UserId(raw))
        }
    }

    /// Returns the user identity for human participants.
    pub fn user_id(self) -> Option<UserId> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Ai => None,
        }
    }

    /// Returns true for the computer seat.
    pub fn is_ai(self) -> bool {
        matches!(self, Participant::Ai)
    }
}

impl From<UserId> for Participant {
    fn from(id: UserId) -> Self {
        Participant::Human(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_complement() {
        assert_eq!(Symbol::Cross.complement(), Symbol::Zero);
        assert_eq!(Symbol::Zero.complement(), Symbol::Cross);
        assert_eq!(Symbol::Empty.complement(), Symbol::Empty);
    }

    #[test]
    fn test_difficulty_strings() {
        assert_eq!(Difficulty::Hard.as_ref(), "hard");
        assert_eq!(Difficulty::from_str("EASY").unwrap(), Difficulty::Easy);
        assert!(Difficulty::from_str("nightmare").is_err());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Russian.to_string(), "ru");
        assert_eq!(Language::from_str("ar").unwrap(), Language::Arabic);
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_raw_zero_is_bot() {
        assert_eq!(Participant::from_raw(0), Participant::Ai);
        assert_eq!(
            Participant::from_raw(42),
            Participant::Human(UserId::new(42))
        );
        assert_eq!(Participant::from_raw(42).user_id(), Some(UserId::new(42)));
    }
}

//! Command-line interface for tictactoebot.

use clap::{Parser, Subcommand, ValueEnum};
use tictactoebot_engine::{Difficulty, Language, Symbol};

/// Tic-tac-toe against the computer or a friend, from the terminal
#[derive(Parser, Debug)]
#[command(name = "tictactoebot")]
#[command(about = "Tic-tac-toe sessions with persistent scores", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "tictactoebot.toml")]
    pub config: std::path::PathBuf,

    /// Keep profiles in memory instead of the database
    #[arg(long, global = true)]
    pub memory: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Mark chosen on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SymbolArg {
    /// Cross
    Cross,
    /// Zero
    Zero,
}

impl From<SymbolArg> for Symbol {
    fn from(arg: SymbolArg) -> Self {
        match arg {
            SymbolArg::Cross => Symbol::Cross,
            SymbolArg::Zero => Symbol::Zero,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play against the computer
    Play {
        /// Your user id
        #[arg(short, long, default_value = "1")]
        user: i64,

        /// Your mark
        #[arg(short, long, value_enum, default_value = "cross")]
        symbol: SymbolArg,

        /// Store this difficulty before playing (easy or hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
    },

    /// Two players sharing one terminal
    Duel {
        /// User id of the player who moves first
        #[arg(long, default_value = "1")]
        author: i64,

        /// User id of the second player
        #[arg(long, default_value = "2")]
        target: i64,

        /// Mark of the first player
        #[arg(short, long, value_enum, default_value = "cross")]
        symbol: SymbolArg,
    },

    /// Show a player's profile and score
    Profile {
        /// User id
        user: i64,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a player's difficulty
    Difficulty {
        /// User id
        user: i64,

        /// easy or hard
        level: Difficulty,
    },

    /// Set a player's interface language
    Language {
        /// User id
        user: i64,

        /// One of en, es, hi, id, pt, ru, ar
        code: Language,
    },
}

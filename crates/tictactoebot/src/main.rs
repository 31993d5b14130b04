//! tictactoebot - console front end for the session registry.

#![warn(missing_docs)]

mod cli;

use std::io;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use tictactoebot::{
    BotConfig, MemoryProfileStore, ProfileStore, SessionRegistry, SqliteProfileStore, console,
};
use tictactoebot_engine::{BoardId, Participant, StandardProvider, UserId};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load(Some(cli.config.as_path()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    let registry = Arc::new(build_registry(&config, cli.memory)?);

    match cli.command {
        Command::Play {
            user,
            symbol,
            difficulty,
        } => {
            let user = human(user)?;
            if let Some(difficulty) = difficulty {
                registry.set_difficulty(user, difficulty)?;
            }
            let board = registry.create_solo_session(user, symbol.into())?;
            run_console(registry, &config, board).await
        }
        Command::Duel {
            author,
            target,
            symbol,
        } => {
            let board =
                registry.create_multiplayer_session(human(author)?, human(target)?, symbol.into())?;
            run_console(registry, &config, board).await
        }
        Command::Profile { user, json } => {
            let profile = registry.profile(human(user)?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!(
                    "user {}: language {}, difficulty {}, {}",
                    profile.user(),
                    profile.language(),
                    profile.difficulty(),
                    profile.score()
                );
            }
            Ok(())
        }
        Command::Difficulty { user, level } => {
            registry.set_difficulty(human(user)?, level)?;
            println!("Difficulty set to {level}");
            Ok(())
        }
        Command::Language { user, code } => {
            registry.set_language(human(user)?, code)?;
            println!("Language set to {code}");
            Ok(())
        }
    }
}

/// Rejects the raw id reserved for the computer.
fn human(raw: i64) -> Result<UserId> {
    match Participant::from_raw(raw) {
        Participant::Human(id) => Ok(id),
        Participant::Ai => bail!("user id 0 is reserved for the bot"),
    }
}

#[instrument(skip(config))]
fn build_registry(config: &BotConfig, memory: bool) -> Result<SessionRegistry> {
    let store: Arc<dyn ProfileStore> = if memory {
        Arc::new(MemoryProfileStore::new())
    } else {
        Arc::new(SqliteProfileStore::open(config.database_path().clone())?)
    };
    let strategies = match config.rng_seed() {
        Some(seed) => StandardProvider::seeded(*seed),
        None => StandardProvider::new(),
    };
    Ok(SessionRegistry::new(store)
        .with_strategies(Arc::new(strategies))
        .with_defaults(config.profile_defaults()))
}

/// Runs the console loop off the async runtime while the reaper ticks.
async fn run_console(
    registry: Arc<SessionRegistry>,
    config: &BotConfig,
    board: BoardId,
) -> Result<()> {
    let reaper = registry.spawn_reaper(config.reaper_interval(), config.idle_timeout());
    info!(board_id = %board, "Console session started");
    println!("Cells are numbered 1-9, left to right, top to bottom. q quits.");

    let worker = Arc::clone(&registry);
    let rounds = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        console::run(&worker, board, stdin.lock(), io::stdout())
    })
    .await??;

    reaper.abort();
    info!(rounds, "Console session ended");
    if registry.sessions().contains(&board) {
        registry.retire_board(board)?;
    }
    Ok(())
}

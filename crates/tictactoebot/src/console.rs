//! Line-oriented transport: reads cell numbers, prints boards.
//!
//! Works over any reader and writer so it can be driven from tests.

use std::io::{BufRead, Write};

use anyhow::Result;
use tictactoebot_engine::{Board, BoardId, Participant, TerminalState, UserId};
use tracing::{debug, instrument};

use crate::{PlayReport, SessionRegistry};

/// Plays rounds on `board_id` until the input ends or reads `q`.
///
/// Each line is a cell number for whoever holds the move; the computer
/// answers by itself. Returns the number of rounds finished.
///
/// # Errors
///
/// Returns an error if reading or writing fails, the board disappears, or
/// the profile store fails.
#[instrument(skip(registry, input, out))]
pub fn run<R: BufRead, W: Write>(
    registry: &SessionRegistry,
    board_id: BoardId,
    input: R,
    mut out: W,
) -> Result<usize> {
    let mut rounds = 0;
    let board = registry.get_board(board_id)?;
    writeln!(out, "{board}")?;
    prompt(&mut out, &board)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }
        let Ok(cell) = line.parse::<u8>() else {
            writeln!(out, "Enter a cell from 1 to 9, or q to quit")?;
            continue;
        };

        // A result left unrecorded by an earlier store failure goes first.
        if registry.check_terminal(board_id)?.is_terminal() {
            registry.settle(board_id)?;
        }
        let Participant::Human(mover) = registry.get_board(board_id)?.next_turn() else {
            continue;
        };

        match registry.play(board_id, mover, cell) {
            Ok(report) => {
                if report.is_round_over() {
                    rounds += 1;
                }
                show_report(&mut out, &report, mover)?;
            }
            Err(e) if e.is_rejection() => {
                debug!(error = %e, "Rejected console move");
                writeln!(out, "{e}")?;
            }
            Err(e) => return Err(e.into()),
        }
        prompt(&mut out, &registry.get_board(board_id)?)?;
    }

    Ok(rounds)
}

fn prompt<W: Write>(out: &mut W, board: &Board) -> Result<()> {
    if let Some(user) = board.next_turn().user_id() {
        let glyph = board
            .symbol_of(user.into())
            .and_then(|s| s.glyph())
            .unwrap_or("?");
        writeln!(out, "{glyph} {user} to move:")?;
    }
    Ok(())
}

fn show_report<W: Write>(out: &mut W, report: &PlayReport, mover: UserId) -> Result<()> {
    if let Some(cell) = report.ai_move() {
        writeln!(out, "Bot plays {cell}")?;
    }
    writeln!(out, "{}", report.board())?;
    match report.state() {
        TerminalState::InProgress => {}
        TerminalState::Draw => writeln!(out, "Draw after {} moves", report.moves())?,
        TerminalState::Won(winner) => {
            writeln!(out, "{winner} wins after {} moves", report.moves())?
        }
    }
    if let Some(score) = report.score() {
        writeln!(out, "Score for {mover}: {score}")?;
        writeln!(out, "New round")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryProfileStore;
    use std::sync::Arc;
    use tictactoebot_engine::Symbol;

    #[test]
    fn test_duel_over_text() {
        let registry = SessionRegistry::new(Arc::new(MemoryProfileStore::new()));
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let id = registry
            .create_multiplayer_session(alice, bob, Symbol::Cross)
            .unwrap();

        // Alice takes the left column; "x" and "5" again are rejected.
        let input = "1\n2\nx\n4\n5\n5\n7\nq\n";
        let mut out = Vec::new();
        let rounds = run(&registry, id, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(rounds, 1);
        assert!(text.contains("Enter a cell from 1 to 9"));
        assert!(text.contains("already occupied"));
        assert!(text.contains("user 1 wins after 5 moves"));
        let profile = registry.profile(alice).unwrap();
        assert_eq!(*profile.score().player(), 1);
        assert_eq!(*registry.profile(bob).unwrap().score().enemy(), 1);
    }
}

//! Whole-game tests driving the board with both strategies.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tictactoebot_engine::{
    Board, BoardId, MinimaxAi, Participant, RandomAi, Strategy, Symbol, TerminalState, UserId,
};

const PLAYER: UserId = UserId::new(1001);

/// Plays a random human against `bot` until the board is terminal.
fn play_out(board: &mut Board, human: &mut impl Strategy, bot: &mut dyn Strategy) -> TerminalState {
    loop {
        let state = board.check_terminal();
        if state.is_terminal() {
            return state;
        }
        match board.next_turn() {
            Participant::Human(id) => {
                let cell = human.select_move(&board.position_for(board.author_symbol()));
                board.apply_move(id, cell).expect("human move");
            }
            Participant::Ai => {
                board.apply_ai_move(bot).expect("bot move");
            }
        }
    }
}

#[test]
fn test_minimax_never_loses_to_random_play() {
    for seed in 0..20 {
        for symbol in [Symbol::Cross, Symbol::Zero] {
            let mut board = Board::solo(BoardId::new(seed), PLAYER, symbol).expect("board");
            let mut human = RandomAi::new(StdRng::seed_from_u64(seed));
            let state = play_out(&mut board, &mut human, &mut MinimaxAi::new());
            assert_ne!(
                state,
                TerminalState::Won(PLAYER.into()),
                "seed {seed}: minimax lost\n{board}"
            );
        }
    }
}

#[test]
fn test_history_matches_marks() {
    let mut board = Board::solo(BoardId::new(1), PLAYER, Symbol::Cross).expect("board");
    let mut human = RandomAi::new(StdRng::seed_from_u64(99));
    let mut bot = RandomAi::new(StdRng::seed_from_u64(100));
    play_out(&mut board, &mut human, &mut bot);

    let marked = board.cells().iter().filter(|s| s.is_mark()).count();
    assert_eq!(board.history().len(), marked);
    for &cell in board.history() {
        assert!(!board.is_cell_empty(cell));
    }
}

#[test]
fn test_board_snapshot_serializes() {
    let mut board = Board::solo(BoardId::new(5), PLAYER, Symbol::Zero).expect("board");
    board.apply_move(PLAYER, 1).expect("move");

    let json = serde_json::to_string(&board).expect("serialize");
    let back: Board = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, board);
    assert_eq!(back.cell(1), Some(Symbol::Zero));
    assert_eq!(back.next_turn(), Participant::Ai);
}

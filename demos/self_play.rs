extern crate cube_mcts;

use cube_mcts::game_state::GameState;
use cube_mcts::mcts::{MonteCarloTreeSearch, MoveChooser};
use cube_mcts::random::SeededRandomGenerator;

const SIMULATIONS_PER_MOVE: u32 = 200;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Both sides share one engine; every search starts from a fresh tree
    let mut engine = MonteCarloTreeSearch::builder(GameState::initial())
        .with_random_generator(SeededRandomGenerator::new(2024))
        .build();

    let mut state = GameState::initial();
    let mut moves = 0;
    while state.utility().is_none() {
        let mv = match engine.choose_move(&state, SIMULATIONS_PER_MOVE) {
            Ok(mv) => mv,
            Err(err) => panic!("engine failed to move: {err}"),
        };
        tracing::info!(player = %state.player(), mv, "move played");

        state = match state.successor(mv) {
            Ok(next) => next,
            Err(err) => panic!("engine chose an illegal move: {err}"),
        };
        moves += 1;
        assert!(moves <= 64, "a game cannot outlast the board");
    }

    println!("{state}");
    if let Some(utility) = state.utility() {
        println!("{utility} ({moves} moves)");
    }
}

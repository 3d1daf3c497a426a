//! Monte Carlo tree search for 3D Tic-Tac-Toe played on a 4x4x4 cube.
//!
//! Two players, MAX and MIN, take turns claiming one of the 64 cells. The first
//! to complete any of the 76 straight lines of four wins; a full cube with no
//! completed line is a draw. The engine grows a search tree one node per
//! iteration, picks children with a UCB1 policy, scores new nodes with uniformly
//! random rollouts and finally plays the most visited move at the root.
//!
//! # Example
//!
//! ```rust
//! use cube_mcts::game_state::GameState;
//! use cube_mcts::mcts::{MonteCarloTreeSearch, MoveChooser};
//! use cube_mcts::random::SeededRandomGenerator;
//!
//! // MAX opens in a corner
//! let state = GameState::initial().successor(0).unwrap();
//!
//! let mut mcts = MonteCarloTreeSearch::builder(state)
//!     .with_random_generator(SeededRandomGenerator::new(42))
//!     .build();
//!
//! let reply = mcts.choose_move(&state, 500).unwrap();
//! assert!(state.is_legal(reply));
//!
//! for stats in mcts.child_stats() {
//!     println!("{stats}");
//! }
//! ```

use std::fmt;

/// Cube geometry: cell indexing and the 76 winning lines.
pub mod board;
/// The immutable game position.
pub mod game_state;
/// The search driver, its builder and the `MoveChooser` entry point.
pub mod mcts;
/// Contains the `MctsNode` struct, which represents a node in the search tree.
pub mod mcts_node;
/// Contains traits and implementations for random number generation.
pub mod random;

/// Index of a cell, `z * 16 + y * 4 + x`, always below 64.
pub type Cell = u8;

/// The two sides. MAX always moves first.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Player {
    Max = 1,
    Min = -1,
}

impl Player {
    pub const fn opponent(self) -> Player {
        match self {
            Player::Max => Player::Min,
            Player::Min => Player::Max,
        }
    }

    /// `+1` for MAX, `-1` for MIN.
    pub const fn sign(self) -> i8 {
        self as i8
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Player::Max => 0,
            Player::Min => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Max => f.write_str("MAX"),
            Player::Min => f.write_str("MIN"),
        }
    }
}

/// Final result of a game. A position that is still being played has no utility.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Utility {
    MaxWins,
    MinWins,
    Draw,
}

impl Utility {
    /// `+1` for a MAX win, `-1` for a MIN win, `0` for a draw.
    pub const fn value(self) -> i8 {
        match self {
            Utility::MaxWins => 1,
            Utility::MinWins => -1,
            Utility::Draw => 0,
        }
    }

    pub const fn winner(self) -> Option<Player> {
        match self {
            Utility::MaxWins => Some(Player::Max),
            Utility::MinWins => Some(Player::Min),
            Utility::Draw => None,
        }
    }

    pub(crate) const fn won_by(player: Player) -> Utility {
        match player {
            Player::Max => Utility::MaxWins,
            Player::Min => Utility::MinWins,
        }
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utility::MaxWins => f.write_str("MAX wins!"),
            Utility::MinWins => f.write_str("MIN wins!"),
            Utility::Draw => f.write_str("Tie game"),
        }
    }
}

use crate::game_state::GameState;
use crate::{Cell, Player, Utility};
use std::fmt;

/// Represents a single node in the Monte Carlo search tree.
///
/// The position itself never changes; only the counters grow as simulations
/// are propagated back through the node. Children are stored by the owning
/// `ego_tree::Tree`.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// The position this node stands for.
    pub state: GameState,
    /// Simulations through this node won by the player who moved into it.
    pub wins: u32,
    /// Simulations through this node.
    pub sims: u32,
}

impl MctsNode {
    /// Creates a node for `state` with zeroed counters.
    pub fn new(state: GameState) -> Self {
        MctsNode {
            state,
            wins: 0,
            sims: 0,
        }
    }

    /// The move that led to this node. `None` for a root built from a
    /// constructed position.
    pub fn prev_move(&self) -> Option<Cell> {
        self.state.last_move()
    }

    /// The player whose move produced this position.
    pub fn mover(&self) -> Player {
        self.state.player().opponent()
    }

    /// Terminal nodes are never expanded.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Calculates the win rate of this node.
    pub fn wins_rate(&self) -> f64 {
        if self.sims == 0 {
            0.0
        } else {
            (self.wins as f64) / (self.sims as f64)
        }
    }

    /// Records the result of one simulation. Draws only count as a visit.
    pub fn update_outcome(&mut self, outcome: Utility) {
        if outcome.winner() == Some(self.mover()) {
            self.wins += 1;
        }
        self.sims += 1;
    }

    /// Copies the counters out for display.
    pub fn stats(&self) -> ChildStats {
        ChildStats {
            mv: self.prev_move(),
            wins: self.wins,
            sims: self.sims,
        }
    }
}

/// Snapshot of one node's counters, used to inspect the root after a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub mv: Option<Cell>,
    pub wins: u32,
    pub sims: u32,
}

impl ChildStats {
    /// `wins / sims`, or `0.0` for an unvisited node.
    pub fn win_ratio(&self) -> f64 {
        if self.sims == 0 {
            0.0
        } else {
            self.wins as f64 / self.sims as f64
        }
    }
}

impl fmt::Display for ChildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mv {
            Some(mv) => write!(f, "[{mv:>2}]:")?,
            None => f.write_str("[--]:")?,
        }
        write!(
            f,
            " {:>4}/{:>4} {:>5.1}%",
            self.wins,
            self.sims,
            self.win_ratio() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_counts_for_the_mover() {
        // arrange
        let state = GameState::initial().successor(0).unwrap();
        let mut node = MctsNode::new(state);

        // act
        node.update_outcome(Utility::MaxWins);
        node.update_outcome(Utility::MinWins);
        node.update_outcome(Utility::Draw);

        // assert
        assert_eq!(node.mover(), Player::Max);
        assert_eq!(node.wins, 1);
        assert_eq!(node.sims, 3);
        assert!(node.wins <= node.sims);
    }

    #[test]
    fn draws_are_never_wins() {
        let mut node = MctsNode::new(GameState::initial());
        for _ in 0..5 {
            node.update_outcome(Utility::Draw);
        }
        assert_eq!(node.wins, 0);
        assert_eq!(node.sims, 5);
        assert_eq!(node.wins_rate(), 0.0);
    }

    #[test]
    fn stats_render_like_a_table_row() {
        let stats = ChildStats {
            mv: Some(7),
            wins: 12,
            sims: 40,
        };
        assert_eq!(stats.to_string(), "[ 7]:   12/  40  30.0%");
        assert_eq!(ChildStats { mv: None, wins: 0, sims: 0 }.win_ratio(), 0.0);
    }
}

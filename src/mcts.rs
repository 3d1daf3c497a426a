use crate::game_state::GameState;
use crate::mcts_node::{ChildStats, MctsNode};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::{Cell, Utility, board};
use ego_tree::{NodeId, NodeRef, Tree};
use thiserror::Error;
use tracing::{debug, trace};

/// Exploration constant used unless the builder overrides it.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = std::f64::consts::SQRT_2;

/// Errors returned by [`MoveChooser::choose_move`].
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SearchError {
    #[error("cannot search for a move in a finished game")]
    GameOver,

    #[error("simulation budget must be positive")]
    EmptyBudget,

    #[error("search finished without a candidate move")]
    NoCandidate,
}

/// Anything that can pick a move for the side to move in a running game.
pub trait MoveChooser {
    /// Returns one of `state`'s legal moves after spending `budget` simulations.
    fn choose_move(&mut self, state: &GameState, budget: u32) -> Result<Cell, SearchError>;
}

/// Result of a random playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    pub outcome: Utility,
    /// Moves played before the game ended. Never more than the empty cells of
    /// the starting position.
    pub steps: u32,
}

/// Plays uniformly random moves from `state` until the game ends. The
/// positions visited are not kept.
pub fn rollout<K: RandomGenerator>(state: GameState, random: &mut K) -> Rollout {
    let mut state = state;
    let mut steps = 0;
    while let Some(next) = state.random_successor(random) {
        state = next;
        steps += 1;
    }
    Rollout {
        // a non-terminal position always has a random successor
        outcome: state.utility().unwrap_or(Utility::Draw),
        steps,
    }
}

/// The search driver: a tree of [`MctsNode`]s rooted at the position to move
/// from, the generator used for every random choice and the UCB1 exploration
/// constant.
pub struct MonteCarloTreeSearch<K: RandomGenerator> {
    tree: Tree<MctsNode>,
    random: K,
    exploration_constant: f64,
}

impl<K: RandomGenerator> Default for MonteCarloTreeSearch<K> {
    fn default() -> Self {
        MonteCarloTreeSearchBuilder::new(GameState::initial()).build()
    }
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<K: RandomGenerator> {
    state: GameState,
    random_generator: K,
    exploration_constant: f64,
}

impl<K: RandomGenerator> MonteCarloTreeSearchBuilder<K> {
    /// Creates a new builder with the given root position.
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            random_generator: K::default(),
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
        }
    }

    /// Sets the random number generator for the MCTS search.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    /// Sets `c` in the UCB1 formula. Higher values explore more.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builds the `MonteCarloTreeSearch` instance with the configured parameters.
    pub fn build(self) -> MonteCarloTreeSearch<K> {
        MonteCarloTreeSearch::new(self.state, self.random_generator, self.exploration_constant)
    }
}

impl<K: RandomGenerator> MonteCarloTreeSearch<K> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(state: GameState) -> MonteCarloTreeSearchBuilder<K> {
        MonteCarloTreeSearchBuilder::new(state)
    }

    /// Creates a new `MonteCarloTreeSearch` instance.
    ///
    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(state: GameState, rg: K, exploration_constant: f64) -> Self {
        Self {
            tree: Tree::new(MctsNode::new(state)),
            random: rg,
            exploration_constant,
        }
    }

    /// Drops the current tree and starts over from `state`.
    pub fn reset(&mut self, state: GameState) {
        self.tree = Tree::new(MctsNode::new(state));
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn get_tree(&self) -> &Tree<MctsNode> {
        &self.tree
    }

    /// Returns a reference to the root node of the search tree.
    pub fn get_root(&self) -> NodeRef<'_, MctsNode> {
        self.tree.root()
    }

    /// Returns the id of the root node, the position the search moves from.
    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Returns `c` of the UCB1 formula this search was built with.
    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }

    /// Runs the MCTS search for a specified number of iterations.
    pub fn iterate_n_times(&mut self, n: u32) {
        for _ in 0..n {
            self.do_iteration();
        }
    }

    /// Performs one full iteration: selection, expansion, a rollout and
    /// backpropagation. Returns the path of updated nodes, root first.
    pub fn do_iteration(&mut self) -> Vec<NodeId> {
        let mut current = self.root_id();
        let mut path = vec![current];

        while let Some(child) = self.select(current) {
            path.push(child);
            current = child;
        }

        if let Some(child) = self.expand(current) {
            path.push(child);
            current = child;
        }

        let Some(state) = self.tree.get(current).map(|node| node.value().state) else {
            return path;
        };
        let result = rollout(state, &mut self.random);
        trace!(
            depth = path.len(),
            leaf = ?state.last_move(),
            steps = result.steps,
            outcome = ?result.outcome,
            "iteration finished"
        );

        self.backpropagate(&path, result.outcome);
        path
    }

    /// Picks the expanded child of `node_id` with the highest UCB1 score.
    ///
    /// Returns `None` when nothing has been expanded yet, or when some legal move
    /// is still unexpanded and the best score stays under
    /// `c * sqrt(ln(sims + 1))`; the caller should then expand instead.
    pub fn select(&self, node_id: NodeId) -> Option<NodeId> {
        let node = self.tree.get(node_id)?;
        let parent = node.value();
        let c = self.exploration_constant;

        let mut expanded = 0;
        let mut best: Option<(NodeId, Cell, f64)> = None;
        for child in node.children() {
            expanded += 1;
            let data = child.value();
            if data.sims == 0 {
                continue;
            }

            let score = Self::ucb_value(parent.sims, data.wins, data.sims, c);
            let mv = data.prev_move().unwrap_or(Cell::MAX);
            let is_better = match best {
                None => true,
                Some((_, best_mv, best_score)) => {
                    score > best_score || (score == best_score && mv < best_mv)
                }
            };
            if is_better {
                best = Some((child.id(), mv, score));
            }
        }

        let (best_id, _, best_score) = best?;
        let all_expanded = expanded == parent.state.legal_move_count();
        let threshold = c * f64::sqrt(f64::ln(parent.sims as f64 + 1.0));
        if all_expanded || best_score >= threshold {
            Some(best_id)
        } else {
            None
        }
    }

    /// Adds one child for a random legal move that has no child yet. Returns
    /// `None` for terminal nodes and for nodes whose moves are all expanded.
    pub fn expand(&mut self, node_id: NodeId) -> Option<NodeId> {
        let node = self.tree.get(node_id)?;
        if node.value().is_terminal() {
            return None;
        }

        let state = node.value().state;
        let expanded = node
            .children()
            .filter_map(|child| child.value().prev_move())
            .fold(0, |mask, mv| mask | board::bit(mv));
        let candidates: Vec<Cell> = board::cells(state.legal_mask() & !expanded).collect();
        let cell = *self.random.pick(&candidates)?;
        let child_state = state.successor(cell).ok()?;

        let mut parent = self.tree.get_mut(node_id)?;
        let child = parent.append(MctsNode::new(child_state));
        Some(child.id())
    }

    /// Records `outcome` on every node of `path`, leaf first.
    pub fn backpropagate(&mut self, path: &[NodeId], outcome: Utility) {
        for &node_id in path.iter().rev() {
            if let Some(mut node) = self.tree.get_mut(node_id) {
                node.value().update_outcome(outcome);
            }
        }
    }

    /// The root child to play: most visited, then best win ratio, then lowest
    /// cell index.
    pub fn best_child(&self) -> Option<NodeRef<'_, MctsNode>> {
        self.tree.root().children().max_by(|a, b| {
            let (a, b) = (a.value(), b.value());
            a.sims
                .cmp(&b.sims)
                .then_with(|| a.wins_rate().total_cmp(&b.wins_rate()))
                .then_with(|| b.prev_move().cmp(&a.prev_move()))
        })
    }

    /// The cell of [`best_child`](Self::best_child), or `None` before the root
    /// has any children.
    pub fn best_move(&self) -> Option<Cell> {
        self.best_child().and_then(|child| child.value().prev_move())
    }

    /// Counters of every root child, ordered by move.
    pub fn child_stats(&self) -> Vec<ChildStats> {
        let mut stats: Vec<ChildStats> = self
            .tree
            .root()
            .children()
            .map(|child| child.value().stats())
            .collect();
        stats.sort_by_key(|s| s.mv);
        stats
    }

    /// Calculates the UCB1 (Upper Confidence Bound 1) value for a node.
    ///
    /// The exploration term falls back to plain `c` while either count is zero.
    fn ucb_value(total_sims: u32, node_wins: u32, node_sims: u32, c: f64) -> f64 {
        if node_sims == 0 || total_sims == 0 {
            let exploitation = if node_sims == 0 {
                0.0
            } else {
                (node_wins as f64) / (node_sims as f64)
            };
            return exploitation + c;
        }

        ((node_wins as f64) / (node_sims as f64))
            + c * f64::sqrt(f64::ln(total_sims as f64) / (node_sims as f64))
    }
}

impl MonteCarloTreeSearch<StandardRandomGenerator> {
    /// Creates a search rooted at `state` using the thread-local generator and
    /// the default exploration constant.
    pub fn from_state(state: GameState) -> Self {
        MonteCarloTreeSearchBuilder::new(state).build()
    }
}

impl<K: RandomGenerator> MoveChooser for MonteCarloTreeSearch<K> {
    fn choose_move(&mut self, state: &GameState, budget: u32) -> Result<Cell, SearchError> {
        if state.is_terminal() {
            return Err(SearchError::GameOver);
        }
        if budget == 0 {
            return Err(SearchError::EmptyBudget);
        }

        self.reset(*state);
        self.iterate_n_times(budget);

        let best = self.best_move().ok_or(SearchError::NoCandidate)?;
        debug!(
            mv = best,
            sims = self.get_root().value().sims,
            nodes = self.tree.nodes().count(),
            "search finished"
        );
        for stats in self.child_stats() {
            debug!(%stats, "root child");
        }
        Ok(best)
    }
}

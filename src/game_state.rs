use crate::board::{self, CELL_COUNT, FULL_BOARD, LINE_MASKS, SIZE};
use crate::random::RandomGenerator;
use crate::{Cell, Player, Utility};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Reasons a position or a transition is rejected.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum GameError {
    #[error("cell {0} is outside the 4x4x4 board")]
    OutOfRange(Cell),

    #[error("cell {0} is already occupied")]
    Occupied(Cell),

    #[error("cell {0} is listed for both players")]
    Overlap(Cell),

    #[error("the game is already over")]
    GameOver,

    #[error("MAX holds {max} cells and MIN holds {min}, which no game can reach")]
    Unbalanced { max: u32, min: u32 },

    #[error("both players hold a completed line")]
    BothWon,

    #[error("{winner} holds a completed line but did not make the last move")]
    WonOutOfTurn { winner: Player },
}

/// An immutable position of 4x4x4 Tic-Tac-Toe.
///
/// Occupancy is kept as one 64-bit mask per side. Equality and hashing look at
/// those masks only, so the same position reached by different move orders is
/// one and the same key.
#[derive(Debug, Clone, Copy)]
pub struct GameState {
    player: Player,
    occupied: [u64; 2],
    last_move: Option<Cell>,
    utility: Option<Utility>,
}

impl GameState {
    /// The empty cube with MAX to move.
    pub fn initial() -> Self {
        Self {
            player: Player::Max,
            occupied: [0, 0],
            last_move: None,
            utility: None,
        }
    }

    /// Builds a position from the cells each side holds. The side to move is MAX
    /// when both hold the same number of cells, MIN when MAX is one ahead.
    pub fn from_cells(max: &[Cell], min: &[Cell]) -> Result<Self, GameError> {
        let max_mask = Self::mask_of(max)?;
        let min_mask = Self::mask_of(min)?;
        if let Some(cell) = board::cells(max_mask & min_mask).next() {
            return Err(GameError::Overlap(cell));
        }

        let (max_count, min_count) = (max_mask.count_ones(), min_mask.count_ones());
        let player = if max_count == min_count {
            Player::Max
        } else if max_count == min_count + 1 {
            Player::Min
        } else {
            return Err(GameError::Unbalanced {
                max: max_count,
                min: min_count,
            });
        };

        match (Self::has_line(max_mask), Self::has_line(min_mask)) {
            (true, true) => return Err(GameError::BothWon),
            (true, false) if player == Player::Max => {
                return Err(GameError::WonOutOfTurn { winner: Player::Max });
            }
            (false, true) if player == Player::Min => {
                return Err(GameError::WonOutOfTurn { winner: Player::Min });
            }
            _ => {}
        }

        let occupied = [max_mask, min_mask];
        Ok(Self {
            player,
            occupied,
            last_move: None,
            utility: Self::compute_utility(&occupied),
        })
    }

    /// The position after the side to move claims `cell`.
    pub fn successor(&self, cell: Cell) -> Result<Self, GameError> {
        if cell as usize >= CELL_COUNT {
            return Err(GameError::OutOfRange(cell));
        }
        if self.utility.is_some() {
            return Err(GameError::GameOver);
        }
        if !self.is_legal(cell) {
            return Err(GameError::Occupied(cell));
        }
        Ok(self.place(cell))
    }

    /// A successor through a uniformly random legal move, or `None` once the game
    /// is over. This is the single step of a rollout; the positions it yields
    /// never enter the search tree.
    pub fn random_successor<K: RandomGenerator>(&self, random: &mut K) -> Option<Self> {
        if self.utility.is_some() {
            return None;
        }
        let moves: Vec<Cell> = self.legal_moves().collect();
        random.pick(&moves).map(|&cell| self.place(cell))
    }

    /// The side to move next.
    pub fn player(&self) -> Player {
        self.player
    }

    /// The cell claimed to reach this position, `None` for a constructed one.
    pub fn last_move(&self) -> Option<Cell> {
        self.last_move
    }

    /// `None` while the game is still running.
    pub fn utility(&self) -> Option<Utility> {
        self.utility
    }

    /// `true` once someone has won or the cube is full.
    pub fn is_terminal(&self) -> bool {
        self.utility.is_some()
    }

    /// Occupancy mask of `player`.
    pub fn occupied(&self, player: Player) -> u64 {
        self.occupied[player.index()]
    }

    /// Mask of empty cells.
    pub fn legal_mask(&self) -> u64 {
        !(self.occupied[0] | self.occupied[1])
    }

    /// Empty cells, ascending.
    pub fn legal_moves(&self) -> impl Iterator<Item = Cell> + use<> {
        board::cells(self.legal_mask())
    }

    /// Number of empty cells.
    pub fn legal_move_count(&self) -> usize {
        self.legal_mask().count_ones() as usize
    }

    /// `true` if `cell` is on the board and empty.
    pub fn is_legal(&self, cell: Cell) -> bool {
        (cell as usize) < CELL_COUNT && self.legal_mask() & board::bit(cell) != 0
    }

    /// Who holds `cell`, if anyone.
    pub fn owner(&self, cell: Cell) -> Option<Player> {
        let bit = board::bit(cell);
        if self.occupied(Player::Max) & bit != 0 {
            Some(Player::Max)
        } else if self.occupied(Player::Min) & bit != 0 {
            Some(Player::Min)
        } else {
            None
        }
    }

    fn place(&self, cell: Cell) -> Self {
        let mut occupied = self.occupied;
        occupied[self.player.index()] |= board::bit(cell);
        Self {
            player: self.player.opponent(),
            occupied,
            last_move: Some(cell),
            utility: Self::compute_utility(&occupied),
        }
    }

    fn mask_of(cells: &[Cell]) -> Result<u64, GameError> {
        cells.iter().try_fold(0, |mask, &cell| {
            if cell as usize >= CELL_COUNT {
                Err(GameError::OutOfRange(cell))
            } else {
                Ok(mask | board::bit(cell))
            }
        })
    }

    fn has_line(held: u64) -> bool {
        LINE_MASKS.iter().any(|&line| held & line == line)
    }

    fn compute_utility(occupied: &[u64; 2]) -> Option<Utility> {
        for player in [Player::Max, Player::Min] {
            if Self::has_line(occupied[player.index()]) {
                return Some(Utility::won_by(player));
            }
        }
        if occupied[0] | occupied[1] == FULL_BOARD {
            return Some(Utility::Draw);
        }
        None
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::initial()
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.occupied == other.occupied
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.occupied.hash(state);
    }
}

/// Four rows, one per `y`; each row shows the four `z` layers side by side.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for y in 0..SIZE {
            for z in 0..SIZE {
                for x in 0..SIZE {
                    let cell = board::cell_at(x, y, z);
                    match self.owner(cell) {
                        Some(Player::Max) => write!(f, "{:>4}", "X")?,
                        Some(Player::Min) => write!(f, "{:>4}", "O")?,
                        None => write!(f, "{cell:>4}")?,
                    }
                }
                f.write_str("    ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{LINES, winning_lines};
    use crate::random::SeededRandomGenerator;
    use std::collections::HashSet;

    fn play(moves: &[Cell]) -> GameState {
        moves.iter().fold(GameState::initial(), |state, &cell| {
            state.successor(cell).unwrap()
        })
    }

    #[test]
    fn initial_state_is_empty() {
        let state = GameState::initial();
        assert_eq!(state.player(), Player::Max);
        assert_eq!(state.last_move(), None);
        assert_eq!(state.utility(), None);
        assert_eq!(
            state.legal_moves().collect::<Vec<_>>(),
            (0..64).collect::<Vec<Cell>>()
        );
        assert_eq!(state.occupied(Player::Max), 0);
        assert_eq!(state.occupied(Player::Min), 0);
    }

    #[test]
    fn successor_moves_the_cell_and_flips_the_player() {
        // arrange
        let state = GameState::initial();

        // act
        let next = state.successor(17).unwrap();

        // assert
        assert_eq!(next.player(), Player::Min);
        assert_eq!(next.last_move(), Some(17));
        assert_eq!(next.owner(17), Some(Player::Max));
        assert!(!next.is_legal(17));
        assert_eq!(next.legal_move_count(), 63);
        assert_eq!(state.legal_move_count(), 64);
    }

    #[test]
    fn invalid_moves_are_rejected() {
        let state = play(&[5]);
        assert_eq!(state.successor(64), Err(GameError::OutOfRange(64)));
        assert_eq!(state.successor(5), Err(GameError::Occupied(5)));
    }

    #[test]
    fn completing_any_line_wins() {
        for line in winning_lines() {
            let filler: Vec<Cell> = (0..64).filter(|c| !line.contains(c)).take(3).collect();
            let state = GameState::from_cells(&line, &filler).unwrap();
            assert_eq!(state.utility(), Some(Utility::MaxWins), "{line:?}");

            let error = GameState::from_cells(&filler, &line).unwrap_err();
            assert_eq!(error, GameError::Unbalanced { max: 3, min: 4 });
        }
    }

    #[test]
    fn min_wins_are_detected() {
        // MIN takes the x-line at y=3, z=3 while MAX scatters
        let state = play(&[0, 60, 21, 61, 42, 62, 5, 63]);
        assert_eq!(state.utility(), Some(Utility::MinWins));
        assert_eq!(state.successor(1), Err(GameError::GameOver));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let (max, min): (Vec<Cell>, Vec<Cell>) = (0..64).partition(|&cell| {
            let (x, y, z) = board::coordinates(cell);
            ((x + y + z) % 4 < 2) ^ (y == 3) ^ (z == 2)
        });
        assert_eq!(max.len(), 32);
        let state = GameState::from_cells(&max, &min).unwrap();
        assert_eq!(state.utility(), Some(Utility::Draw));
        assert_eq!(state.legal_move_count(), 0);
    }

    #[test]
    fn open_board_without_line_is_undetermined() {
        let state = play(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(state.utility(), None);
        assert!(!state.is_terminal());
    }

    #[test]
    fn transpositions_are_equal() {
        // arrange
        let first = play(&[0, 10, 20, 30]);
        let second = play(&[20, 30, 0, 10]);

        // act
        let set: HashSet<GameState> = [first, second].into_iter().collect();

        // assert
        assert_ne!(first.last_move(), second.last_move());
        assert_eq!(first, second);
        assert_eq!(set.len(), 1);
        assert_ne!(first, play(&[0, 10, 30, 20]));
    }

    #[test]
    fn from_cells_validates_input() {
        assert_eq!(
            GameState::from_cells(&[1, 2], &[2]),
            Err(GameError::Overlap(2))
        );
        assert_eq!(
            GameState::from_cells(&[70], &[]),
            Err(GameError::OutOfRange(70))
        );
        assert_eq!(
            GameState::from_cells(&[1, 2, 3], &[4]),
            Err(GameError::Unbalanced { max: 3, min: 1 })
        );
        let state = GameState::from_cells(&[1, 2], &[4]).unwrap();
        assert_eq!(state.player(), Player::Min);
    }

    #[test]
    fn from_cells_rejects_unreachable_wins() {
        // MAX completed 0..3 yet MAX is to move, so MIN moved last
        assert_eq!(
            GameState::from_cells(&[0, 1, 2, 3, 20], &[40, 41, 42, 60, 61]),
            Err(GameError::WonOutOfTurn { winner: Player::Max })
        );
        // MIN completed 4..7 while MAX is one cell ahead, so MAX moved last
        assert_eq!(
            GameState::from_cells(&[0, 1, 2, 20, 33], &[4, 5, 6, 7]),
            Err(GameError::WonOutOfTurn { winner: Player::Min })
        );
        assert_eq!(
            GameState::from_cells(&[0, 1, 2, 3, 20], &[4, 5, 6, 7]),
            Err(GameError::BothWon)
        );

        // the side that moved last may hold the line
        let state = GameState::from_cells(&[8, 9, 10, 20], &[4, 5, 6, 7]).unwrap();
        assert_eq!(state.utility(), Some(Utility::MinWins));
        assert_eq!(state.player(), Player::Max);
    }

    #[test]
    fn random_successor_plays_a_legal_move() {
        let mut random = SeededRandomGenerator::new(3);
        let state = play(&[0, 1, 2]);
        let next = state.random_successor(&mut random).unwrap();
        let cell = next.last_move().unwrap();
        assert!(state.is_legal(cell));
        assert_eq!(next.player(), Player::Max);

        let finished = GameState::from_cells(&LINES[0], &[40, 41, 42]).unwrap();
        assert_eq!(finished.random_successor(&mut random), None);
    }

    #[test]
    fn display_marks_both_players() {
        let state = play(&[0, 63]);
        let text = state.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[1].starts_with("   X   1   2   3    "));
        assert!(rows[4].ends_with("  60  61  62   O    "));
    }
}

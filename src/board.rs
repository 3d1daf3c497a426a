use crate::Cell;

/// Cells along one edge of the cube.
pub const SIZE: usize = 4;
/// Total number of cells.
pub const CELL_COUNT: usize = SIZE * SIZE * SIZE;
/// Number of straight lines of four: 48 along the axes, 24 planar diagonals and
/// 4 space diagonals.
pub const LINE_COUNT: usize = 76;
/// Occupancy mask with every cell set.
pub const FULL_BOARD: u64 = u64::MAX;

/// The four cells of one winning line.
pub type Line = [Cell; SIZE];

/// Every winning line, in a fixed order: axis lines first (x, y, z interleaved),
/// then planar diagonals, then the space diagonals.
pub const LINES: [Line; LINE_COUNT] = build_lines();

/// `LINES` as occupancy masks, bit `i` standing for cell `i`.
pub const LINE_MASKS: [u64; LINE_COUNT] = build_masks(&LINES);

/// Linear index of the cell at `(x, y, z)`.
pub const fn cell_at(x: usize, y: usize, z: usize) -> Cell {
    (z * SIZE * SIZE + y * SIZE + x) as Cell
}

/// Inverse of [`cell_at`].
pub const fn coordinates(cell: Cell) -> (usize, usize, usize) {
    let cell = cell as usize;
    (cell % SIZE, (cell / SIZE) % SIZE, cell / (SIZE * SIZE))
}

/// Mask with only `cell` set.
pub const fn bit(cell: Cell) -> u64 {
    1u64 << cell
}

/// All 76 winning lines. The sequence is lazy and can be restarted by calling
/// the function again.
pub fn winning_lines() -> impl Iterator<Item = Line> + Clone {
    let lines: &'static [Line; LINE_COUNT] = &LINES;
    lines.iter().copied()
}

/// Cells set in `mask`, ascending.
pub fn cells(mask: u64) -> impl Iterator<Item = Cell> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let cell = rest.trailing_zeros() as Cell;
        rest &= rest - 1;
        Some(cell)
    })
}

const fn build_lines() -> [Line; LINE_COUNT] {
    let mut lines = [[0; SIZE]; LINE_COUNT];
    let mut n = 0;

    // one line per axis through every (a, b) pair of the other two coordinates
    let mut a = 0;
    while a < SIZE {
        let mut b = 0;
        while b < SIZE {
            let mut i = 0;
            while i < SIZE {
                lines[n][i] = cell_at(i, a, b);
                lines[n + 1][i] = cell_at(a, i, b);
                lines[n + 2][i] = cell_at(a, b, i);
                i += 1;
            }
            n += 3;
            b += 1;
        }
        a += 1;
    }

    // both diagonals of every xy, xz and yz plane
    let mut k = 0;
    while k < SIZE {
        let mut i = 0;
        while i < SIZE {
            let r = SIZE - 1 - i;
            lines[n][i] = cell_at(i, i, k);
            lines[n + 1][i] = cell_at(r, i, k);
            lines[n + 2][i] = cell_at(i, k, i);
            lines[n + 3][i] = cell_at(r, k, i);
            lines[n + 4][i] = cell_at(k, i, i);
            lines[n + 5][i] = cell_at(k, r, i);
            i += 1;
        }
        n += 6;
        k += 1;
    }

    let mut i = 0;
    while i < SIZE {
        let r = SIZE - 1 - i;
        lines[n][i] = cell_at(i, i, i);
        lines[n + 1][i] = cell_at(r, i, i);
        lines[n + 2][i] = cell_at(i, r, i);
        lines[n + 3][i] = cell_at(r, r, i);
        i += 1;
    }

    lines
}

const fn build_masks(lines: &[Line; LINE_COUNT]) -> [u64; LINE_COUNT] {
    let mut masks = [0; LINE_COUNT];
    let mut n = 0;
    while n < LINE_COUNT {
        let mut i = 0;
        while i < SIZE {
            masks[n] |= bit(lines[n][i]);
            i += 1;
        }
        n += 1;
    }
    masks
}

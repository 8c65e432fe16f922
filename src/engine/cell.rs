use std::fmt;

/// Side length of the grid.
pub const SIDE: usize = 4;
/// Number of cells in the grid.
pub const CELLS: usize = SIDE * SIDE;

/// One of the four compass sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    West,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::West, Direction::South];

    /// The side facing back towards the cell this one was reached from.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
        }
    }
}

/// A single grid position's contents. `0` means empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub value: u32,
}

impl Cell {
    pub const EMPTY: Cell = Cell { value: 0 };

    #[inline]
    pub fn is_empty(self) -> bool { self.value == 0 }
}

/// Row/column address of a cell.
///
/// Neighbours are computed from the linear index (`±1` along a row, `±4`
/// along a column) with edge checks, so the relation is symmetric by
/// construction: `p.neighbor(d).and_then(|q| q.neighbor(d.opposite())) == Some(p)`
/// whenever `p` has a neighbour on side `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    row: usize,
    col: usize,
}

impl Position {
    /// Returns `None` when either coordinate falls outside the grid.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < SIDE && col < SIDE).then_some(Position { row, col })
    }

    /// Inverse of [`Position::index`].
    pub fn from_index(idx: usize) -> Option<Self> {
        (idx < CELLS).then(|| Position { row: idx / SIDE, col: idx % SIDE })
    }

    #[inline]
    pub fn row(self) -> usize { self.row }

    #[inline]
    pub fn col(self) -> usize { self.col }

    /// Row-major linear index, `row * 4 + col`.
    #[inline]
    pub fn index(self) -> usize { self.row * SIDE + self.col }

    pub fn neighbor(self, dir: Direction) -> Option<Position> {
        neighbor_index(self.index(), dir).map(|idx| Position { row: idx / SIDE, col: idx % SIDE })
    }

    /// All positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELLS).map(|idx| Position { row: idx / SIDE, col: idx % SIDE })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Linear index of the neighbour of `idx` on side `dir`, if any.
#[inline]
pub(crate) fn neighbor_index(idx: usize, dir: Direction) -> Option<usize> {
    debug_assert!(idx < CELLS);
    let (row, col) = (idx / SIDE, idx % SIDE);
    match dir {
        Direction::North if row > 0 => Some(idx - SIDE),
        Direction::East if col < SIDE - 1 => Some(idx + 1),
        Direction::West if col > 0 => Some(idx - 1),
        Direction::South if row < SIDE - 1 => Some(idx + SIDE),
        _ => None,
    }
}

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Smallest supported grid side.
pub const MIN_SIDE: usize = 2;
/// Largest supported grid side (tile labels must fit in a `u8`).
pub const MAX_SIDE: usize = 15;

/// A direction to move the blank cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All moves in the fixed expansion order used by the solvers.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Row/column delta applied to the blank cell.
    #[inline]
    fn delta(self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// Input that does not name a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown move {0:?}; expected one of u, d, l, r")]
pub struct ParseMoveError(String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Move::Up),
            "d" | "down" => Ok(Move::Down),
            "l" | "left" => Ok(Move::Left),
            "r" | "right" => Ok(Move::Right),
            other => Err(ParseMoveError(other.to_string())),
        }
    }
}

/// Canonical byte encoding of a configuration.
///
/// Two boards of the same grid size are equal iff their keys are equal; the
/// key is the row-major tile array itself.
pub type StateKey = Box<[u8]>;

/// Rejected tile layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("side {0} is out of range ({MIN_SIDE}..={MAX_SIDE})")]
    BadSide(usize),
    #[error("tiles are not a permutation of 0..{expected}")]
    NotAPermutation { expected: usize },
}

/// An immutable sliding-puzzle configuration: a square grid of numbered
/// tiles stored row-major with `0` for the blank cell.
///
/// All mutating operations return a fresh board; the search engine never
/// touches a shared configuration in place.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    tiles: Box<[u8]>,
    side: u8,
    blank: u8,
}

impl Board {
    /// The solved layout for `side`: row-major `1..side²-1` with the blank
    /// in the last cell.
    ///
    /// ```
    /// use npuzzle::board::Board;
    /// let b = Board::solved(3);
    /// assert_eq!(b.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 0]);
    /// ```
    pub fn solved(side: usize) -> Board {
        assert!(
            (MIN_SIDE..=MAX_SIDE).contains(&side),
            "side must be within {MIN_SIDE}..={MAX_SIDE}"
        );
        let cells = side * side;
        let tiles: Vec<u8> = (0..cells)
            .map(|i| if i == cells - 1 { 0 } else { (i + 1) as u8 })
            .collect();
        Board::from_tiles(side, tiles).expect("solved layout is a valid permutation")
    }

    /// Build a board from a row-major tile array.
    ///
    /// The array must be a permutation of `0..side²` (so exactly one blank).
    ///
    /// ```
    /// use npuzzle::board::{Board, BoardError};
    /// assert!(Board::from_tiles(2, vec![1, 2, 3, 0]).is_ok());
    /// assert_eq!(
    ///     Board::from_tiles(2, vec![1, 1, 3, 0]).unwrap_err(),
    ///     BoardError::NotAPermutation { expected: 4 },
    /// );
    /// ```
    pub fn from_tiles(side: usize, tiles: Vec<u8>) -> Result<Board, BoardError> {
        if !(MIN_SIDE..=MAX_SIDE).contains(&side) {
            return Err(BoardError::BadSide(side));
        }
        let cells = side * side;
        if tiles.len() != cells {
            return Err(BoardError::NotAPermutation { expected: cells });
        }
        let mut seen = vec![false; cells];
        for &tile in &tiles {
            let tile = tile as usize;
            if tile >= cells || seen[tile] {
                return Err(BoardError::NotAPermutation { expected: cells });
            }
            seen[tile] = true;
        }
        let blank = tiles
            .iter()
            .position(|&t| t == 0)
            .expect("permutation contains the blank") as u8;
        Ok(Board {
            tiles: tiles.into_boxed_slice(),
            side: side as u8,
            blank,
        })
    }

    /// A uniformly shuffled board that is solvable for [`Goal::standard`]
    /// and never already solved.
    ///
    /// Shuffles the solved layout, then repairs the inversion parity when
    /// the permutation lands on the unreachable half of the state space.
    ///
    /// ```
    /// use npuzzle::board::{is_solvable, Board};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let b = Board::shuffled(3, &mut rng);
    /// assert!(is_solvable(&b));
    /// ```
    pub fn shuffled<R: Rng + ?Sized>(side: usize, rng: &mut R) -> Board {
        let solved = Board::solved(side);
        loop {
            let mut tiles: Vec<u8> = solved.tiles.to_vec();
            tiles.shuffle(rng);
            if !parity_solvable(&tiles, side) {
                // transposing two tiles flips the inversion parity without
                // moving the blank
                let (a, b) = first_two_tiles(&tiles);
                tiles.swap(a, b);
            }
            let board = Board::from_tiles(side, tiles).expect("shuffle permutes a valid layout");
            if board.tiles != solved.tiles {
                return board;
            }
        }
    }

    /// Grid side length.
    #[inline]
    pub fn side(&self) -> usize {
        self.side as usize
    }

    /// Row-major tile array, `0` for the blank.
    #[inline]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    /// Cell index of the blank.
    #[inline]
    pub fn blank_index(&self) -> usize {
        self.blank as usize
    }

    /// Canonical key for this configuration.
    #[inline]
    pub fn key(&self) -> StateKey {
        self.tiles.clone()
    }

    /// Legal blank-moves from the current blank position, with the cell
    /// index the blank would move to.
    pub fn legal_moves(&self) -> Vec<(Move, usize)> {
        let side = self.side as isize;
        let (row, col) = (self.blank as isize / side, self.blank as isize % side);
        let mut moves = Vec::with_capacity(4);
        for mv in Move::ALL {
            let (dr, dc) = mv.delta();
            let (nr, nc) = (row + dr, col + dc);
            if nr >= 0 && nr < side && nc >= 0 && nc < side {
                moves.push((mv, (nr * side + nc) as usize));
            }
        }
        moves
    }

    /// Apply a move to the blank, returning the new configuration, or
    /// `None` when the move would leave the grid.
    ///
    /// ```
    /// use npuzzle::board::{Board, Move};
    /// let b = Board::solved(3);
    /// assert!(b.apply(Move::Down).is_none()); // blank is on the bottom row
    /// let b = b.apply(Move::Up).unwrap();
    /// assert_eq!(b.tiles(), &[1, 2, 3, 4, 5, 0, 7, 8, 6]);
    /// ```
    pub fn apply(&self, mv: Move) -> Option<Board> {
        self.legal_moves()
            .into_iter()
            .find(|&(m, _)| m == mv)
            .map(|(_, to)| self.with_blank_at(to))
    }

    /// Swap the blank with the tile at `idx` on a fresh copy.
    ///
    /// `idx` must be a legal destination from [`Board::legal_moves`].
    pub(crate) fn with_blank_at(&self, idx: usize) -> Board {
        let mut tiles = self.tiles.clone();
        tiles.swap(self.blank as usize, idx);
        Board {
            tiles,
            side: self.side,
            blank: idx as u8,
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({}x{} {:?})", self.side, self.side, self.tiles)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.side as usize;
        let width = (side * side - 1).to_string().len();
        let rule = "-".repeat(side * (width + 1) + 1);
        for row in 0..side {
            writeln!(f, "{rule}")?;
            write!(f, "|")?;
            for col in 0..side {
                match self.tiles[row * side + col] {
                    0 => write!(f, "{:>width$}|", "")?,
                    tile => write!(f, "{tile:>width$}|")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "{rule}")
    }
}

/// The target mapping: where each tile label belongs.
///
/// Supplied once per solve and read-only. A goal built by hand may be
/// partial; solving against a goal that misses a tile present on the board
/// is rejected up front as a malformed target.
#[derive(Debug, Clone)]
pub struct Goal {
    side: u8,
    pos: Box<[Option<(u8, u8)>]>,
}

impl Goal {
    /// The standard goal for `side`: row-major `1..side²-1`, blank last.
    pub fn standard(side: usize) -> Goal {
        assert!(
            (MIN_SIDE..=MAX_SIDE).contains(&side),
            "side must be within {MIN_SIDE}..={MAX_SIDE}"
        );
        let cells = side * side;
        let pos = (1..cells)
            .map(|tile| {
                let slot = tile - 1;
                Some(((slot / side) as u8, (slot % side) as u8))
            })
            .collect();
        Goal {
            side: side as u8,
            pos,
        }
    }

    /// Build a goal from explicit `(tile, (row, col))` entries.
    ///
    /// Tiles without an entry stay unmapped; a board carrying such a tile
    /// cannot be solved against this goal.
    pub fn from_positions(
        side: usize,
        entries: impl IntoIterator<Item = (u8, (usize, usize))>,
    ) -> Goal {
        assert!(
            (MIN_SIDE..=MAX_SIDE).contains(&side),
            "side must be within {MIN_SIDE}..={MAX_SIDE}"
        );
        let mut pos = vec![None; side * side - 1].into_boxed_slice();
        for (tile, (row, col)) in entries {
            assert!(
                tile != 0 && (tile as usize) < side * side,
                "tile {tile} is not a label on a {side}x{side} grid"
            );
            assert!(row < side && col < side, "({row}, {col}) is off the grid");
            pos[tile as usize - 1] = Some((row as u8, col as u8));
        }
        Goal {
            side: side as u8,
            pos,
        }
    }

    /// Grid side length this goal describes.
    #[inline]
    pub fn side(&self) -> usize {
        self.side as usize
    }

    /// Goal cell of `tile`, if the mapping has one. The blank has no entry.
    pub fn position_of(&self, tile: u8) -> Option<(usize, usize)> {
        if tile == 0 {
            return None;
        }
        self.pos
            .get(tile as usize - 1)
            .copied()
            .flatten()
            .map(|(r, c)| (r as usize, c as usize))
    }

    /// First tile on `board` this goal has no position for, if any.
    pub fn missing_tile(&self, board: &Board) -> Option<u8> {
        board
            .tiles()
            .iter()
            .copied()
            .find(|&tile| tile != 0 && self.position_of(tile).is_none())
    }

    /// Sum of per-tile Manhattan distances from `board` to this goal.
    ///
    /// Admissible and consistent for the sliding puzzle; zero iff the board
    /// matches the target exactly.
    ///
    /// # Panics
    ///
    /// Panics when the board carries a tile this goal has no position for;
    /// solvers validate the pair before searching.
    pub fn distance_from(&self, board: &Board) -> u32 {
        debug_assert_eq!(board.side(), self.side());
        let side = board.side();
        let mut total = 0u32;
        for (idx, &tile) in board.tiles().iter().enumerate() {
            if tile == 0 {
                continue;
            }
            let (row, col) = (idx / side, idx % side);
            let (goal_row, goal_col) = self
                .position_of(tile)
                .expect("goal has no position for a tile on the board; validate before solving");
            total += (row.abs_diff(goal_row) + col.abs_diff(goal_col)) as u32;
        }
        total
    }
}

/// True when `board` can reach the standard solved layout.
///
/// Odd side: the tile permutation must have an even inversion count. Even
/// side: inversion count plus the blank's row counted from the bottom
/// (1-based) must be odd.
pub fn is_solvable(board: &Board) -> bool {
    parity_solvable(board.tiles(), board.side())
}

fn parity_solvable(tiles: &[u8], side: usize) -> bool {
    let mut inversions = 0usize;
    for i in 0..tiles.len() {
        for j in i + 1..tiles.len() {
            if tiles[i] != 0 && tiles[j] != 0 && tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    if side % 2 == 1 {
        inversions % 2 == 0
    } else {
        let blank_idx = tiles
            .iter()
            .position(|&t| t == 0)
            .expect("board contains a blank");
        let blank_row_from_bottom = side - blank_idx / side;
        (inversions + blank_row_from_bottom) % 2 == 1
    }
}

fn first_two_tiles(tiles: &[u8]) -> (usize, usize) {
    let mut it = tiles
        .iter()
        .enumerate()
        .filter(|(_, &t)| t != 0)
        .map(|(i, _)| i);
    (
        it.next().expect("grid has tiles"),
        it.next().expect("grid has at least two tiles"),
    )
}

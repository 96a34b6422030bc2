use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::tile::Tile;

pub const SIZE: usize = 4;
pub const CELLS: usize = SIZE * SIZE;

/// Direction the blank slides in. The tile on the far side moves the other way.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Expansion order shared by both search engines.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn to_char(&self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// (row, col) offset of the blank's destination cell.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("expected {expected} tiles, got {found}")]
    WrongTileCount { expected: usize, found: usize },
    #[error("'{0}' is not a valid tile number")]
    InvalidToken(String),
    #[error("tile {0} is out of range 0..=15")]
    OutOfRange(u64),
    #[error("tile {0} appears more than once")]
    DuplicateTile(u8),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

/// A 4x4 board. Holds exactly one blank and a permutation of 1..=15.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Puzzle {
    tiles: [Tile; CELLS],
}

impl Puzzle {
    pub fn solved() -> Self {
        let mut tiles = [Tile::blank(); CELLS];
        for (idx, tile) in tiles.iter_mut().take(CELLS - 1).enumerate() {
            *tile = Tile::new(idx as u8 + 1);
        }
        Self { tiles }
    }

    /// Builds a board from a row-major list of values, rejecting anything that
    /// is not a permutation of 0..=15.
    pub fn from_values(values: &[u64]) -> Result<Self, PuzzleError> {
        if values.len() != CELLS {
            return Err(PuzzleError::WrongTileCount {
                expected: CELLS,
                found: values.len(),
            });
        }

        let mut seen = [false; CELLS];
        let mut tiles = [Tile::blank(); CELLS];

        for (idx, &value) in values.iter().enumerate() {
            if value >= CELLS as u64 {
                return Err(PuzzleError::OutOfRange(value));
            }
            let raw = value as u8;
            if seen[raw as usize] {
                return Err(PuzzleError::DuplicateTile(raw));
            }
            seen[raw as usize] = true;
            tiles[idx] = Tile::new(raw);
        }

        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile; CELLS] {
        &self.tiles
    }

    pub fn values(&self) -> [u8; CELLS] {
        self.tiles.map(|t| t.raw())
    }

    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.tiles[row * SIZE + col]
    }

    pub fn space_idx(&self) -> usize {
        self.tiles
            .iter()
            .position(|t| t.is_blank())
            .expect("board invariant: exactly one blank")
    }

    pub fn find_blank(&self) -> (usize, usize) {
        let idx = self.space_idx();
        (idx / SIZE, idx % SIZE)
    }

    /// Slides the blank one cell. Returns `None` when the destination falls
    /// outside the grid; there is no wraparound.
    pub fn apply_move(&self, dir: Direction) -> Option<Puzzle> {
        let (row, col) = self.find_blank();
        let (dr, dc) = dir.offset();
        let new_row = row as isize + dr;
        let new_col = col as isize + dc;

        if new_row < 0 || new_row >= SIZE as isize || new_col < 0 || new_col >= SIZE as isize {
            return None;
        }

        let mut successor = *self;
        successor
            .tiles
            .swap(row * SIZE + col, new_row as usize * SIZE + new_col as usize);
        Some(successor)
    }

    pub fn move_space(&mut self, dir: Direction) -> Result<(), PuzzleError> {
        match self.apply_move(dir) {
            Some(next) => {
                *self = next;
                Ok(())
            }
            None => {
                let edge = match dir {
                    Direction::Up => "top",
                    Direction::Down => "bottom",
                    Direction::Left => "left",
                    Direction::Right => "right",
                };
                Err(PuzzleError::IllegalMove(format!(
                    "Cannot move {} from {} edge",
                    dir.to_string().to_lowercase(),
                    edge
                )))
            }
        }
    }

    pub fn legal_moves(&self) -> Vec<Direction> {
        let mut legal_moves: Vec<Direction> = Direction::ALL.to_vec();
        let (row, col) = self.find_blank();

        if row == 0 {
            legal_moves.retain(|&d| d != Direction::Up);
        }
        if row == SIZE - 1 {
            legal_moves.retain(|&d| d != Direction::Down);
        }
        if col == 0 {
            legal_moves.retain(|&d| d != Direction::Left);
        }
        if col == SIZE - 1 {
            legal_moves.retain(|&d| d != Direction::Right);
        }

        legal_moves
    }

    pub fn is_solved(&self) -> bool {
        self.tiles
            .iter()
            .enumerate()
            .all(|(idx, tile)| tile.solved_idx() == idx)
    }

    /// Applies `moves` in order and returns every visited state, starting with
    /// `self` and ending with the final board.
    pub fn replay(&self, moves: &[Direction]) -> Result<Vec<Puzzle>, PuzzleError> {
        let mut states = Vec::with_capacity(moves.len() + 1);
        let mut current = *self;
        states.push(current);

        for &dir in moves {
            current.move_space(dir)?;
            states.push(current);
        }

        Ok(states)
    }

    /// Packs the board into 64 bits, four bits per cell in row-major order.
    pub fn key(&self) -> u64 {
        self.tiles
            .iter()
            .fold(0u64, |key, tile| (key << 4) | tile.raw() as u64)
    }

    pub fn from_key(key: u64) -> Result<Self, PuzzleError> {
        let mut values = [0u64; CELLS];
        let mut rest = key;
        for value in values.iter_mut().rev() {
            *value = rest & 0xF;
            rest >>= 4;
        }
        Self::from_values(&values)
    }

    pub fn serialized(&self) -> String {
        self.tiles
            .iter()
            .map(|t| t.raw().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::solved()
    }
}

impl FromStr for Puzzle {
    type Err = PuzzleError;

    /// Parses whitespace-separated tile numbers in row-major order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() != CELLS {
            return Err(PuzzleError::WrongTileCount {
                expected: CELLS,
                found: tokens.len(),
            });
        }

        let values = tokens
            .iter()
            .map(|token| {
                token
                    .parse::<u64>()
                    .map_err(|_| PuzzleError::InvalidToken(token.to_string()))
            })
            .collect::<Result<Vec<u64>, PuzzleError>>()?;

        Self::from_values(&values)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(SIZE) {
            for tile in row {
                write!(f, "{:>2} ", tile.raw())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Exact distance to the goal for every board within `max_depth` moves of it,
/// keyed by [`Puzzle::key`]. Plain breadth-first search over full boards.
pub fn distances_from_goal(max_depth: u32) -> FxHashMap<u64, u32> {
    let goal = Puzzle::solved();
    let mut distances = FxHashMap::default();
    let mut queue = VecDeque::new();

    distances.insert(goal.key(), 0);
    queue.push_back((goal, 0u32));

    while let Some((puzzle, depth)) = queue.pop_front() {
        if depth == max_depth {
            continue;
        }
        for dir in Direction::ALL {
            if let Some(next) = puzzle.apply_move(dir) {
                let key = next.key();
                if !distances.contains_key(&key) {
                    distances.insert(key, depth + 1);
                    queue.push_back((next, depth + 1));
                }
            }
        }
    }

    distances
}

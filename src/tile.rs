use std::fmt;

use crate::puzzle::{CELLS, SIZE};

pub const BLANK: u8 = 0;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Tile {
    raw: u8,
}

impl Tile {
    pub fn new(raw: u8) -> Self {
        Self { raw }
    }

    pub fn blank() -> Self {
        Self { raw: BLANK }
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn is_blank(&self) -> bool {
        self.raw == BLANK
    }

    /// Row-major index of the cell this tile occupies in the solved board.
    /// The blank belongs in the last cell.
    pub fn solved_idx(&self) -> usize {
        if self.is_blank() {
            CELLS - 1
        } else {
            self.raw as usize - 1
        }
    }

    pub fn goal_row(&self) -> usize {
        self.solved_idx() / SIZE
    }

    pub fn goal_col(&self) -> usize {
        self.solved_idx() % SIZE
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            write!(f, " ")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}

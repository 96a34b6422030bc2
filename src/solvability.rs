use crate::puzzle::{Puzzle, SIZE};
use crate::tile::BLANK;

/// Pairs `i < j` with `values[i] > values[j]`, ignoring the blank.
pub fn count_inversions(values: &[u8]) -> usize {
    let tiles: Vec<u8> = values.iter().copied().filter(|&v| v != BLANK).collect();

    let mut inversions = 0;
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            if tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    inversions
}

/// Row of the blank counted from the bottom, 1-indexed.
pub fn blank_row_from_bottom(values: &[u8], width: usize) -> Option<usize> {
    let height = values.len() / width;
    values
        .iter()
        .position(|&v| v == BLANK)
        .map(|idx| height - idx / width)
}

/// Parity test over a flattened `width`-wide board.
///
/// Odd widths are solvable when the inversion count is even. Even widths are
/// solvable when `inversions + blank_row_from_bottom` is odd.
pub fn is_solvable(values: &[u8], width: usize) -> bool {
    let inversions = count_inversions(values);

    if width % 2 == 1 {
        return inversions % 2 == 0;
    }

    match blank_row_from_bottom(values, width) {
        Some(row) => (inversions + row) % 2 == 1,
        None => false,
    }
}

impl Puzzle {
    pub fn is_solvable(&self) -> bool {
        is_solvable(&self.values(), SIZE)
    }
}

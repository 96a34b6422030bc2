pub mod puzzle {
    use colored::Colorize;

    use crate::heuristic::{tile_manhattan_distance, HeuristicError};
    use crate::puzzle::{Puzzle, SIZE};

    /// Admissible (or deliberately near-admissible) lower bound on the number
    /// of moves left to reach the goal.
    pub trait Heuristic {
        fn estimate(&self, puzzle: &Puzzle) -> Result<u32, HeuristicError>;
    }

    pub trait DebugPrintable {
        fn render(&self, manhattan_distance: bool) -> String;

        fn debug_print(&self, manhattan_distance: bool) {
            print!("{}", self.render(manhattan_distance));
        }
    }

    impl DebugPrintable for Puzzle {
        /// Box-drawn grid. With `manhattan_distance` each cell shows how far its
        /// tile is from home instead of the tile number.
        fn render(&self, manhattan_distance: bool) -> String {
            let border = |left: &str, mid: &str, right: &str| {
                let mut line = String::from(left);
                for col in 0..SIZE {
                    line.push_str("────");
                    if col < SIZE - 1 {
                        line.push_str(mid);
                    }
                }
                line.push_str(right);
                line.push('\n');
                line
            };

            let mut out = border("┌", "┬", "┐");

            for row in 0..SIZE {
                out.push('│');
                for col in 0..SIZE {
                    let idx = row * SIZE + col;
                    let tile = self.get(row, col);

                    let cell = if tile.is_blank() {
                        "    ".on_green().to_string()
                    } else if manhattan_distance {
                        format!(" {:>2} ", tile_manhattan_distance(self, idx))
                    } else if tile.solved_idx() == idx {
                        format!(" {:>2} ", tile.raw()).green().to_string()
                    } else {
                        format!(" {:>2} ", tile.raw())
                    };

                    out.push_str(&cell);
                    out.push('│');
                }
                out.push('\n');

                if row < SIZE - 1 {
                    out.push_str(&border("├", "┼", "┤"));
                }
            }

            out.push_str(&border("└", "┴", "┘"));
            out
        }
    }

}

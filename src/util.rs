use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::puzzle::{Direction, Puzzle, PuzzleError};

/// One parsed entry of a puzzle file, keeping its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleLine {
    pub line: usize,
    pub puzzle: Result<Puzzle, PuzzleError>,
}

/// Reads one board per line. Blank lines and `#` comments are skipped;
/// malformed lines are kept as errors so callers can report them in place.
pub fn read_puzzles(path: &Path) -> io::Result<Vec<PuzzleLine>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut result = vec![];

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let puzzle = trimmed.parse::<Puzzle>();
        if let Err(e) = &puzzle {
            warn!("error reading puzzle on line {}: {}", idx + 1, e);
        }
        result.push(PuzzleLine {
            line: idx + 1,
            puzzle,
        });
    }

    Ok(result)
}

/// Board text from command-line tokens, or a single line of `input` when no
/// tokens were given.
pub fn read_input<R: BufRead>(args: &[String], mut input: R) -> io::Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

/// Space-separated direction names, e.g. `Up Left Down`.
pub fn move_labels(moves: &[Direction]) -> String {
    moves
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

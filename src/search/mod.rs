//! Optimal search over the board graph.
//!
//! Both strategies are depth-first, keep no visited set, and only refuse to
//! undo the move that produced the current node. The move path is one stack
//! that grows on descent and shrinks on backtrack.

mod ida;
mod rbfs;

use log::info;
use serde::{Deserialize, Serialize};

use crate::heuristic::HeuristicError;
use crate::puzzle::{Direction, Puzzle};
use crate::traits::puzzle::Heuristic;

/// Stands in for an unbounded f value.
pub const INFINITY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Iterative-deepening A*
    #[default]
    IdaStar,
    /// Recursive best-first search
    Rbfs,
}

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Heuristic(#[from] HeuristicError),
    #[error("search space exhausted without reaching the goal ({generated} states generated)")]
    Exhausted { generated: u64 },
    #[error("next bound {bound} exceeds the configured limit {limit}")]
    BoundLimit { bound: u32, limit: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Successor states produced, whether or not they were explored further.
    pub generated: u64,
    /// IDA* passes, or 1 for RBFS.
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Direction>,
    pub stats: SearchStats,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves_str(&self) -> String {
        self.moves.iter().map(|d| d.to_char()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(Solution),
    Unsolvable,
}

/// Per-solve context: the heuristic it borrows, the chosen strategy and the
/// generated-state counter. Independent solvers can run side by side over one
/// shared heuristic.
pub struct Solver<'h, H: Heuristic> {
    heuristic: &'h H,
    strategy: Strategy,
    max_bound: Option<u32>,
    stats: SearchStats,
}

impl<'h, H: Heuristic> Solver<'h, H> {
    pub fn new(heuristic: &'h H, strategy: Strategy) -> Self {
        Self {
            heuristic,
            strategy,
            max_bound: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_max_bound(mut self, max_bound: Option<u32>) -> Self {
        self.max_bound = max_bound;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Counters of the most recent solve.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Rejects unsolvable boards up front, then runs the configured strategy.
    pub fn solve(&mut self, root: &Puzzle) -> Result<Outcome, SearchError> {
        self.stats = SearchStats::default();

        if !root.is_solvable() {
            info!("board {} is not solvable", root.serialized());
            return Ok(Outcome::Unsolvable);
        }

        let moves = match self.strategy {
            Strategy::IdaStar => ida::IdaStar::new(self.heuristic, &mut self.stats, self.max_bound).run(root)?,
            Strategy::Rbfs => rbfs::Rbfs::new(self.heuristic, &mut self.stats, self.max_bound).run(root)?,
        };

        info!(
            "{:?} solved {} in {} moves, {} states generated",
            self.strategy,
            root.serialized(),
            moves.len(),
            self.stats.generated
        );

        Ok(Outcome::Solved(Solution {
            moves,
            stats: self.stats,
        }))
    }
}

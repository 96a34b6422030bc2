use log::debug;

use super::{SearchError, SearchStats, INFINITY};
use crate::puzzle::{Direction, Puzzle};
use crate::traits::puzzle::Heuristic;

enum Step {
    Found,
    /// Smallest f that exceeded the bound anywhere below this node.
    Pruned(u32),
}

pub(super) struct IdaStar<'a, H: Heuristic> {
    heuristic: &'a H,
    stats: &'a mut SearchStats,
    max_bound: Option<u32>,
    path: Vec<Direction>,
}

impl<'a, H: Heuristic> IdaStar<'a, H> {
    pub(super) fn new(heuristic: &'a H, stats: &'a mut SearchStats, max_bound: Option<u32>) -> Self {
        Self {
            heuristic,
            stats,
            max_bound,
            path: Vec::new(),
        }
    }

    pub(super) fn run(mut self, root: &Puzzle) -> Result<Vec<Direction>, SearchError> {
        let mut bound = self.heuristic.estimate(root)?;
        if let Some(limit) = self.max_bound.filter(|&limit| bound > limit) {
            return Err(SearchError::BoundLimit { bound, limit });
        }

        loop {
            self.stats.iterations += 1;
            self.path.reserve(bound as usize);

            match self.search(root, 0, bound, None)? {
                Step::Found => return Ok(self.path),
                Step::Pruned(INFINITY) => {
                    return Err(SearchError::Exhausted {
                        generated: self.stats.generated,
                    })
                }
                Step::Pruned(next) => {
                    debug!("new bound: {} generated states: {}", next, self.stats.generated);
                    if let Some(limit) = self.max_bound {
                        if next > limit {
                            return Err(SearchError::BoundLimit { bound: next, limit });
                        }
                    }
                    bound = next;
                }
            }
        }
    }

    fn search(&mut self, state: &Puzzle, g: u32, bound: u32, prev: Option<Direction>) -> Result<Step, SearchError> {
        let f = g + self.heuristic.estimate(state)?;
        if f > bound {
            return Ok(Step::Pruned(f));
        }
        if state.is_solved() {
            return Ok(Step::Found);
        }

        let mut min = INFINITY;
        for dir in Direction::ALL {
            if prev.is_some_and(|p| dir == p.opposite()) {
                continue;
            }
            let Some(next) = state.apply_move(dir) else {
                continue;
            };
            self.stats.generated += 1;

            self.path.push(dir);
            match self.search(&next, g + 1, bound, Some(dir))? {
                Step::Found => return Ok(Step::Found),
                Step::Pruned(t) => min = min.min(t),
            }
            self.path.pop();
        }

        Ok(Step::Pruned(min))
    }
}

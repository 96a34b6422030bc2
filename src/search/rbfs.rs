use super::{SearchError, SearchStats, INFINITY};
use crate::puzzle::{Direction, Puzzle};
use crate::traits::puzzle::Heuristic;

struct Successor {
    puzzle: Puzzle,
    dir: Direction,
    /// Backed-up f value; only ever grows.
    f: u32,
}

enum Step {
    Found,
    /// Best f found beyond the limit, to be cached on the parent's record.
    Failed(u32),
}

pub(super) struct Rbfs<'a, H: Heuristic> {
    heuristic: &'a H,
    stats: &'a mut SearchStats,
    max_bound: Option<u32>,
    path: Vec<Direction>,
}

impl<'a, H: Heuristic> Rbfs<'a, H> {
    pub(super) fn new(heuristic: &'a H, stats: &'a mut SearchStats, max_bound: Option<u32>) -> Self {
        Self {
            heuristic,
            stats,
            max_bound,
            path: Vec::new(),
        }
    }

    pub(super) fn run(mut self, root: &Puzzle) -> Result<Vec<Direction>, SearchError> {
        self.stats.iterations = 1;
        let root_f = self.heuristic.estimate(root)?;
        let limit = self.max_bound.unwrap_or(INFINITY);

        match self.search(root, 0, root_f, limit, None)? {
            Step::Found => Ok(self.path),
            Step::Failed(f) if f != INFINITY && self.max_bound.is_some() => {
                Err(SearchError::BoundLimit { bound: f, limit })
            }
            Step::Failed(_) => Err(SearchError::Exhausted {
                generated: self.stats.generated,
            }),
        }
    }

    fn search(
        &mut self,
        state: &Puzzle,
        g: u32,
        node_f: u32,
        f_limit: u32,
        prev: Option<Direction>,
    ) -> Result<Step, SearchError> {
        if state.is_solved() {
            return Ok(Step::Found);
        }

        let mut successors: Vec<Successor> = Vec::with_capacity(4);
        for dir in Direction::ALL {
            if prev.is_some_and(|p| dir == p.opposite()) {
                continue;
            }
            let Some(puzzle) = state.apply_move(dir) else {
                continue;
            };
            self.stats.generated += 1;

            let f = (g + 1 + self.heuristic.estimate(&puzzle)?).max(node_f);
            successors.push(Successor { puzzle, dir, f });
        }

        if successors.is_empty() {
            return Ok(Step::Failed(INFINITY));
        }

        loop {
            // First minimum keeps ties in expansion order.
            let mut best = 0;
            for (idx, successor) in successors.iter().enumerate() {
                if successor.f < successors[best].f {
                    best = idx;
                }
            }

            let best_f = successors[best].f;
            if best_f > f_limit {
                return Ok(Step::Failed(best_f));
            }

            let alternative = successors
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != best)
                .map(|(_, s)| s.f)
                .min()
                .unwrap_or(INFINITY);

            let (puzzle, dir) = (successors[best].puzzle, successors[best].dir);
            self.path.push(dir);
            match self.search(&puzzle, g + 1, best_f, f_limit.min(alternative), Some(dir))? {
                Step::Found => return Ok(Step::Found),
                Step::Failed(f) => {
                    successors[best].f = f;
                    self.path.pop();
                }
            }
        }
    }
}

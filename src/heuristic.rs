//! Heuristic evaluator.
//!
//! Four independent lower-bound components, combined according to a
//! [`HeuristicConfig`]:
//!
//! * Manhattan distance, optionally scaled down by a truncating divisor.
//! * Linear conflict: 2 per reversed pair of tiles sharing their goal row, and
//!   likewise for columns.
//! * Walking distance: pattern-database distance of the horizontal profile plus
//!   that of the vertical (transposed) profile.
//! * Corner conflict: 2 per corner-bound tile pinned against an edge, scaled
//!   down by a truncating divisor.

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{error, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::MissingDbPolicy;
use crate::pattern_db::{Axis, PatternDb, PatternDbError, RowProfile};
use crate::puzzle::{Puzzle, CELLS, SIZE};
use crate::traits::puzzle::Heuristic;

/// Tiles checked by the corner-conflict term.
pub const CORNER_TILES: [u8; 4] = [1, 4, 13, 15];

#[derive(thiserror::Error, Debug)]
pub enum HeuristicError {
    #[error("pattern database unavailable: {0}")]
    Unavailable(Arc<PatternDbError>),
    #[error("walking distance lookup failed: {0}")]
    Lookup(#[from] PatternDbError),
    #[error("walking distance is enabled but no pattern database was supplied")]
    TableNotLoaded,
}

pub fn tile_manhattan_distance(puzzle: &Puzzle, idx: usize) -> u32 {
    let tile = puzzle.tiles()[idx];
    if tile.is_blank() {
        return 0;
    }
    let (row, col) = (idx / SIZE, idx % SIZE);
    (row.abs_diff(tile.goal_row()) + col.abs_diff(tile.goal_col())) as u32
}

pub fn manhattan_distance(puzzle: &Puzzle) -> u32 {
    (0..CELLS).map(|idx| tile_manhattan_distance(puzzle, idx)).sum()
}

pub fn linear_conflict(puzzle: &Puzzle) -> u32 {
    let mut conflict = 0;

    for line in 0..SIZE {
        for j in 0..SIZE {
            let tile = puzzle.get(line, j);
            if !tile.is_blank() && tile.goal_row() == line {
                for k in (j + 1)..SIZE {
                    let other = puzzle.get(line, k);
                    if !other.is_blank() && other.goal_row() == line && tile.raw() > other.raw() {
                        conflict += 2;
                    }
                }
            }

            let tile = puzzle.get(j, line);
            if !tile.is_blank() && tile.goal_col() == line {
                for k in (j + 1)..SIZE {
                    let other = puzzle.get(k, line);
                    if !other.is_blank() && other.goal_col() == line && tile.raw() > other.raw() {
                        conflict += 2;
                    }
                }
            }
        }
    }

    conflict
}

/// A corner tile away from home that sits on an edge with an occupied cell
/// directly inward of it costs 2.
pub fn corner_conflict(puzzle: &Puzzle) -> u32 {
    let last = SIZE - 1;
    let occupied = |row: usize, col: usize| !puzzle.get(row, col).is_blank();

    let mut conflict = 0;
    for (idx, tile) in puzzle.tiles().iter().enumerate() {
        if !CORNER_TILES.contains(&tile.raw()) || tile.solved_idx() == idx {
            continue;
        }
        let (i, j) = (idx / SIZE, idx % SIZE);
        let pinned = (i == 0 && occupied(i + 1, j))
            || (j == 0 && occupied(i, j + 1))
            || (i == last && occupied(i - 1, j))
            || (j == last && occupied(i, j - 1));
        if pinned {
            conflict += 2;
        }
    }
    conflict
}

pub fn walking_distance(puzzle: &Puzzle, table: &PatternDb) -> Result<u32, PatternDbError> {
    let horizontal = table.distance(&RowProfile::of(puzzle, Axis::Horizontal))?;
    let vertical = table.distance(&RowProfile::of(puzzle, Axis::Vertical))?;
    Ok(horizontal + vertical)
}

/// Which components are summed, and how the scaled ones are divided.
/// Divisions truncate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub manhattan_divisor: Option<NonZeroU32>,
    pub linear_conflict: bool,
    pub walking_distance: bool,
    pub corner_conflict_divisor: Option<NonZeroU32>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

impl HeuristicConfig {
    /// Same configuration with walking distance removed. Manhattan distance
    /// goes back to full weight since nothing else covers it any more.
    pub fn without_walking_distance(self) -> Self {
        Self {
            manhattan_divisor: NonZeroU32::new(1),
            linear_conflict: true,
            walking_distance: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// wd
    #[default]
    WalkingDistance,
    /// md/3 + lc + wd
    Hybrid,
    /// md/3 + lc + wd + cc/2
    HybridCorner,
    /// md + lc
    ManhattanLinear,
    /// md
    Manhattan,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::WalkingDistance,
        Preset::Hybrid,
        Preset::HybridCorner,
        Preset::ManhattanLinear,
        Preset::Manhattan,
    ];

    pub fn config(&self) -> HeuristicConfig {
        let none = HeuristicConfig {
            manhattan_divisor: None,
            linear_conflict: false,
            walking_distance: false,
            corner_conflict_divisor: None,
        };
        match self {
            Preset::WalkingDistance => HeuristicConfig {
                walking_distance: true,
                ..none
            },
            Preset::Hybrid => HeuristicConfig {
                manhattan_divisor: NonZeroU32::new(3),
                linear_conflict: true,
                walking_distance: true,
                ..none
            },
            Preset::HybridCorner => HeuristicConfig {
                corner_conflict_divisor: NonZeroU32::new(2),
                ..Preset::Hybrid.config()
            },
            Preset::ManhattanLinear => HeuristicConfig {
                manhattan_divisor: NonZeroU32::new(1),
                linear_conflict: true,
                ..none
            },
            Preset::Manhattan => HeuristicConfig {
                manhattan_divisor: NonZeroU32::new(1),
                ..none
            },
        }
    }
}

/// Every component's raw value alongside the configured total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Breakdown {
    pub manhattan: u32,
    pub linear_conflict: u32,
    pub walking_distance: Option<u32>,
    pub corner_conflict: u32,
    pub total: u32,
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Manhattan: {}, Linear Conflict: {}, ", self.manhattan, self.linear_conflict)?;
        match self.walking_distance {
            Some(wd) => write!(f, "Walking Distance: {}, ", wd)?,
            None => write!(f, "Walking Distance: n/a, ")?,
        }
        write!(f, "Corner Conflict: {}, Total: {}", self.corner_conflict, self.total)
    }
}

/// A configuration bound to an already-loaded table.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    config: HeuristicConfig,
    table: Option<&'a PatternDb>,
}

impl<'a> Estimator<'a> {
    pub fn new(config: HeuristicConfig, table: Option<&'a PatternDb>) -> Self {
        Self { config, table }
    }

    pub fn config(&self) -> HeuristicConfig {
        self.config
    }

    fn walking_distance(&self, puzzle: &Puzzle) -> Result<u32, HeuristicError> {
        let table = self.table.ok_or(HeuristicError::TableNotLoaded)?;
        walking_distance(puzzle, table).map_err(|e| {
            error!("pattern database is incomplete: {} (board {})", e, puzzle.serialized());
            HeuristicError::from(e)
        })
    }

    pub fn breakdown(&self, puzzle: &Puzzle) -> Result<Breakdown, HeuristicError> {
        let walking_distance = match self.table {
            Some(_) => Some(self.walking_distance(puzzle)?),
            None => None,
        };

        Ok(Breakdown {
            manhattan: manhattan_distance(puzzle),
            linear_conflict: linear_conflict(puzzle),
            walking_distance,
            corner_conflict: corner_conflict(puzzle),
            total: self.estimate(puzzle)?,
        })
    }
}

impl Heuristic for Estimator<'_> {
    fn estimate(&self, puzzle: &Puzzle) -> Result<u32, HeuristicError> {
        let mut total = 0;

        if let Some(divisor) = self.config.manhattan_divisor {
            total += manhattan_distance(puzzle) / divisor;
        }
        if self.config.linear_conflict {
            total += linear_conflict(puzzle);
        }
        if self.config.walking_distance {
            total += self.walking_distance(puzzle)?;
        }
        if let Some(divisor) = self.config.corner_conflict_divisor {
            total += corner_conflict(puzzle) / divisor;
        }

        Ok(total)
    }
}

/// Owns the heuristic configuration and the walking-distance table. The table
/// is read from disk the first time an estimator is requested and shared
/// read-only after that, including across threads.
#[derive(Debug)]
pub struct Evaluator {
    config: HeuristicConfig,
    db_path: PathBuf,
    policy: MissingDbPolicy,
    table: OnceLock<Result<Arc<PatternDb>, Arc<PatternDbError>>>,
}

impl Evaluator {
    pub fn new(config: HeuristicConfig, db_path: impl AsRef<Path>, policy: MissingDbPolicy) -> Self {
        Self {
            config,
            db_path: db_path.as_ref().to_path_buf(),
            policy,
            table: OnceLock::new(),
        }
    }

    /// Evaluator over a table that is already in memory.
    pub fn with_table(config: HeuristicConfig, table: Arc<PatternDb>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(table));
        Self {
            config,
            db_path: PathBuf::new(),
            policy: MissingDbPolicy::Abort,
            table: cell,
        }
    }

    pub fn config(&self) -> HeuristicConfig {
        self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn table(&self) -> &Result<Arc<PatternDb>, Arc<PatternDbError>> {
        self.table.get_or_init(|| {
            let loaded = PatternDb::load(&self.db_path);
            if let Err(e) = &loaded {
                if self.policy == MissingDbPolicy::Fallback {
                    warn!("{}; continuing without walking distance (manhattan + linear conflict)", e);
                }
            }
            loaded.map(Arc::new).map_err(Arc::new)
        })
    }

    pub fn estimator(&self) -> Result<Estimator<'_>, HeuristicError> {
        if !self.config.walking_distance {
            return Ok(Estimator::new(self.config, None));
        }

        match self.table() {
            Ok(table) => Ok(Estimator::new(self.config, Some(table.as_ref()))),
            Err(e) => match self.policy {
                MissingDbPolicy::Abort => Err(HeuristicError::Unavailable(Arc::clone(e))),
                MissingDbPolicy::Fallback => {
                    Ok(Estimator::new(self.config.without_walking_distance(), None))
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub puzzle: Puzzle,
    pub exact: u32,
    pub estimate: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AdmissibilityReport {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl AdmissibilityReport {
    pub fn is_admissible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Compares `heuristic` against exact distances keyed by [`Puzzle::key`], as
/// produced by [`crate::puzzle::distances_from_goal`]. Violations come back
/// ordered by exact distance.
pub fn check_admissibility<H: Heuristic>(
    heuristic: &H,
    exact: &FxHashMap<u64, u32>,
) -> Result<AdmissibilityReport, HeuristicError> {
    let mut report = AdmissibilityReport::default();

    for (&key, &distance) in exact {
        let Ok(puzzle) = Puzzle::from_key(key) else {
            continue;
        };
        report.checked += 1;

        let estimate = heuristic.estimate(&puzzle)?;
        if estimate > distance {
            report.violations.push(Violation {
                puzzle,
                exact: distance,
                estimate,
            });
        }
    }

    report
        .violations
        .sort_by_key(|v| (v.exact, v.estimate, v.puzzle.key()));
    Ok(report)
}

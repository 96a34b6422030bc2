//! Walking-distance pattern database.
//!
//! A [`RowProfile`] forgets which tile is where and keeps only how many tiles of
//! each goal line sit in each row. One move of the real puzzle moves at most
//! one tile between two adjacent rows, so the breadth-first distance between
//! profiles lower-bounds the number of vertical moves still needed. Running the
//! same table on the transposed board bounds the horizontal moves.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::puzzle::{Puzzle, SIZE};
use crate::tile::Tile;

pub const DEFAULT_PATH: &str = "matrix_states.json";

/// Number of profiles reachable from the goal profile on a 4x4 board.
pub const TABLE_SIZE: usize = 24964;

#[derive(thiserror::Error, Debug)]
pub enum PatternDbError {
    #[error("failed to read pattern database {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write pattern database {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("pattern database {} is not a complete JSON object: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed row-profile key '{0}'")]
    MalformedKey(String),
    #[error("pattern database {} does not map the goal profile to 0", .path.display())]
    MissingGoal { path: PathBuf },
    #[error("row profile {0} is not in the pattern database")]
    MissingProfile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Line of the board, in this axis, that holds cell `idx`. The vertical
    /// axis reads the board transposed.
    fn line(&self, idx: usize) -> usize {
        match self {
            Axis::Horizontal => idx / SIZE,
            Axis::Vertical => idx % SIZE,
        }
    }

    /// Goal line of a non-blank tile: 1-4 -> 0, 5-8 -> 1, ... horizontally,
    /// and 1,5,9,13 -> 0, 2,6,10,14 -> 1, ... vertically.
    pub fn group(&self, tile: Tile) -> usize {
        match self {
            Axis::Horizontal => tile.goal_row(),
            Axis::Vertical => tile.goal_col(),
        }
    }
}

/// `counts[row][group]` is the number of tiles sitting in `row` whose goal
/// line is `group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowProfile {
    counts: [[u8; SIZE]; SIZE],
}

impl RowProfile {
    pub fn goal() -> Self {
        let mut counts = [[0u8; SIZE]; SIZE];
        for (group, row) in counts.iter_mut().enumerate() {
            row[group] = SIZE as u8;
        }
        counts[SIZE - 1][SIZE - 1] = SIZE as u8 - 1;
        Self { counts }
    }

    pub fn of(puzzle: &Puzzle, axis: Axis) -> Self {
        let mut counts = [[0u8; SIZE]; SIZE];
        for (idx, tile) in puzzle.tiles().iter().enumerate() {
            if tile.is_blank() {
                continue;
            }
            counts[axis.line(idx)][axis.group(*tile)] += 1;
        }
        Self { counts }
    }

    pub fn from_matrix(counts: [[u8; SIZE]; SIZE]) -> Self {
        Self { counts }
    }

    pub fn matrix(&self) -> [[u8; SIZE]; SIZE] {
        self.counts
    }

    pub fn row_sum(&self, row: usize) -> usize {
        self.counts[row].iter().map(|&c| c as usize).sum()
    }

    /// Flattened row-major counts joined with commas, e.g. `4,0,0,0,0,4,...`.
    pub fn to_key(&self) -> String {
        self.counts
            .iter()
            .flatten()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn from_key(key: &str) -> Result<Self, PatternDbError> {
        let malformed = || PatternDbError::MalformedKey(key.to_string());

        let parts: Vec<&str> = key.split(',').collect();
        if parts.len() != SIZE * SIZE {
            return Err(malformed());
        }

        let mut counts = [[0u8; SIZE]; SIZE];
        for (idx, part) in parts.iter().enumerate() {
            let count: u8 = part.trim().parse().map_err(|_| malformed())?;
            if count as usize > SIZE {
                return Err(malformed());
            }
            counts[idx / SIZE][idx % SIZE] = count;
        }

        Ok(Self { counts })
    }

    /// Four bits per count; used as the in-memory hash key.
    pub fn packed(&self) -> u64 {
        self.counts
            .iter()
            .flatten()
            .fold(0u64, |acc, &c| (acc << 4) | c as u64)
    }

    fn unpack(mut packed: u64) -> Self {
        let mut counts = [[0u8; SIZE]; SIZE];
        for idx in (0..SIZE * SIZE).rev() {
            counts[idx / SIZE][idx % SIZE] = (packed & 0xF) as u8;
            packed >>= 4;
        }
        Self { counts }
    }

    /// Profiles one unit transfer away. The row holding the blank is the one
    /// short of a full line; a tile of any group may enter it from an adjacent
    /// row, which then becomes the short row.
    pub fn neighbours(&self) -> Vec<RowProfile> {
        let mut neighbours = Vec::new();

        for target in 0..SIZE {
            if self.row_sum(target) != SIZE - 1 {
                continue;
            }

            let sources = [target.checked_sub(1), Some(target + 1).filter(|&r| r < SIZE)];
            for source in sources.into_iter().flatten() {
                for group in 0..SIZE {
                    if self.counts[source][group] == 0 {
                        continue;
                    }
                    let mut next = *self;
                    next.counts[source][group] -= 1;
                    next.counts[target][group] += 1;
                    neighbours.push(next);
                }
            }
        }

        neighbours
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternDb {
    distances: FxHashMap<u64, u32>,
}

impl PatternDb {
    pub fn build() -> Self {
        Self::build_with_progress(None)
    }

    /// Breadth-first search outward from the goal profile. Transitions are
    /// reversible, so distance from the goal equals distance to it.
    pub fn build_with_progress(pb: Option<&ProgressBar>) -> Self {
        let goal = RowProfile::goal();
        let mut distances = FxHashMap::default();
        let mut queue = VecDeque::new();

        distances.insert(goal.packed(), 0);
        queue.push_back((goal, 0u32));

        let mut depth = 0;
        while let Some((profile, distance)) = queue.pop_front() {
            if distance != depth {
                debug!("walking distance layer {} complete, {} profiles so far", depth, distances.len());
                depth = distance;
                if let Some(pb) = pb {
                    pb.set_message(format!("depth {}", depth));
                }
            }

            for next in profile.neighbours() {
                if let Entry::Vacant(entry) = distances.entry(next.packed()) {
                    entry.insert(distance + 1);
                    queue.push_back((next, distance + 1));
                }
            }

            if let Some(pb) = pb {
                pb.inc(1);
            }
        }

        info!("built walking distance table: {} profiles, max depth {}", distances.len(), depth);
        Self { distances }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn get(&self, profile: &RowProfile) -> Option<u32> {
        self.distances.get(&profile.packed()).copied()
    }

    pub fn distance(&self, profile: &RowProfile) -> Result<u32, PatternDbError> {
        self.get(profile)
            .ok_or_else(|| PatternDbError::MissingProfile(profile.to_key()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowProfile, u32)> + '_ {
        self.distances
            .iter()
            .map(|(&packed, &distance)| (RowProfile::unpack(packed), distance))
    }

    /// Writes the table as an indented JSON object, keys sorted.
    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        let entries: BTreeMap<String, u32> = self
            .iter()
            .map(|(profile, distance)| (profile.to_key(), distance))
            .collect();
        serde_json::to_writer_pretty(writer, &entries)
    }

    fn read_json<R: Read>(reader: R, path: &Path) -> Result<Self, PatternDbError> {
        let entries: FxHashMap<String, u32> =
            serde_json::from_reader(reader).map_err(|source| PatternDbError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut distances = FxHashMap::default();
        distances.reserve(entries.len());
        for (key, distance) in entries {
            let profile = RowProfile::from_key(&key)?;
            distances.insert(profile.packed(), distance);
        }

        let db = Self { distances };
        if db.get(&RowProfile::goal()) != Some(0) {
            return Err(PatternDbError::MissingGoal {
                path: path.to_path_buf(),
            });
        }
        Ok(db)
    }

    /// Writes to a sibling temporary file and renames it into place, so an
    /// interrupted save never leaves a truncated table under `path`.
    pub fn save(&self, path: &Path) -> Result<(), PatternDbError> {
        let write_err = |source: io::Error| PatternDbError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)
            .map_err(|e| write_err(io::Error::from(e)))?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        fs::rename(&tmp_path, path).map_err(write_err)?;
        info!("saved {} profiles to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PatternDbError> {
        let file = File::open(path).map_err(|source| PatternDbError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let db = Self::read_json(BufReader::new(file), path)?;
        info!("loaded {} profiles from {}", db.len(), path.display());
        Ok(db)
    }
}

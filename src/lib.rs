pub mod config;
pub mod heuristic;
pub mod pattern_db;
pub mod puzzle;
pub mod search;
pub mod solvability;
pub mod tile;
pub mod traits;
pub mod util;


pub use config::{MissingDbPolicy, SolverConfig};
pub use heuristic::{Estimator, Evaluator, HeuristicConfig, HeuristicError, Preset};
pub use pattern_db::{PatternDb, PatternDbError, RowProfile};
pub use puzzle::{Direction, Puzzle, PuzzleError};
pub use search::{Outcome, SearchError, Solution, Solver, Strategy};
pub use traits::puzzle::{DebugPrintable, Heuristic};

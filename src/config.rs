use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::heuristic::{Evaluator, HeuristicConfig};
use crate::pattern_db::DEFAULT_PATH;
use crate::search::Strategy;

/// What to do when the walking-distance table cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingDbPolicy {
    /// Fail the solve with a configuration error.
    #[default]
    Abort,
    /// Drop the walking-distance term and use full Manhattan distance plus
    /// linear conflict instead.
    Fallback,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    pub heuristic: HeuristicConfig,
    pub pattern_db: PathBuf,
    pub on_missing_db: MissingDbPolicy,
    /// Give up once the IDA* bound (or the RBFS root limit) would exceed this.
    pub max_bound: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            heuristic: HeuristicConfig::default(),
            pattern_db: PathBuf::from(DEFAULT_PATH),
            on_missing_db: MissingDbPolicy::default(),
            max_bound: None,
        }
    }
}

impl SolverConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.heuristic, &self.pattern_db, self.on_missing_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Preset;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: SolverConfig =
            serde_json::from_str(r#"{ "strategy": "rbfs", "on_missing_db": "fallback" }"#).unwrap();

        assert_eq!(config.strategy, Strategy::Rbfs);
        assert_eq!(config.on_missing_db, MissingDbPolicy::Fallback);
        assert_eq!(config.heuristic, Preset::WalkingDistance.config());
        assert_eq!(config.pattern_db, PathBuf::from(DEFAULT_PATH));
        assert_eq!(config.max_bound, None);
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let parsed = serde_json::from_str::<SolverConfig>(r#"{ "heuristic": { "manhattan_divisor": 0 } }"#);
        assert!(parsed.is_err());
    }
}

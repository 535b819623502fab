use std::path::Path;

use anyhow::Context as _;
use blockdrop_engine::Board;
use blockdrop_evaluator::{placement_search::SearchConfig, weights::HeuristicWeights};
use serde::{Deserialize, Serialize};

use crate::util;

/// Settings for a game: board size, evaluator weights and search options.
///
/// Every field is optional in JSON; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub weights: HeuristicWeights,
    pub search: SearchConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: Board::DEFAULT_ROWS,
            columns: Board::DEFAULT_COLUMNS,
            weights: HeuristicWeights::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board needs at least {min} rows, got {rows}")]
    TooFewRows { rows: usize, min: usize },
    #[display("board needs at least {min} columns, got {columns}")]
    TooFewColumns { columns: usize, min: usize },
    #[display("board allows at most {max} rows, got {rows}")]
    TooManyRows { rows: usize, max: usize },
    #[display("board allows at most {max} columns, got {columns}")]
    TooManyColumns { columns: usize, max: usize },
    #[display("search.max_candidates must be at least 1")]
    NoCandidateBudget,
}

impl GameConfig {
    pub const MIN_ROWS: usize = 4;
    pub const MIN_COLUMNS: usize = 4;
    pub const MAX_ROWS: usize = 1000;
    pub const MAX_COLUMNS: usize = 1000;

    /// Reads a config file, or returns the default config when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config: Self = util::read_json_file("config", path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < Self::MIN_ROWS {
            return Err(ConfigError::TooFewRows {
                rows: self.rows,
                min: Self::MIN_ROWS,
            });
        }
        if self.columns < Self::MIN_COLUMNS {
            return Err(ConfigError::TooFewColumns {
                columns: self.columns,
                min: Self::MIN_COLUMNS,
            });
        }
        if self.rows > Self::MAX_ROWS {
            return Err(ConfigError::TooManyRows {
                rows: self.rows,
                max: Self::MAX_ROWS,
            });
        }
        if self.columns > Self::MAX_COLUMNS {
            return Err(ConfigError::TooManyColumns {
                columns: self.columns,
                max: Self::MAX_COLUMNS,
            });
        }
        if self.search.max_candidates == 0 {
            return Err(ConfigError::NoCandidateBudget);
        }
        Ok(())
    }
}

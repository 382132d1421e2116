//! Wordhunt configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use wordhunt_engine::{GridLimits, ScoreRules};

/// Environment variable that overrides `db_path`.
pub const DB_PATH_ENV: &str = "WORDHUNT_DB";

/// Application configuration.
///
/// ```toml
/// db_path = "wordhunt.db"
///
/// [scoring]
/// points_per_word = 100
/// time_bonus_seconds = 300
/// time_bonus_multiplier = 2
///
/// [grid]
/// min_side = 5
/// max_side = 20
/// default_side = 12
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct WordhuntConfig {
    /// SQLite file holding attempt records.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Score formula constants.
    #[serde(default)]
    scoring: ScoreRules,

    /// Allowed board sizes for authoring.
    #[serde(default)]
    grid: GridLimits,
}

#[instrument]
fn default_db_path() -> String {
    "wordhunt.db".to_string()
}

impl Default for WordhuntConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scoring: ScoreRules::default(),
            grid: GridLimits::default(),
        }
    }
}

impl WordhuntConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content), fields(len = content.len()))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the given file, or defaults when there is none, then applies
    /// the `WORDHUNT_DB` override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(db_path) = std::env::var(DB_PATH_ENV)
            && !db_path.trim().is_empty()
        {
            debug!(%db_path, "Database path overridden from environment");
            config.db_path = db_path;
        }
        Ok(config)
    }

    /// Replaces the database path.
    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if *grid.min_side() == 0 {
            return Err(ConfigError::new("grid.min_side must be at least 1"));
        }
        if grid.min_side() > grid.max_side() {
            return Err(ConfigError::new(format!(
                "grid.min_side ({}) exceeds grid.max_side ({})",
                grid.min_side(),
                grid.max_side()
            )));
        }
        if !(*grid.min_side()..=*grid.max_side()).contains(grid.default_side()) {
            return Err(ConfigError::new(format!(
                "grid.default_side ({}) is outside {}..={}",
                grid.default_side(),
                grid.min_side(),
                grid.max_side()
            )));
        }
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::new("db_path is empty"));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

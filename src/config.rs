//! Configuration management for interval collapsing
//!
//! Configuration is an explicit, immutable value handed to the pipeline entry
//! point. It can be built in code, loaded from a TOML file, and overridden from
//! environment variables:
//!
//! ```toml
//! [collapse]
//! groups = ["patient_id", "ward"]
//! max_gap = 1
//! dimension = "date"
//!
//! [parallel]
//! enabled = true
//! parallel_threshold = 10000
//!
//! [logging]
//! log_level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Dimension;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Merge settings
    #[serde(default)]
    pub collapse: CollapseConfig,

    /// Group-parallel execution
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Merge settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollapseConfig {
    /// Grouping fields, in key order. Empty means one group for everything.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Gap tolerance in the dimension's unit. A distance of exactly
    /// `max_gap` still merges; negative values demand overlap.
    #[serde(default)]
    pub max_gap: i64,

    /// Time granularity; also fixes the unit of `max_gap`
    #[serde(default)]
    pub dimension: Dimension,

    /// Row field holding the interval start
    #[serde(default = "default_start_field")]
    pub start_field: String,

    /// Row field holding the interval end
    #[serde(default = "default_end_field")]
    pub end_field: String,
}

/// Group-parallel execution settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParallelConfig {
    /// Allow per-group work on the rayon pool
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum number of input records before going parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Minimum number of groups before going parallel
    #[serde(default = "default_min_groups")]
    pub min_groups: usize,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_start_field() -> String { "start".to_string() }
fn default_end_field() -> String { "end".to_string() }
fn default_parallel_threshold() -> usize { 10_000 }
fn default_min_groups() -> usize { 2 }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            max_gap: 0,
            dimension: Dimension::default(),
            start_field: default_start_field(),
            end_field: default_end_field(),
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            parallel_threshold: default_parallel_threshold(),
            min_groups: default_min_groups(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl CollapseConfig {
    /// Set grouping fields
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set gap tolerance
    pub fn with_max_gap(mut self, max_gap: i64) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Set time granularity
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the names of the range fields
    pub fn with_range_fields(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_field = start.into();
        self.end_field = end.into();
        self
    }

    /// Validate field names
    ///
    /// The dimension needs no check here: an unsupported value is already
    /// rejected when it is parsed.
    pub fn validate(&self) -> Result<()> {
        if self.start_field.is_empty() || self.end_field.is_empty() {
            return Err(Error::configuration("range field names cannot be empty"));
        }
        if self.start_field == self.end_field {
            return Err(Error::configuration(format!(
                "start and end field cannot both be '{}'",
                self.start_field
            )));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.is_empty() {
                return Err(Error::configuration("group field names cannot be empty"));
            }
            if *group == self.start_field || *group == self.end_field {
                return Err(Error::configuration(format!(
                    "'{}' cannot be both a group field and a range field",
                    group
                )));
            }
            if !seen.insert(group.as_str()) {
                return Err(Error::configuration(format!(
                    "group field '{}' listed more than once",
                    group
                )));
            }
        }

        Ok(())
    }
}

impl ParallelConfig {
    /// Run everything on the calling thread
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set threshold below which to run sequentially
    pub fn with_threshold(mut self, records: usize) -> Self {
        self.parallel_threshold = records;
        self
    }

    /// Whether a run of this shape should fan out across groups
    pub fn should_parallelize(&self, records: usize, groups: usize) -> bool {
        self.enabled && records >= self.parallel_threshold && groups >= self.min_groups.max(2)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&contents).map_err(|e| match e {
            Error::Configuration(msg) => Error::configuration(format!(
                "failed to parse config file {}: {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Unparsable values are errors: a silently ignored dimension or gap
    /// would change which intervals merge.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(groups) = std::env::var("COLLAPSE_GROUPS") {
            self.collapse.groups = groups
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(max_gap) = std::env::var("COLLAPSE_MAX_GAP") {
            self.collapse.max_gap = max_gap.trim().parse().map_err(|_| {
                Error::configuration(format!("COLLAPSE_MAX_GAP is not an integer: '{}'", max_gap))
            })?;
        }
        if let Ok(dimension) = std::env::var("COLLAPSE_DIMENSION") {
            self.collapse.dimension = dimension.parse()?;
        }
        if let Ok(start) = std::env::var("COLLAPSE_START_FIELD") {
            self.collapse.start_field = start;
        }
        if let Ok(end) = std::env::var("COLLAPSE_END_FIELD") {
            self.collapse.end_field = end;
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            self.logging.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.collapse.validate()?;

        if self.logging.log_level.trim().is_empty() {
            return Err(Error::configuration("log level cannot be empty"));
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, contents).map_err(|e| {
            Error::configuration(format!("failed to write config file {}: {}", path.display(), e))
        })
    }
}

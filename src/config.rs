//! Analysis configuration.
//!
//! [AnalysisConfig] is an explicit value handed to every analysis call.
//! It can be built in code, or read from TOML:
//!
//! ```toml
//! purity_threshold = 0.85
//! min_sample_count = 5
//! level = "family"
//! ```
//!
//! Missing keys fall back to the defaults above.

use crate::classification::ClassificationLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default minimum purity for a node to count as pure
pub const DEFAULT_PURITY_THRESHOLD: f64 = 0.85;

/// Default minimum number of labeled leaves for a node to count as pure
pub const DEFAULT_MIN_SAMPLE_COUNT: usize = 5;

// =#========================================================================#=
// CONFIG ERROR
// =#========================================================================#=
/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("level must be either \"order\" or \"family\", got {0:?}")]
    InvalidLevel(String),

    #[error("purity threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("minimum sample count must be positive")]
    InvalidMinSampleCount,

    #[error("config asks for level {config}, but the classification table holds {table} labels")]
    LevelMismatch {
        config: ClassificationLevel,
        table: ClassificationLevel,
    },

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// =#========================================================================#=
// ANALYSIS CONFIG
// =#========================================================================#=
/// Thresholds of the purity analysis and the classification level used as
/// ground truth.
///
/// # Example
/// ```
/// use cladecheck::classification::ClassificationLevel;
/// use cladecheck::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default()
///     .with_purity_threshold(0.9)
///     .with_level(ClassificationLevel::Order);
/// assert_eq!(config.min_sample_count, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Minimum purity (in `[0, 1]`) for a node to be pure
    pub purity_threshold: f64,
    /// Minimum number of leaves with known label for a node to be pure
    pub min_sample_count: usize,
    /// Taxonomic level used as ground truth
    pub level: ClassificationLevel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            purity_threshold: DEFAULT_PURITY_THRESHOLD,
            min_sample_count: DEFAULT_MIN_SAMPLE_COUNT,
            level: ClassificationLevel::default(),
        }
    }
}

impl AnalysisConfig {
    /// Sets the purity threshold.
    pub fn with_purity_threshold(mut self, purity_threshold: f64) -> Self {
        self.purity_threshold = purity_threshold;
        self
    }

    /// Sets the minimum sample count.
    pub fn with_min_sample_count(mut self, min_sample_count: usize) -> Self {
        self.min_sample_count = min_sample_count;
        self
    }

    /// Sets the classification level.
    pub fn with_level(mut self, level: ClassificationLevel) -> Self {
        self.level = level;
        self
    }

    /// Checks that the threshold lies in `[0, 1]` and the sample count is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.purity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.purity_threshold));
        }
        if self.min_sample_count == 0 {
            return Err(ConfigError::InvalidMinSampleCount);
        }
        Ok(())
    }

    /// Parses and validates a config from a TOML string.
    ///
    /// # Example
    /// ```
    /// use cladecheck::classification::ClassificationLevel;
    /// use cladecheck::config::AnalysisConfig;
    ///
    /// let config = AnalysisConfig::from_toml_str("level = \"order\"").unwrap();
    /// assert_eq!(config.level, ClassificationLevel::Order);
    /// assert_eq!(config.purity_threshold, 0.85);
    ///
    /// assert!(AnalysisConfig::from_toml_str("level = \"genus\"").is_err());
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

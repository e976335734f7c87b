//! Configuration of the Liapunov function.
//!
//! The Liapunov value of a profile is the sum of squared positive gains
//! from deviating, plus penalty terms that keep minimizers inside the
//! simplex. The penalty weights are configurable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Penalty weights used by `liap_value`.
///
/// # Example
/// ```
/// use finite_games::LiapConfig;
///
/// let config = LiapConfig::default().with_sum_penalty(10.0);
/// assert_eq!(config.negative_penalty, 100.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiapConfig {
    /// Weight of `p²` for every probability `p < 0`.
    pub negative_penalty: f64,

    /// Weight of `(s - 1)²` where `s` is the sum of one player's (or one
    /// infoset's) probabilities.
    pub sum_penalty: f64,
}

impl Default for LiapConfig {
    fn default() -> Self {
        Self {
            negative_penalty: 100.0,
            sum_penalty: 100.0,
        }
    }
}

impl LiapConfig {
    /// Create a new LiapConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the deviation term, no penalties.
    ///
    /// Useful when profiles are known to be normalized.
    pub fn unpenalized() -> Self {
        Self {
            negative_penalty: 0.0,
            sum_penalty: 0.0,
        }
    }

    /// Builder method: set the negative probability penalty.
    pub fn with_negative_penalty(mut self, weight: f64) -> Self {
        self.negative_penalty = weight;
        self
    }

    /// Builder method: set the sum penalty.
    pub fn with_sum_penalty(mut self, weight: f64) -> Self {
        self.sum_penalty = weight;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.negative_penalty.is_finite() || self.negative_penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty("negative", self.negative_penalty));
        }
        if !self.sum_penalty.is_finite() || self.sum_penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty("sum", self.sum_penalty));
        }
        Ok(())
    }
}

/// Errors that can occur when validating a Liapunov configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A penalty weight is negative or not finite.
    InvalidPenalty(&'static str, f64),
    /// The configuration file could not be read.
    IoError(String),
    /// The configuration text is not valid JSON for this type.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPenalty(name, val) => {
                write!(f, "{} penalty {} must be finite and non-negative", name, val)
            }
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

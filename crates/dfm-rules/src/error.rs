//! Error types for configuration and rule evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating an analysis configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration values are inconsistent or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`AnalysisConfig`](crate::AnalysisConfig).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Error returned by a rule that cannot complete its evaluation.
///
/// The engine converts it into a `rule_failure` finding; it never aborts a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// A parameter the rule depends on is missing from the context.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Evaluation failed for another reason.
    #[error("{0}")]
    Failed(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

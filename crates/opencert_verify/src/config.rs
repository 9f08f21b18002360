//! Verifier configuration.

use crate::report::CERTIFICATE_ERROR;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Deadline for each external call in milliseconds (0 = no deadline)
    pub call_timeout_ms: u64,
    /// Query all stores at once instead of one after another
    pub concurrent_store_queries: bool,
    /// Category label on analytics records
    pub analytics_category: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 30_000,
            concurrent_store_queries: true,
            analytics_category: CERTIFICATE_ERROR.to_string(),
        }
    }
}

impl VerifierConfig {
    /// Per-call deadline, if any
    #[must_use]
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_ms > 0).then(|| Duration::from_millis(self.call_timeout_ms))
    }

    /// Set the per-call deadline
    #[must_use]
    pub fn with_call_timeout_ms(mut self, call_timeout_ms: u64) -> Self {
        self.call_timeout_ms = call_timeout_ms;
        self
    }

    /// Choose concurrent or sequential store queries
    #[must_use]
    pub fn with_concurrent_store_queries(mut self, concurrent: bool) -> Self {
        self.concurrent_store_queries = concurrent;
        self
    }

    /// Check field constraints
    ///
    /// # Errors
    ///
    /// Returns error if a field is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analytics_category.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "analytics_category".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or fails validation
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read_file(path.as_ref())?)
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Configuration and fixture loading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// OS error message
        message: String,
    },

    /// Malformed JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// A field failed validation
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

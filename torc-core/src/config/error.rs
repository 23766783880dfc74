//! Error types for configuration handling

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or resolving a cluster configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or does not match the schema
    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The input contained no YAML document at all
    #[error("Config document is empty")]
    EmptyDocument,

    /// Placeholders that no variable could satisfy
    #[error("Unresolved variables: {}", .0.join(", "))]
    UnresolvedVariables(Vec<String>),

    /// A `host:port` endpoint could not be parsed
    #[error("Invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

impl ConfigError {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

//! Error types for user config loading.

use thiserror::Error;

/// Errors returned while loading user config documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The document parsed but is not usable as overrides.
    #[error("invalid config: {0}")]
    Invalid(String),
}

//! Error type for the facade.

use keystone_rs_config::ConfigError;
use keystone_rs_core::{ResolveError, SchemaError};
use thiserror::Error;

/// Errors returned by [`crate::Keystone`].
#[derive(Debug, Error)]
pub enum KeystoneError {
    /// A declarative contributor could not be turned into a schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A user config layer failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The resolution pass failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

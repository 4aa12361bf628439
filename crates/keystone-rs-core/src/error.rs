//! Error types for schema construction and resolution passes.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a resolution pass or by a resolver's `get` call.
///
/// Failures are memoized alongside successful values, so every waiter on a
/// failed path receives a clone of the same error.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A `get` call or walker reference targets a path absent from the schema.
    #[error("unknown config path: {path}")]
    UnknownPath { path: String },
    /// Resolving a path ended up waiting on itself.
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency {
        /// Ordered loop of paths; the first path is repeated at the end.
        cycle: Vec<String>,
    },
    /// A resolver returned an error of its own.
    #[error("resolver for {path} failed: {source}")]
    Resolver {
        path: String,
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },
    /// A path string could not be parsed.
    #[error("invalid config path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

impl ResolveError {
    /// Convert an error produced by the resolver at `path`.
    ///
    /// Errors that already are a `ResolveError` (typically a failed `get`
    /// propagated with `?`) pass through unchanged.
    pub(crate) fn from_resolver(path: &str, err: anyhow::Error) -> Self {
        match err.downcast::<ResolveError>() {
            Ok(inner) => inner,
            Err(other) => {
                let boxed: Box<dyn StdError + Send + Sync> = other.into();
                ResolveError::Resolver {
                    path: path.to_string(),
                    source: Arc::from(boxed),
                }
            }
        }
    }

    /// Whether this error reports a dependency cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolveError::CircularDependency { .. })
    }

    /// The ordered cycle of paths, when this error reports one.
    pub fn cycle(&self) -> Option<&[String]> {
        match self {
            ResolveError::CircularDependency { cycle } => Some(cycle),
            _ => None,
        }
    }

    /// The path this error is attributed to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ResolveError::UnknownPath { path }
            | ResolveError::Resolver { path, .. }
            | ResolveError::InvalidPath { path, .. } => Some(path),
            ResolveError::CircularDependency { .. } => None,
        }
    }
}

/// Errors returned while building a schema from a declarative value.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema root was not an object.
    #[error("schema root must be an object")]
    InvalidRoot,
    /// `$resolve` named a resolver missing from the registry.
    #[error("unknown resolver {name:?} at {path}")]
    UnknownResolver { path: String, name: String },
    /// An object carried leaf markers next to plain child keys.
    #[error("node at {path} mixes leaf markers with child keys")]
    MixedNode { path: String },
    /// A key or marker value cannot be used in the schema.
    #[error("invalid schema key {key:?} at {path}: {reason}")]
    InvalidKey {
        path: String,
        key: String,
        reason: String,
    },
}

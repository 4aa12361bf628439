//! Dot-separated addresses into the schema tree.

use crate::error::ResolveError;
use std::fmt;
use std::str::FromStr;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Address of a node in the schema tree, e.g. `vite.vue.isProduction`.
///
/// The empty path addresses the schema root and can only be built with
/// [`ConfigPath::root`]; parsing never yields it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// The path of the schema root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dot-separated path, rejecting empty segments.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        if raw.is_empty() {
            return Err(ResolveError::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for segment in raw.split(PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(ResolveError::InvalidPath {
                    path: raw.to_string(),
                    reason: "path contains an empty segment".to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Return a new path with `key` appended.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for ConfigPath {
    type Err = ResolveError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

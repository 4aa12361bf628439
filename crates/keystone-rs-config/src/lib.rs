//! User override loading for keystone resolution passes.
//!
//! Reads JSON5 documents into the plain object tree a pass consumes, and
//! stacks several of them (defaults file, project file, CLI overrides) into
//! one snapshot.

mod error;
mod loader;

/// Public error type returned by config loading APIs.
pub use error::ConfigError;
/// Single-document and layered loaders.
pub use loader::{ConfigLayer, LayeredUserConfig, UserConfig, UserConfigLayer};

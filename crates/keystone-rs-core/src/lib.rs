//! Lazy configuration resolution engine.
//!
//! A [`Schema`] declares, per dot-separated path, a static default and/or an
//! async resolver. A resolution pass walks the schema against a snapshot of
//! user overrides and resolves every leaf exactly once. Resolvers may read any
//! other path through their [`Getter`]; dependencies are discovered on demand,
//! memoized for the rest of the pass, and loops are reported as
//! [`ResolveError::CircularDependency`].

mod context;
pub mod error;
pub mod path;
pub mod resolver;
pub mod schema;
mod value;
mod walker;

pub use context::{Getter, PathState, ResolutionContext};
pub use error::{ResolveError, SchemaError};
pub use path::ConfigPath;
pub use resolver::{Resolve, Resolver, ResolverRegistry};
pub use schema::{Group, Leaf, Schema, SchemaNode};
pub use walker::{Resolution, ResolveOptions, resolve_config, resolve_config_with};

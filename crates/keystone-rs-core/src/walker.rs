//! Full-tree resolution passes.

use crate::context::ResolutionContext;
use crate::error::ResolveError;
use crate::schema::Schema;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Options for a resolution pass.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Record the order in which leaves finished resolving.
    pub trace_order: bool,
}

impl ResolveOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the completion order in the returned [`Resolution`].
    pub fn with_trace_order(mut self, trace_order: bool) -> Self {
        self.trace_order = trace_order;
        self
    }
}

/// Output of a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Object mirroring the schema with every leaf resolved.
    pub value: Value,
    /// Leaf paths in completion order; empty unless tracing was requested.
    pub order: Vec<String>,
}

impl Resolution {
    /// Consume the resolution, returning the resolved tree.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Resolve every leaf of `schema` against `user` overrides.
pub async fn resolve_config(
    schema: impl Into<Arc<Schema>>,
    user: Value,
) -> Result<Value, ResolveError> {
    resolve_config_with(schema, user, ResolveOptions::default())
        .await
        .map(Resolution::into_value)
}

/// Resolve every leaf of `schema` against `user` overrides with `options`.
///
/// Leaves are demanded concurrently in declaration order; dependencies are
/// pulled in as resolvers ask for them. The first failure abandons the pass
/// and no partial output is returned.
pub async fn resolve_config_with(
    schema: impl Into<Arc<Schema>>,
    user: Value,
    options: ResolveOptions,
) -> Result<Resolution, ResolveError> {
    let ctx = ResolutionContext::new(schema, user);
    let leaves = ctx.schema().leaf_paths().len();
    info!("starting resolution pass (leaves={leaves})");

    let result = ctx.resolve_root().await;
    ctx.release_pending();

    match result {
        Ok(value) => {
            let completed = ctx.completed();
            debug!(
                "resolution pass finished (resolved={}, idle={})",
                completed.len(),
                ctx.is_idle()
            );
            info!("resolution pass complete (leaves={leaves})");
            Ok(Resolution {
                value,
                order: if options.trace_order {
                    completed
                } else {
                    Vec::new()
                },
            })
        }
        Err(err) => {
            warn!("resolution pass failed: {err}");
            Err(err)
        }
    }
}

//! Resolver trait, shared resolver handles, and the named resolver registry.

use crate::context::Getter;
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Computes the final value of a leaf.
///
/// `value` is the user-supplied value at the leaf's path (`None` when absent
/// or `null`). `get` reads other resolved paths. The returned value is final:
/// the engine applies no default afterwards.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Resolve the leaf value.
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> Resolve for F
where
    F: Fn(Option<Value>, Getter) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value> {
        (self)(value, get).await
    }
}

/// Cheaply cloneable handle to a resolver.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<dyn Resolve>,
}

impl Resolver {
    /// Wrap any [`Resolve`] implementation.
    pub fn new(resolver: impl Resolve + 'static) -> Self {
        Self {
            inner: Arc::new(resolver),
        }
    }

    /// Wrap an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<Value>, Getter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::new(f)
    }
}

#[async_trait]
impl Resolve for Resolver {
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value> {
        self.inner.resolve(value, get).await
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// Named resolvers referenced by `$resolve` in declarative schemas.
#[derive(Default, Clone)]
pub struct ResolverRegistry {
    /// Map of resolver name to implementation.
    resolvers: Arc<RwLock<HashMap<String, Resolver>>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, resolver: Resolver) {
        let name = name.into();
        debug!("registering resolver (name={name})");
        self.resolvers.write().insert(name, resolver);
    }

    /// Register an async closure under `name`.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(Option<Value>, Getter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.register(name, Resolver::from_fn(f));
    }

    /// Fetch a resolver by name.
    pub fn get(&self, name: &str) -> Option<Resolver> {
        self.resolvers.read().get(name).cloned()
    }

    /// List all registered resolver names.
    pub fn list(&self) -> Vec<String> {
        self.resolvers.read().keys().cloned().collect()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.list();
        names.sort();
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &names)
            .finish()
    }
}

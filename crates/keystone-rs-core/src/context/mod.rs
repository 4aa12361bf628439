//! Per-pass resolution state and the `get` accessor handed to resolvers.
//!
//! Every leaf path moves through `Unresolved -> InProgress -> Resolved |
//! Failed` at most once per pass. An in-progress leaf is a shared future, so
//! any number of concurrent readers wait on one resolver invocation. Readers
//! that would wait on themselves (directly or through other waiting
//! resolvers) are rejected with a cycle error instead of deadlocking.

mod graph;


use self::graph::WaitGraph;
use crate::error::ResolveError;
use crate::path::ConfigPath;
use crate::resolver::Resolve;
use crate::schema::{Group, Lookup, Schema, SchemaNode};
use crate::value;
use anyhow::Context as _;
use futures_util::future::{BoxFuture, FutureExt, Shared, try_join_all};
use log::debug;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type PendingValue = Shared<BoxFuture<'static, Result<Value, ResolveError>>>;

/// Observable state of a leaf path within a pass.
#[derive(Debug, Clone)]
pub enum PathState {
    /// Nothing has asked for the path yet.
    Unresolved,
    /// The resolver is running.
    InProgress,
    /// Final value for the rest of the pass.
    Resolved(Value),
    /// The resolver failed; the pass is abandoned.
    Failed(ResolveError),
}

enum Slot {
    InProgress(PendingValue),
    Resolved(Value),
    Failed(ResolveError),
}

#[derive(Default)]
struct Table {
    slots: HashMap<String, Slot>,
    waits: WaitGraph,
    completed: Vec<String>,
}

struct PassState {
    schema: Arc<Schema>,
    user: Value,
    table: Mutex<Table>,
}

/// Resolution state for a single pass over a schema and a user snapshot.
///
/// Cloning is cheap and shares the pass. Create a fresh context per pass;
/// nothing is cached across contexts.
#[derive(Clone)]
pub struct ResolutionContext {
    inner: Arc<PassState>,
}

impl ResolutionContext {
    /// Start a pass over `schema` with `user` overrides (read-only).
    pub fn new(schema: impl Into<Arc<Schema>>, user: Value) -> Self {
        Self {
            inner: Arc::new(PassState {
                schema: schema.into(),
                user,
                table: Mutex::new(Table::default()),
            }),
        }
    }

    /// The schema this pass resolves.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// An accessor not owned by any resolver, as used by the walker.
    pub fn getter(&self) -> Getter {
        Getter {
            ctx: self.clone(),
            owner: None,
            own_default: None,
        }
    }

    /// Resolve `path` (leaf, group, or a path inside a leaf value).
    pub async fn get(&self, path: &str) -> Result<Value, ResolveError> {
        self.getter().get(path).await
    }

    /// Current state of a leaf path.
    pub fn state(&self, path: &str) -> PathState {
        match self.inner.table.lock().slots.get(path) {
            None => PathState::Unresolved,
            Some(Slot::InProgress(_)) => PathState::InProgress,
            Some(Slot::Resolved(value)) => PathState::Resolved(value.clone()),
            Some(Slot::Failed(err)) => PathState::Failed(err.clone()),
        }
    }

    /// Leaf paths in the order their resolution completed.
    pub fn completed(&self) -> Vec<String> {
        self.inner.table.lock().completed.clone()
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.inner.table.lock().waits.is_empty()
    }

    /// Drop resolutions still in flight after a pass was abandoned.
    ///
    /// In-flight futures hold the context, so they are detached from the
    /// table before being dropped.
    pub(crate) fn release_pending(&self) {
        let pending: Vec<Slot> = {
            let mut table = self.inner.table.lock();
            let keys: Vec<String> = table
                .slots
                .iter()
                .filter(|(_, slot)| matches!(slot, Slot::InProgress(_)))
                .map(|(key, _)| key.clone())
                .collect();
            keys.iter()
                .filter_map(|key| table.slots.remove(key))
                .collect()
        };
        if !pending.is_empty() {
            debug!("released in-flight resolutions (count={})", pending.len());
        }
    }

    pub(crate) async fn resolve_root(&self) -> Result<Value, ResolveError> {
        self.resolve_group(None, &ConfigPath::root()).await
    }

    async fn get_path(
        &self,
        owner: Option<&str>,
        path: &ConfigPath,
    ) -> Result<Value, ResolveError> {
        match self.inner.schema.lookup(path) {
            Lookup::Leaf(_) => self.await_leaf(owner, path.to_string()).await,
            Lookup::Group(_) => self.resolve_group(owner, path).await,
            Lookup::WithinLeaf { leaf, rest } => {
                let value = self.await_leaf(owner, leaf.to_string()).await?;
                Ok(value::lookup(&value, &rest)
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            Lookup::Missing => Err(ResolveError::UnknownPath {
                path: path.to_string(),
            }),
        }
    }

    async fn resolve_group(
        &self,
        owner: Option<&str>,
        path: &ConfigPath,
    ) -> Result<Value, ResolveError> {
        let leaves = self.inner.schema.leaf_paths_under(path);
        let values = try_join_all(
            leaves
                .iter()
                .map(|leaf| self.await_leaf(owner, leaf.to_string())),
        )
        .await?;
        let mut resolved: HashMap<String, Value> = leaves
            .iter()
            .map(ToString::to_string)
            .zip(values)
            .collect();
        match self.inner.schema.lookup(path) {
            Lookup::Group(group) => Ok(assemble(group, path, &mut resolved)),
            _ => Err(ResolveError::UnknownPath {
                path: path.to_string(),
            }),
        }
    }

    async fn await_leaf(&self, owner: Option<&str>, path: String) -> Result<Value, ResolveError> {
        let pending = {
            let mut table = self.inner.table.lock();
            let in_flight = match table.slots.get(&path) {
                Some(Slot::Resolved(value)) => return Ok(value.clone()),
                Some(Slot::Failed(err)) => return Err(err.clone()),
                Some(Slot::InProgress(pending)) => Some(pending.clone()),
                None => None,
            };
            if let Some(owner) = owner {
                if let Some(cycle) = table.waits.cycle_through(owner, &path) {
                    debug!("dependency cycle detected (cycle={})", cycle.join(" -> "));
                    return Err(ResolveError::CircularDependency { cycle });
                }
                table.waits.add(owner, &path);
            }
            match in_flight {
                Some(pending) => pending,
                None => {
                    debug!("resolving path (path={path})");
                    let pending = self.start(path.clone());
                    table
                        .slots
                        .insert(path.clone(), Slot::InProgress(pending.clone()));
                    pending
                }
            }
        };
        let _edge = owner.map(|owner| WaitEdge {
            ctx: self.clone(),
            from: owner.to_string(),
            to: path,
        });
        pending.await
    }

    fn start(&self, path: String) -> PendingValue {
        let ctx = self.clone();
        async move { ctx.run_leaf(path).await }.boxed().shared()
    }

    async fn run_leaf(self, path: String) -> Result<Value, ResolveError> {
        let result = self.invoke(&path).await;
        let mut table = self.inner.table.lock();
        match &result {
            Ok(value) => {
                debug!("resolved path (path={path})");
                table.slots.insert(path.clone(), Slot::Resolved(value.clone()));
                table.completed.push(path);
            }
            Err(err) => {
                debug!("path failed (path={path}, error={err})");
                table.slots.insert(path, Slot::Failed(err.clone()));
            }
        }
        result
    }

    async fn invoke(&self, path: &str) -> Result<Value, ResolveError> {
        let config_path = ConfigPath::parse(path)?;
        let (default, resolver) = match self.inner.schema.lookup(&config_path) {
            Lookup::Leaf(leaf) => (leaf.default_value().cloned(), leaf.resolver().cloned()),
            _ => {
                return Err(ResolveError::UnknownPath {
                    path: path.to_string(),
                });
            }
        };
        let user_value = value::user_value(&self.inner.user, &config_path);
        let Some(resolver) = resolver else {
            return Ok(user_value.or(default).unwrap_or(Value::Null));
        };
        let getter = Getter {
            ctx: self.clone(),
            owner: Some(path.to_string()),
            own_default: default,
        };
        resolver
            .resolve(user_value, getter)
            .await
            .map_err(|err| ResolveError::from_resolver(path, err))
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.inner.table.lock();
        f.debug_struct("ResolutionContext")
            .field("leaves", &self.inner.schema.leaf_paths().len())
            .field("completed", &table.completed.len())
            .finish()
    }
}

/// Removes a waits-for edge once the wait is over (or abandoned).
struct WaitEdge {
    ctx: ResolutionContext,
    from: String,
    to: String,
}

impl Drop for WaitEdge {
    fn drop(&mut self) {
        self.ctx
            .inner
            .table
            .lock()
            .waits
            .remove(&self.from, &self.to);
    }
}

fn assemble(
    group: &Group,
    prefix: &ConfigPath,
    resolved: &mut HashMap<String, Value>,
) -> Value {
    let mut map = Map::new();
    for (key, node) in group.iter() {
        let path = prefix.child(key);
        let value = match node {
            SchemaNode::Leaf(_) => resolved.remove(&path.to_string()).unwrap_or(Value::Null),
            SchemaNode::Group(child) => assemble(child, &path, resolved),
        };
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

/// Accessor handed to resolvers for reading other paths of the same pass.
///
/// A getter remembers which leaf it belongs to, which is what lets the
/// context tell a genuine wait apart from a dependency cycle.
#[derive(Clone)]
pub struct Getter {
    ctx: ResolutionContext,
    owner: Option<String>,
    own_default: Option<Value>,
}

impl Getter {
    /// Resolve `path` and return its value.
    ///
    /// Leaves resolve on first demand and are memoized. Groups resolve every
    /// leaf beneath them. A path running past a leaf indexes into the leaf's
    /// value and yields `null` when the key is missing there.
    pub async fn get(&self, path: &str) -> Result<Value, ResolveError> {
        let path = ConfigPath::parse(path)?;
        self.ctx.get_path(self.owner.as_deref(), &path).await
    }

    /// Resolve `path` and decode it.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let value = self.get(path).await?;
        serde_json::from_value(value).with_context(|| format!("failed to decode {path}"))
    }

    /// Resolve several paths concurrently, returning values in input order.
    pub async fn get_all<I, S>(&self, paths: I) -> Result<Vec<Value>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<S> = paths.into_iter().collect();
        try_join_all(paths.iter().map(|path| self.get(path.as_ref()))).await
    }

    /// The leaf this getter was handed to; `None` for the walker.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Static default declared on the owning leaf.
    pub fn own_default(&self) -> Option<&Value> {
        self.own_default.as_ref()
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("owner", &self.owner)
            .finish()
    }
}

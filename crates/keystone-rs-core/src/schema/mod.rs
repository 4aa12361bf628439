//! Schema node model: groups of keys ending in leaves.
//!
//! A schema is a tree rooted at a [`Group`]. Every dot-separated path names
//! exactly one node. Leaves carry an optional static default and/or an
//! optional [`Resolver`]; groups are purely structural and mirror into the
//! resolved output as objects.

mod declarative;
mod merge;


use crate::context::Getter;
use crate::path::ConfigPath;
use crate::resolver::{Resolve, Resolver};
use serde_json::Value;
use std::future::Future;

/// A node in the schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Terminal node holding a default and/or resolver.
    Leaf(Leaf),
    /// Structural node holding named children.
    Group(Group),
}

impl SchemaNode {
    /// Borrow the leaf, if this node is one.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            SchemaNode::Leaf(leaf) => Some(leaf),
            SchemaNode::Group(_) => None,
        }
    }
}

impl From<Leaf> for SchemaNode {
    fn from(leaf: Leaf) -> Self {
        SchemaNode::Leaf(leaf)
    }
}

impl From<Group> for SchemaNode {
    fn from(group: Group) -> Self {
        SchemaNode::Group(group)
    }
}

/// Terminal schema node.
#[derive(Debug, Clone, Default)]
pub struct Leaf {
    default: Option<Value>,
    resolver: Option<Resolver>,
    description: Option<String>,
}

impl Leaf {
    /// A leaf with neither default nor resolver; resolves to the user value or `null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf holding a static default.
    pub fn from_default(value: impl Into<Value>) -> Self {
        Self::new().with_default(value)
    }

    /// A leaf computed by an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<Value>, Getter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::new().with_fn(f)
    }

    /// A leaf computed by a [`Resolve`] implementation.
    pub fn from_resolver(resolver: impl Resolve + 'static) -> Self {
        Self::new().with_resolver(Resolver::new(resolver))
    }

    /// Set the static default.
    ///
    /// Defaults are opaque: an object or array default is never merged with
    /// the user value unless the leaf's resolver does so.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the resolver from a handle.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the resolver from an async closure.
    pub fn with_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Option<Value>, Getter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.with_resolver(Resolver::from_fn(f))
    }

    /// Attach human-readable documentation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The static default, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The resolver, if any.
    pub fn resolver(&self) -> Option<&Resolver> {
        self.resolver.as_ref()
    }

    /// The documentation string, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Structural schema node. Children keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct Group {
    children: Vec<(String, SchemaNode)>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Group::insert`].
    pub fn with(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.insert(key, node);
        self
    }

    /// Insert a child, replacing (in place) any child with the same key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        node: impl Into<SchemaNode>,
    ) -> Option<SchemaNode> {
        let key = key.into();
        let node = node.into();
        match self.get_mut(&key) {
            Some(existing) => Some(std::mem::replace(existing, node)),
            None => {
                self.children.push((key, node));
                None
            }
        }
    }

    /// Borrow a child by key.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.children
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Mutably borrow a child by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut SchemaNode> {
        self.children
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Iterate children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn into_children(self) -> Vec<(String, SchemaNode)> {
        self.children
    }

    fn collect_leaves(&self, prefix: &ConfigPath, out: &mut Vec<ConfigPath>) {
        for (key, node) in self.iter() {
            let path = prefix.child(key);
            match node {
                SchemaNode::Leaf(_) => out.push(path),
                SchemaNode::Group(group) => group.collect_leaves(&path, out),
            }
        }
    }
}

/// Where a path lands in the schema.
#[derive(Debug)]
pub(crate) enum Lookup<'a> {
    /// The path names a group (the root included).
    Group(&'a Group),
    /// The path names a leaf.
    Leaf(&'a Leaf),
    /// The path continues past a leaf into its value.
    WithinLeaf {
        leaf: ConfigPath,
        rest: Vec<String>,
    },
    /// The path is not declared.
    Missing,
}

/// An addressable schema tree.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    root: Group,
}

impl Schema {
    /// Wrap a root group.
    pub fn new(root: Group) -> Self {
        Self { root }
    }

    /// The root group.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Find the node at `path`.
    pub(crate) fn lookup(&self, path: &ConfigPath) -> Lookup<'_> {
        let mut group = &self.root;
        let segments = path.segments();
        for (idx, segment) in segments.iter().enumerate() {
            match group.get(segment) {
                Some(SchemaNode::Group(child)) => group = child,
                Some(SchemaNode::Leaf(leaf)) => {
                    let rest = &segments[idx + 1..];
                    if rest.is_empty() {
                        return Lookup::Leaf(leaf);
                    }
                    let mut leaf_path = ConfigPath::root();
                    for part in &segments[..=idx] {
                        leaf_path = leaf_path.child(part);
                    }
                    return Lookup::WithinLeaf {
                        leaf: leaf_path,
                        rest: rest.to_vec(),
                    };
                }
                None => return Lookup::Missing,
            }
        }
        Lookup::Group(group)
    }

    /// Whether `path` names a declared node.
    pub fn contains(&self, path: &ConfigPath) -> bool {
        matches!(self.lookup(path), Lookup::Group(_) | Lookup::Leaf(_))
    }

    /// Every leaf path, in declaration order.
    pub fn leaf_paths(&self) -> Vec<ConfigPath> {
        self.leaf_paths_under(&ConfigPath::root())
    }

    /// Every leaf path at or beneath `path`.
    pub fn leaf_paths_under(&self, path: &ConfigPath) -> Vec<ConfigPath> {
        let mut out = Vec::new();
        match self.lookup(path) {
            Lookup::Group(group) => group.collect_leaves(path, &mut out),
            Lookup::Leaf(_) => out.push(path.clone()),
            Lookup::WithinLeaf { .. } | Lookup::Missing => {}
        }
        out
    }
}

impl From<Group> for Schema {
    fn from(root: Group) -> Self {
        Self::new(root)
    }
}

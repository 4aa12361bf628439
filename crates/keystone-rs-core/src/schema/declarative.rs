//! Build a schema from a declarative JSON description.
//!
//! Non-object values become static-default leaves. Objects carrying `$default`
//! or `$resolve` at their own level become leaves; `$resolve` names a resolver
//! in a [`ResolverRegistry`]. Every other object becomes a group.

use super::{Group, Leaf, Schema, SchemaNode};
use crate::error::SchemaError;
use crate::path::{ConfigPath, PATH_SEPARATOR};
use crate::resolver::ResolverRegistry;
use log::debug;
use serde_json::{Map, Value};

const DEFAULT_MARKER: &str = "$default";
const RESOLVE_MARKER: &str = "$resolve";
const DESCRIPTION_MARKER: &str = "$description";
const MARKER_PREFIX: char = '$';

impl Schema {
    /// Build a schema from a declarative value, looking resolvers up by name.
    pub fn from_value(value: &Value, registry: &ResolverRegistry) -> Result<Self, SchemaError> {
        let Value::Object(map) = value else {
            return Err(SchemaError::InvalidRoot);
        };
        let root = build_group(map, registry, &ConfigPath::root())?;
        Ok(Schema::new(root))
    }
}

fn is_leaf_object(map: &Map<String, Value>) -> bool {
    map.contains_key(DEFAULT_MARKER) || map.contains_key(RESOLVE_MARKER)
}

fn build_node(
    value: &Value,
    registry: &ResolverRegistry,
    path: &ConfigPath,
) -> Result<SchemaNode, SchemaError> {
    match value {
        Value::Object(map) if is_leaf_object(map) => {
            build_leaf(map, registry, path).map(Into::into)
        }
        Value::Object(map) => build_group(map, registry, path).map(Into::into),
        other => Ok(Leaf::from_default(other.clone()).into()),
    }
}

fn build_group(
    map: &Map<String, Value>,
    registry: &ResolverRegistry,
    path: &ConfigPath,
) -> Result<Group, SchemaError> {
    let mut group = Group::new();
    for (key, value) in map {
        if key.starts_with(MARKER_PREFIX) {
            debug!("ignoring group metadata (path={path}, key={key})");
            continue;
        }
        validate_key(key, path)?;
        let child_path = path.child(key);
        group.insert(key.clone(), build_node(value, registry, &child_path)?);
    }
    Ok(group)
}

fn build_leaf(
    map: &Map<String, Value>,
    registry: &ResolverRegistry,
    path: &ConfigPath,
) -> Result<Leaf, SchemaError> {
    let mut leaf = Leaf::new();
    for (key, value) in map {
        match key.as_str() {
            DEFAULT_MARKER => leaf = leaf.with_default(value.clone()),
            RESOLVE_MARKER => {
                let name = value.as_str().ok_or_else(|| SchemaError::InvalidKey {
                    path: path.to_string(),
                    key: key.clone(),
                    reason: "expected a resolver name".to_string(),
                })?;
                let resolver = registry.get(name).ok_or_else(|| SchemaError::UnknownResolver {
                    path: path.to_string(),
                    name: name.to_string(),
                })?;
                leaf = leaf.with_resolver(resolver);
            }
            DESCRIPTION_MARKER => {
                let description = value.as_str().ok_or_else(|| SchemaError::InvalidKey {
                    path: path.to_string(),
                    key: key.clone(),
                    reason: "expected a string".to_string(),
                })?;
                leaf = leaf.with_description(description);
            }
            other if other.starts_with(MARKER_PREFIX) => {
                debug!("ignoring leaf metadata (path={path}, key={other})");
            }
            _ => {
                return Err(SchemaError::MixedNode {
                    path: path.to_string(),
                });
            }
        }
    }
    Ok(leaf)
}

fn validate_key(key: &str, path: &ConfigPath) -> Result<(), SchemaError> {
    let reason = if key.is_empty() {
        "keys must not be empty"
    } else if key.contains(PATH_SEPARATOR) {
        "keys must not contain '.'"
    } else {
        return Ok(());
    };
    Err(SchemaError::InvalidKey {
        path: path.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

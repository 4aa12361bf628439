//! Value helpers shared by presets.

use keystone_rs_core::{Getter, ResolveError};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// JavaScript-style truthiness, matching how build tools read flags.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read a path another contributor may or may not declare.
///
/// `null` and an undeclared `path` both come back as `None`. Every other
/// failure is propagated, including unknown paths read by the resolvers
/// `path` depends on.
pub(crate) async fn get_optional(
    get: &Getter,
    path: &str,
) -> Result<Option<Value>, ResolveError> {
    match get.get(path).await {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(ResolveError::UnknownPath { path: missing }) if missing == path => Ok(None),
        Err(err) => Err(err),
    }
}

/// Lay the keys of a user object over `base`.
pub(crate) fn overlay(mut base: Map<String, Value>, user: Option<Value>) -> Value {
    if let Some(Value::Object(user)) = user {
        base.extend(user);
    }
    Value::Object(base)
}

/// Append `value`, or its elements when it is an array.
pub(crate) fn push_flat(target: &mut Vec<Value>, value: Option<Value>) {
    match value {
        Some(Value::Array(items)) => target.extend(items),
        Some(Value::Null) | None => {}
        Some(other) => target.push(other),
    }
}

/// Drop repeated entries, keeping the first occurrence.
pub(crate) fn dedupe(values: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Join `value` onto `base` unless it is absolute, then normalize.
pub(crate) fn resolve_path(base: &str, value: &str) -> String {
    let value = Path::new(value);
    let joined = if value.is_absolute() {
        value.to_path_buf()
    } else {
        Path::new(base).join(value)
    };
    path_string(&normalize(&joined))
}

/// Lexically drop `.` and fold `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

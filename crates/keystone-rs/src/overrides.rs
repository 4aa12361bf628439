//! `path=value` assignments, as given on a command line.

use crate::KeystoneError;
use keystone_rs_config::ConfigError;
use keystone_rs_core::ConfigPath;
use serde_json::{Map, Value};

/// Build an override object from `path=value` assignments.
///
/// Values are read as JSON5 when they parse (`true`, `3`, `['a']`) and kept
/// as plain strings otherwise. Later assignments win.
pub fn parse_assignments<I, S>(assignments: I) -> Result<Value, KeystoneError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = Map::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let Some((path, raw)) = assignment.split_once('=') else {
            return Err(invalid(format!("expected path=value, got {assignment:?}")));
        };
        let path = ConfigPath::parse(path.trim()).map_err(|err| invalid(err.to_string()))?;
        let value = json5::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.into()));
        insert(&mut root, path.segments(), value)?;
    }
    Ok(Value::Object(root))
}

fn insert(
    map: &mut Map<String, Value>,
    segments: &[String],
    value: Value,
) -> Result<(), KeystoneError> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(invalid("empty assignment path".to_string()));
    };
    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return Err(invalid(format!("{segment} is not an object")));
        };
        current = next;
    }
    current.insert(last.clone(), value);
    Ok(())
}

fn invalid(message: String) -> KeystoneError {
    KeystoneError::Config(ConfigError::Invalid(message))
}

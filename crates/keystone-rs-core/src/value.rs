//! Helpers for reading values out of user input and resolved leaves.

use crate::path::ConfigPath;
use serde_json::Value;

/// Walk `segments` through nested objects.
pub(crate) fn lookup<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// User-supplied value at `path`; absent and `null` both read as `None`.
pub(crate) fn user_value(user: &Value, path: &ConfigPath) -> Option<Value> {
    match lookup(user, path.segments()) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup, user_value};
    use crate::path::ConfigPath;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn null_and_missing_user_values_read_as_absent() {
        let user = json!({ "a": null, "b": { "c": 3 }, "d": [1] });
        let path = |raw: &str| ConfigPath::parse(raw).expect("path");
        assert_eq!(user_value(&user, &path("a")), None);
        assert_eq!(user_value(&user, &path("missing")), None);
        assert_eq!(user_value(&user, &path("b.c")), Some(json!(3)));
        assert_eq!(user_value(&user, &path("d.0")), None);
    }

    #[test]
    fn lookup_stops_at_non_objects() {
        let value = json!({ "a": "text" });
        assert_eq!(lookup(&value, &["a".to_string(), "b".to_string()]), None);
        assert_eq!(lookup(&value, &[]), Some(&value));
    }
}

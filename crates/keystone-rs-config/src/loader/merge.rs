//! JSON merge helpers for layered user config.

use serde_json::Value;

/// Merge overlay values into the base, recursively overriding objects.
///
/// A `null` in the overlay leaves the base untouched, since a resolution
/// pass reads `null` the same as an absent key.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

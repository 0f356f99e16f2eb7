//! JSON merge helper for layered configuration.

use serde_json::Value;

/// Merge overlay values into the base; objects merge key by key, anything
/// else (including arrays) is replaced wholesale.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_arrays_replace() {
        let mut base = json!({
            "server": { "port": 5000, "cors_origins": ["a", "b"] },
            "store": { "backend": "memory" },
        });
        merge_json_values(
            &mut base,
            &json!({ "server": { "cors_origins": ["c"] }, "monitor": { "memory_interval_secs": 0 } }),
        );
        assert_eq!(
            base,
            json!({
                "server": { "port": 5000, "cors_origins": ["c"] },
                "store": { "backend": "memory" },
                "monitor": { "memory_interval_secs": 0 },
            })
        );
    }
}

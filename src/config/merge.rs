//! Recursive configuration merge
//!
//! A caller's fragment is laid over the built-in defaults key by key:
//! nested objects keep merging, while anything else the fragment supplies
//! wins outright at that position. That lets a fragment flip one boolean
//! three levels deep without restating its siblings, and still fully
//! replace an array-valued setting such as the lint target globs.

use serde_json::Value;

/// Merge `overlay` into `base`, recursing only while both sides are
/// objects.
///
/// Everything that is not an object-into-object merge is whole-value
/// replacement: arrays are swapped out, never concatenated or unioned,
/// and a value of one kind landing on a value of another kind simply
/// takes its place. Ownership of both trees moves in, so no tree the
/// caller still holds is ever touched.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // Everything else, arrays included, is replacement
        (_, overlay) => overlay,
    }
}

/// Fold an ordered sequence of layers, earliest first, later layers
/// taking precedence.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

//! Shorthand alias expansion
//!
//! A handful of flat, top-level settings are accepted as aliases for
//! commonly-overridden nested values. Each alias maps to a slash-delimited
//! path into the configuration tree; expansion writes the value at that
//! path and removes the flat key, before the merge runs. Aliases target
//! disjoint paths, so application order does not matter.

use serde_json::{Map, Value};

/// Flat setting name -> slash-delimited target path.
pub const SHORTHAND_ALIASES: &[(&str, &str)] = &[
    ("watchifyDebug", "watchifyOptions/debug"),
    ("browserSyncBaseDir", "browserSyncOptions/server/baseDir"),
    ("browserSyncEnabled", "browserSyncOptions/enabled"),
    ("jscs", "lint/jscs"),
    ("eslint", "lint/eslint"),
];

/// Expand every shorthand alias present at the top level of the fragment.
///
/// Non-object fragments are left untouched; the resolver rejects them later.
pub fn expand_shorthand(fragment: &mut Value) {
    let Some(map) = fragment.as_object_mut() else {
        return;
    };
    for (alias, path) in SHORTHAND_ALIASES {
        if let Some(value) = map.remove(*alias) {
            set_value_at_path(map, path, value);
        }
    }
}

/// Set `value` at a slash-delimited `path` inside `map`, creating
/// intermediate objects as needed. An intermediate segment holding a
/// non-object value is replaced with an object so the walk can continue.
pub fn set_value_at_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    let mut parts = path.split('/').peekable();
    let mut current = map;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return;
        }
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut().unwrap();
    }
}

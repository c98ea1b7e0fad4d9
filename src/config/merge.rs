//! Deep merge of JSON-shaped values
//!
//! Used both to fold converted option fragments into a section's merged
//! options and to layer the converter's own settings:
//! - Objects: deep-merge by key
//! - Everything else: the update wins

use serde_json::{Map, Value};

/// Deep merge `update` into `base`.
///
/// Merge semantics:
/// - Objects on both sides: merged key by key, recursively
/// - Arrays: REPLACE (update wins entirely)
/// - Scalars and mixed kinds: update wins
pub fn deep_merge(base: Value, update: Value) -> Value {
    match (base, update) {
        (Value::Object(mut base_map), Value::Object(update_map)) => {
            merge_maps(&mut base_map, update_map);
            Value::Object(base_map)
        }
        (_, update) => update,
    }
}

/// Merge `update` into `base` in place.
pub fn merge_maps(base: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, update_value) in update {
        let merged = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, update_value),
            None => update_value,
        };
        base.insert(key, merged);
    }
}

/// Merge multiple layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

/// Fold object fragments left to right into a single map.
///
/// Non-object fragments are ignored.
pub fn fold_fragments<I>(fragments: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Value>,
{
    fragments.into_iter().fold(Map::new(), |mut acc, fragment| {
        if let Value::Object(map) = fragment {
            merge_maps(&mut acc, map);
        }
        acc
    })
}

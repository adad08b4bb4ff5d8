use std::collections::HashMap;

use serde_json::{Map, Value};

// The loader array is a flat heap: entries at indices (1,2), (3,4), ...
// are the top-level key/value pairs, and any integer node anywhere in the
// tree is a back-reference into the array. Object keys of the form
// `_<index>` are references too, resolved to the string at that index.
pub fn decode_loader(loader: &[Value]) -> Map<String, Value> {
    let mut memo: HashMap<usize, Value> = HashMap::new();
    let mut decoded = Map::new();

    let mut index = 1;
    while index + 1 < loader.len() {
        // Top-level keys are read as literals, never reference-resolved;
        // the first occurrence of a key wins.
        if let Some(key) = loader[index].as_str()
            && !key.is_empty()
            && !decoded.contains_key(key)
        {
            let value = resolve(loader, &mut memo, &loader[index + 1]);
            decoded.insert(key.to_string(), value);
        }
        index += 2;
    }

    decoded
}

fn resolve(loader: &[Value], memo: &mut HashMap<usize, Value>, node: &Value) -> Value {
    if let Some(reference) = reference_index(loader, node) {
        if let Some(cached) = memo.get(&reference) {
            // A hit may be the null placeholder of an in-progress
            // resolution: cyclic references degrade to null instead of
            // recursing forever.
            return cached.clone();
        }

        memo.insert(reference, Value::Null);
        let resolved = resolve(loader, memo, &loader[reference]);
        memo.insert(reference, resolved.clone());
        return resolved;
    }

    match node {
        Value::Object(object) => {
            let mut resolved = Map::new();
            for (key, value) in object {
                resolved.insert(decode_key(loader, key), resolve(loader, memo, value));
            }
            Value::Object(resolved)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve(loader, memo, item))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

// Only integral numbers inside the array bounds act as references;
// out-of-range integers and floats stay literal.
fn reference_index(loader: &[Value], node: &Value) -> Option<usize> {
    usize::try_from(node.as_i64()?)
        .ok()
        .filter(|&index| index < loader.len())
}

fn decode_key(loader: &[Value], raw: &str) -> String {
    if let Some(digits) = raw.strip_prefix('_')
        && let Ok(index) = digits.parse::<usize>()
        && index < loader.len()
        && let Some(decoded) = loader[index].as_str()
        && !decoded.is_empty()
    {
        return decoded.to_string();
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::decode_loader;

    fn loader_from(value: Value) -> Vec<Value> {
        value.as_array().expect("array fixture").clone()
    }

    #[test]
    fn decodes_key_value_pairs_from_odd_indices() {
        let loader = loader_from(json!([null, "title", "Hello", "count", 7.5]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("title"), Some(&json!("Hello")));
        assert_eq!(decoded.get("count"), Some(&json!(7.5)));
    }

    #[test]
    fn resolves_integer_back_references() {
        let loader = loader_from(json!(["shared value", "data", {"field": 0}]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("data"), Some(&json!({"field": "shared value"})));
    }

    #[test]
    fn out_of_range_integers_stay_literal() {
        let loader = loader_from(json!([null, "data", {"n": 99, "m": -1}]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("data"), Some(&json!({"n": 99, "m": -1})));
    }

    #[test]
    fn floats_are_never_references() {
        let loader = loader_from(json!(["target", "data", {"n": 0.0}]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("data"), Some(&json!({"n": 0.0})));
    }

    #[test]
    fn underscore_keys_resolve_through_the_array() {
        let loader = loader_from(json!([null, "conversation", {"_3": 0}, "title"]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("conversation"), Some(&json!({"title": null})));
    }

    #[test]
    fn underscore_keys_without_string_targets_keep_raw_text() {
        let loader = loader_from(json!([null, "data", {"_3": "x", "_99": "y"}, 42]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("data"), Some(&json!({"_3": "x", "_99": "y"})));
    }

    #[test]
    fn self_reference_resolves_to_null_placeholder() {
        let loader = loader_from(json!([null, "a", 5, null, null, 5]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("a"), Some(&Value::Null));
    }

    #[test]
    fn mutual_cycle_terminates() {
        // index 2 -> {"next": 4}, index 4 -> {"next": 2}
        let loader = loader_from(json!([null, "a", {"next": 4}, "unused", {"next": 2}]));
        let decoded = decode_loader(&loader);

        // The outer object resolves; the inner cycle bottoms out at null.
        let a = decoded.get("a").expect("a decoded");
        assert_eq!(a.pointer("/next/next/next"), Some(&Value::Null));
    }

    #[test]
    fn first_occurrence_of_duplicate_key_wins() {
        let loader = loader_from(json!([null, "k", "first", "k", "second"]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("k"), Some(&json!("first")));
    }

    #[test]
    fn non_string_or_empty_keys_are_skipped() {
        let loader = loader_from(json!([null, 3, "dropped", "", "dropped", "ok", "kept"]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("ok"), Some(&json!("kept")));
    }

    #[test]
    fn nested_arrays_resolve_elements() {
        let loader = loader_from(json!(["leaf", "items", [0, "literal", [0]]]));
        let decoded = decode_loader(&loader);

        assert_eq!(
            decoded.get("items"),
            Some(&json!(["leaf", "literal", ["leaf"]]))
        );
    }

    #[test]
    fn memoization_shares_resolved_subtrees() {
        let loader = loader_from(json!(["dup", "a", {"x": 0, "y": 0}]));
        let decoded = decode_loader(&loader);

        assert_eq!(decoded.get("a"), Some(&json!({"x": "dup", "y": "dup"})));
    }
}

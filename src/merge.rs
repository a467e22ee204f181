//! Merge rules for JSON-LD fragments
//!
//! Field converters each return a fragment; fragments are merged into the
//! record document (and projections into a fragment) with these rules:
//!
//! - `@type`: union of type names, a bare string when only one remains
//! - arrays on both sides: union, de-duplicating `@id` references
//! - a node object and an array of nodes: folded into one array, skipping
//!   nodes whose `@id` is already present
//! - anything else: the value already present wins

use serde_json::{Map, Value};

/// Merge one property into a fragment
pub fn merge_property(target: &mut Map<String, Value>, key: &str, value: Value) {
    let merged = match target.get(key) {
        None => value,
        Some(existing) if key == "@type" => merge_types(existing, &value),
        Some(Value::Array(existing)) => match value {
            Value::Array(items) => Value::Array(union_arrays(existing, &items)),
            node @ Value::Object(_) => Value::Array(fold_nodes(existing.to_vec(), vec![node])),
            _ => return,
        },
        Some(node @ Value::Object(_)) => match value {
            Value::Array(items) => Value::Array(fold_nodes(vec![node.clone()], items)),
            _ => return,
        },
        Some(_) => return,
    };
    target.insert(key.to_string(), merged);
}

/// Merge every property of `fragment` into `target`
pub fn merge_fragment(target: &mut Map<String, Value>, fragment: Map<String, Value>) {
    for (key, value) in fragment {
        merge_property(target, &key, value);
    }
}

/// Union two arrays, keeping the order of first appearance
pub fn union_arrays(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut result = a.to_vec();
    for item in b {
        if !contains_value(&result, item) {
            result.push(item.clone());
        }
    }
    result
}

/// Append node objects to a list unless a node with the same `@id` is
/// already there
fn fold_nodes(mut nodes: Vec<Value>, incoming: Vec<Value>) -> Vec<Value> {
    for item in incoming {
        let duplicate = match node_id(&item) {
            Some(id) => nodes.iter().any(|n| node_id(n) == Some(id)),
            None => contains_value(&nodes, &item),
        };
        if !duplicate {
            nodes.push(item);
        }
    }
    nodes
}

fn node_id(value: &Value) -> Option<&Value> {
    value.as_object().and_then(|obj| obj.get("@id"))
}

/// Union two `@type` values
pub fn merge_types(a: &Value, b: &Value) -> Value {
    let mut types = extract_types(a);
    for t in extract_types(b) {
        if !types.contains(&t) {
            types.push(t);
        }
    }
    if types.len() == 1 {
        Value::String(types.remove(0))
    } else {
        Value::Array(types.into_iter().map(Value::String).collect())
    }
}

/// `@type` value as a list of names
pub fn extract_types(value: &Value) -> Vec<String> {
    match value {
        Value::String(t) => vec![t.clone()],
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => vec![],
    }
}

/// Check if two values are semantically equal
/// Bare `@id` references compare by identifier
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() == 1 && obj_b.len() == 1 {
                if let (Some(id_a), Some(id_b)) = (obj_a.get("@id"), obj_b.get("@id")) {
                    return id_a == id_b;
                }
            }
            obj_a == obj_b
        }
        _ => a == b,
    }
}

fn contains_value(arr: &[Value], value: &Value) -> bool {
    arr.iter().any(|v| values_equal(v, value))
}

//! Canonical JSON (§4.8): a deterministic, key-sorted serialization used by
//! `deepEquals` and by the normalizer's array-sort transform, and exposed
//! publicly so host code can fingerprint a `Value`.

use crate::value::Value;

/// Serialize `value` with object keys sorted lexicographically at every
/// depth. The result is a total order on value trees: feeding it to
/// `Ord`/`Eq` on the resulting `String` gives a stable, content-addressed
/// comparison that ignores original key order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push_str(&serde_json::to_string(s).expect("string serialization cannot fail"));
        }
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Record(fields) => {
            let mut sorted: Vec<&(String, Value)> = fields.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            out.push('{');
            for (i, (k, v)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(k).expect("string serialization cannot fail"));
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value {
        Value::from(j)
    }

    #[test]
    fn sorts_keys_at_every_depth() {
        let a = v(json!({"b": 1, "a": {"d": 1, "c": 2}}));
        let b = v(json!({"a": {"c": 2, "d": 1}, "b": 1}));
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn preserves_array_order() {
        let a = v(json!([1, 2, 3]));
        let b = v(json!([3, 2, 1]));
        assert_ne!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn distinguishes_number_and_string() {
        let a = v(json!({"x": 1}));
        let b = v(json!({"x": "1"}));
        assert_ne!(canonical_json(&a), canonical_json(&b));
    }
}

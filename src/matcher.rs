//! The structural matcher (§4.4): walks the predicate's expected shape
//! against the actual shape. Grounded on oatf's `primitives::evaluate_predicate`
//! (path resolution + per-field dispatch), generalized from oatf's flat
//! dot-paths to the spec's fully recursive `Value` records/sequences.

use crate::transforms::{try_json, TryJsonOpts};
use crate::value::Value;

/// The operator-specific scalar comparator a leaf operator supplies.
pub type LeafFn<'a> = dyn Fn(&Value, &Value) -> bool + 'a;

/// Context threaded through the recursive walk: only used for the
/// JSON-in-string reach-through (§9 "Lazy re-parsing of JSON-in-string").
pub struct MatchContext<'a> {
    pub try_json_opts: TryJsonOpts<'a>,
    /// True only while evaluating the `exists` operator (needed for the
    /// case-2 sequence shortcut in §4.4's table).
    pub operator_is_exists: bool,
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Null => false,
        _ => false,
    }
}

/// Re-parse `actual` as JSON when it's a `String`, so a nested `expected`
/// record can reach into a JSON body carried as a string. Non-string values
/// and parse failures pass through unchanged.
fn reach_through<'v>(actual: Option<&'v Value>, ctx: &MatchContext<'_>) -> Option<std::borrow::Cow<'v, Value>> {
    match actual {
        Some(Value::String(s)) => {
            if serde_json::from_str::<serde_json::Value>(s).is_ok() {
                Some(std::borrow::Cow::Owned(try_json(s, &ctx.try_json_opts)))
            } else {
                Some(std::borrow::Cow::Borrowed(actual.unwrap()))
            }
        }
        Some(v) => Some(std::borrow::Cow::Borrowed(v)),
        None => None,
    }
}

/// Entry point: `expected` is the operator's value (e.g. `p.equals`).
pub fn test_predicate(expected: &Value, actual: Option<&Value>, ctx: &MatchContext<'_>, leaf_fn: &LeafFn<'_>) -> bool {
    match expected {
        Value::Record(fields) => predicate_satisfied(fields, actual, ctx, leaf_fn),
        scalar => {
            let actual = actual.cloned().unwrap_or_else(empty_string);
            leaf_fn(scalar, &actual)
        }
    }
}

/// Walk every field of `expected`, applying the §4.4 case table. All fields
/// must be satisfied (implicit `and`).
pub fn predicate_satisfied(
    expected_fields: &[(String, Value)],
    actual: Option<&Value>,
    ctx: &MatchContext<'_>,
    leaf_fn: &LeafFn<'_>,
) -> bool {
    expected_fields
        .iter()
        .all(|(field, expected_value)| match_field(field, expected_value, actual, ctx, leaf_fn))
}

fn match_field(
    field: &str,
    expected_value: &Value,
    actual: Option<&Value>,
    ctx: &MatchContext<'_>,
    leaf_fn: &LeafFn<'_>,
) -> bool {
    let actual_record = actual.and_then(|a| match a {
        Value::Record(_) => Some(a),
        _ => None,
    });
    let actual_field_raw = actual_record.and_then(|a| a.get(field));

    let expected_is_sequence = expected_value.is_sequence();
    let actual_field_is_sequence = actual_field_raw.map(Value::is_sequence).unwrap_or(false);

    if expected_is_sequence && actual_field_is_sequence {
        // Case 1: subset semantics, not order-preserving.
        let expected_items = expected_value.as_sequence().unwrap();
        let actual_items = actual_field_raw.unwrap().as_sequence().unwrap();
        return expected_items.iter().all(|expected_item| {
            actual_items
                .iter()
                .any(|actual_item| test_predicate(expected_item, Some(actual_item), ctx, leaf_fn))
        });
    }

    if !expected_is_sequence && actual_field_is_sequence {
        if ctx.operator_is_exists && truthy(expected_value) {
            // Case 2: exists:true against an array field always succeeds.
            return true;
        }
        // Case 3: at least one element of actual must satisfy expected.
        let actual_items = actual_field_raw.unwrap().as_sequence().unwrap();
        return actual_items
            .iter()
            .any(|actual_item| test_predicate(expected_value, Some(actual_item), ctx, leaf_fn));
    }

    if !expected_is_sequence && actual_field_raw.is_none() {
        if let Some(outer_items) = actual.and_then(Value::as_sequence) {
            if outer_items.iter().any(Value::is_record) {
                // Case 4: backwards-compatibility shim for pre-array predicates.
                return outer_items.iter().any(|elem| {
                    let elem_field = elem.get(field);
                    match_field_leaf(expected_value, elem_field, ctx, leaf_fn)
                });
            }
        }
    }

    match_field_leaf(expected_value, actual_field_raw, ctx, leaf_fn)
}

fn match_field_leaf(
    expected_value: &Value,
    actual_field_raw: Option<&Value>,
    ctx: &MatchContext<'_>,
    leaf_fn: &LeafFn<'_>,
) -> bool {
    if let Value::Record(fields) = expected_value {
        // Case 5: nested record, with JSON-in-string reach-through.
        let reparsed = reach_through(actual_field_raw, ctx);
        return predicate_satisfied(fields, reparsed.as_deref(), ctx, leaf_fn);
    }
    // Case 6 (default): scalar leaf comparison. No reach-through here — a
    // scalar expected compares the actual's literal string form.
    test_predicate(expected_value, actual_field_raw, ctx, leaf_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> MatchContext<'static> {
        MatchContext {
            try_json_opts: TryJsonOpts {
                case_sensitive: false,
                key_case_sensitive: false,
                except: None,
                force_strings: false,
            },
            operator_is_exists: false,
        }
    }

    fn equals(e: &Value, a: &Value) -> bool {
        e.to_comparison_string() == a.to_comparison_string()
    }

    #[test]
    fn scalar_expected_matches_existing_field() {
        let expected = Value::from(json!({"m": "get"}));
        let actual = Value::from(json!({"m": "get", "p": "/x"}));
        let fields = expected.as_record().unwrap();
        assert!(predicate_satisfied(fields, Some(&actual), &ctx(), &equals));
    }

    #[test]
    fn missing_field_compares_as_empty_string() {
        let expected = Value::from(json!({"m": ""}));
        let actual = Value::from(json!({"p": "/x"}));
        let fields = expected.as_record().unwrap();
        assert!(predicate_satisfied(fields, Some(&actual), &ctx(), &equals));
    }

    #[test]
    fn array_subset_semantics() {
        let expected = Value::from(json!({"accept": ["json"]}));
        let actual = Value::from(json!({"accept": ["html", "json"]}));
        let fields = expected.as_record().unwrap();
        assert!(predicate_satisfied(fields, Some(&actual), &ctx(), &equals));
    }

    #[test]
    fn nested_json_in_string_reach_through() {
        let expected = Value::from(json!({"body": {"name": "bob"}}));
        let actual = Value::from(json!({"body": "{\"name\":\"bob\"}"}));
        let fields = expected.as_record().unwrap();
        assert!(predicate_satisfied(fields, Some(&actual), &ctx(), &equals));
    }

    #[test]
    fn backwards_compat_shim_matches_into_outer_sequence() {
        let expected = Value::from(json!({"name": "bob"}));
        let actual = Value::from(json!([{"name": "bob"}, {"name": "alice"}]));
        let fields = expected.as_record().unwrap();
        assert!(predicate_satisfied(fields, Some(&actual), &ctx(), &equals));
    }
}

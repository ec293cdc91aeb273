//! JSONPath selector evaluation (§4.2), grounded on the teacher's
//! `predicate::body_matcher::extract_json_path` (hand-rolled, only
//! `$.field`/`[*]`/slice-notation) but generalized to full RFC 9535 via
//! `serde_json_path`, the same crate oatf's `evaluate_extractor_jsonpath`
//! uses for the identical purpose — the hand-rolled navigator can't express
//! indexed descendant paths such as `$..title[1]`.

use serde_json_path::JsonPath;

use crate::error::{SelectorError, SelectorKind};
use crate::value::Value;

/// Evaluate `selector` against `input` (already a parsed JSON value, e.g.
/// the output of `try_json`). Collapses to a single scalar when exactly one
/// node matches, to a `Sequence` otherwise; no match yields an empty
/// `Sequence`.
pub fn evaluate(input: &Value, selector: &str) -> Result<Value, SelectorError> {
    let path = JsonPath::parse(selector).map_err(|e| SelectorError {
        kind: SelectorKind::JsonPath,
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let json_input = input.to_json();
    let nodes = path.query(&json_input);
    let mut matched: Vec<Value> = nodes.all().into_iter().map(Value::from).collect();

    Ok(if matched.len() == 1 {
        matched.remove(0)
    } else {
        Value::Sequence(matched)
    })
}

//! Combinators and top-level dispatch (§4.6, §4.7). Grounded on the
//! teacher's `logical::{LogicalMatcher, CompiledLogicalMatcher}` (recursive
//! not/or/and over a leaf matcher), restructured to recurse through this
//! crate's own `evaluate` rather than through a separately compiled tree.

use crate::config::EvalConfig;
use crate::error::{PredicateError, Result, ValidationError};
use crate::logger::Logger;
use crate::operators::{self, Operator, PredicateConfig};
use crate::value::Value;

const OPERATOR_KEYS: &[&str] = &[
    "equals",
    "deepEquals",
    "contains",
    "startsWith",
    "endsWith",
    "matches",
    "exists",
    "not",
    "or",
    "and",
    "inject",
];

/// The single entry point (§6): decide whether `request` satisfies
/// `predicate`.
pub fn evaluate(
    predicate: &Value,
    request: &Value,
    cfg: &EvalConfig,
    logger: &dyn Logger,
    imposter_state: &mut Value,
) -> Result<bool> {
    let fields = predicate
        .as_record()
        .ok_or_else(|| ValidationError::with_source("predicate must be a record", predicate.clone()))?;

    let matched: Vec<&(String, Value)> = fields
        .iter()
        .filter(|(k, _)| OPERATOR_KEYS.contains(&k.as_str()))
        .collect();

    let (key, value) = match matched.as_slice() {
        [] => {
            return Err(
                ValidationError::with_source("missing predicate", predicate.clone()).into(),
            )
        }
        [only] => (only.0.as_str(), &only.1),
        _ => {
            return Err(ValidationError::with_source(
                "predicate must declare exactly one operator",
                predicate.clone(),
            )
            .into())
        }
    };

    match key {
        "not" => Ok(!evaluate(value, request, cfg, logger, imposter_state)?),
        "or" => evaluate_any(value, request, cfg, logger, imposter_state),
        "and" => evaluate_all(value, request, cfg, logger, imposter_state),
        "inject" => crate::inject::evaluate_inject(value, request, cfg, logger, imposter_state),
        _ => {
            let operator = leaf_operator(key).expect("key drawn from OPERATOR_KEYS");
            let predicate_cfg = PredicateConfig::from_predicate(fields)?;
            operators::evaluate(operator, value, request, &predicate_cfg, cfg)
        }
    }
}

fn leaf_operator(key: &str) -> Option<Operator> {
    Some(match key {
        "equals" => Operator::Equals,
        "deepEquals" => Operator::DeepEquals,
        "contains" => Operator::Contains,
        "startsWith" => Operator::StartsWith,
        "endsWith" => Operator::EndsWith,
        "matches" => Operator::Matches,
        "exists" => Operator::Exists,
        _ => return None,
    })
}

fn evaluate_any(
    predicates: &Value,
    request: &Value,
    cfg: &EvalConfig,
    logger: &dyn Logger,
    imposter_state: &mut Value,
) -> Result<bool> {
    let list = predicates
        .as_sequence()
        .ok_or_else(|| ValidationError::with_source("or requires a list of predicates", predicates.clone()))?;
    for p in list {
        if evaluate(p, request, cfg, logger, imposter_state)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn evaluate_all(
    predicates: &Value,
    request: &Value,
    cfg: &EvalConfig,
    logger: &dyn Logger,
    imposter_state: &mut Value,
) -> Result<bool> {
    let list = predicates
        .as_sequence()
        .ok_or_else(|| ValidationError::with_source("and requires a list of predicates", predicates.clone()))?;
    for p in list {
        if !evaluate(p, request, cfg, logger, imposter_state)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLogger;
    use serde_json::json;

    fn run(predicate: serde_json::Value, request: serde_json::Value) -> bool {
        let predicate = Value::from(predicate);
        let request = Value::from(request);
        let mut state = Value::Null;
        evaluate(&predicate, &request, &EvalConfig::default(), &NullLogger, &mut state).unwrap()
    }

    #[test]
    fn rejects_predicate_with_no_operator() {
        let predicate = Value::from(json!({"caseSensitive": true}));
        let request = Value::from(json!({}));
        let mut state = Value::Null;
        let err = evaluate(&predicate, &request, &EvalConfig::default(), &NullLogger, &mut state).unwrap_err();
        assert!(matches!(err, PredicateError::Validation(_)));
    }

    #[test]
    fn rejects_predicate_with_two_operators() {
        let predicate = Value::from(json!({"equals": {"m": "GET"}, "contains": {"p": "x"}}));
        let request = Value::from(json!({"m": "GET", "p": "/x"}));
        let mut state = Value::Null;
        let err = evaluate(&predicate, &request, &EvalConfig::default(), &NullLogger, &mut state).unwrap_err();
        assert!(matches!(err, PredicateError::Validation(_)));
    }

    #[test]
    fn not_negates() {
        assert!(!run(json!({"not": {"equals": {"m": "GET"}}}), json!({"m": "GET"})));
        assert!(run(json!({"not": {"not": {"equals": {"m": "GET"}}}}), json!({"m": "GET"})));
    }

    #[test]
    fn and_or_single_element_identity() {
        assert!(run(json!({"and": [{"equals": {"m": "GET"}}]}), json!({"m": "GET"})));
        assert!(run(json!({"or": [{"equals": {"m": "GET"}}]}), json!({"m": "GET"})));
    }

    #[test]
    fn composed_and_or_not() {
        let predicate = json!({
            "and": [
                {"equals": {"m": "GET"}},
                {"not": {"contains": {"p": "admin"}}}
            ]
        });
        let request = json!({"m": "GET", "p": "/public"});
        assert!(run(predicate, request));
    }
}

//! End-to-end scenario and error-surface tests (§7, §8), exercising the
//! crate purely through its public API.

use predicate_engine::{evaluate, EvalConfig, Encoding, NullLogger, PredicateError, Value};
use serde_json::json;

fn eval(predicate: serde_json::Value, request: serde_json::Value, cfg: &EvalConfig) -> predicate_engine::Result<bool> {
    let predicate = Value::from(predicate);
    let request = Value::from(request);
    let mut state = Value::Null;
    evaluate(&predicate, &request, cfg, &NullLogger, &mut state)
}

fn run(predicate: serde_json::Value, request: serde_json::Value) -> bool {
    eval(predicate, request, &EvalConfig::default()).unwrap()
}

#[test]
fn unknown_predicate_key_is_rejected() {
    let predicate = json!({"caseSensitive": true, "except": "x"});
    let err = eval(predicate, json!({}), &EvalConfig::default()).unwrap_err();
    assert!(matches!(err, PredicateError::Validation(_)));
}

#[test]
fn inject_rejected_when_disabled() {
    let predicate = json!({"inject": "request.m == \"GET\""});
    let cfg = EvalConfig::default();
    let err = eval(predicate, json!({"m": "GET"}), &cfg).unwrap_err();
    assert!(matches!(err, PredicateError::Validation(_)));
}

#[cfg(feature = "inject-rhai")]
#[test]
fn inject_runs_when_enabled() {
    let predicate = json!({"inject": "request.m == \"GET\""});
    let cfg = EvalConfig {
        inject_enabled: true,
        ..EvalConfig::default()
    };
    assert!(eval(predicate, json!({"m": "GET"}), &cfg).unwrap());
}

#[test]
fn matches_and_xpath_rejected_in_base64_mode() {
    let cfg = EvalConfig {
        encoding: Encoding::Base64,
        ..EvalConfig::default()
    };
    let matches_pred = json!({"matches": {"path": "^/x$"}});
    assert!(matches!(
        eval(matches_pred, json!({"path": "/x"}), &cfg).unwrap_err(),
        PredicateError::Validation(_)
    ));

    let xpath_pred = json!({"equals": {"body": "hi"}, "xpath": {"selector": "//a"}});
    assert!(matches!(
        eval(xpath_pred, json!({"body": "<a>hi</a>"}), &cfg).unwrap_err(),
        PredicateError::Validation(_)
    ));
}

#[test]
fn base64_mode_decodes_before_comparison() {
    let cfg = EvalConfig {
        encoding: Encoding::Base64,
        ..EvalConfig::default()
    };
    // "hello" base64-encoded.
    let predicate = json!({"equals": {"body": "hello"}});
    let request = json!({"body": "aGVsbG8="});
    assert!(eval(predicate, request, &cfg).unwrap());
}

#[test]
fn except_strips_pattern_before_comparison() {
    let predicate = json!({"equals": {"id": "order-final"}, "except": "[0-9]+"});
    let request = json!({"id": "order-42-final"});
    assert!(run(predicate, request));
}

#[test]
fn xpath_namespace_binding() {
    let predicate = json!({
        "equals": {"body": "hi"},
        "xpath": {"selector": "//ns:a", "ns": {"ns": "urn:test"}}
    });
    let request = json!({"body": "<ns:doc xmlns:ns=\"urn:test\"><ns:a>hi</ns:a></ns:doc>"});
    assert!(run(predicate, request));
}

#[test]
fn deep_equals_reparses_json_string_body() {
    let predicate = json!({"deepEquals": {"body": {"name": "bob"}}});
    let request = json!({"body": "{\"name\":\"Bob\"}"});
    assert!(run(predicate, request));
}

#[test]
fn not_or_and_short_circuit_composition() {
    let predicate = json!({
        "or": [
            {"equals": {"m": "POST"}},
            {"and": [{"equals": {"m": "GET"}}, {"not": {"contains": {"p": "admin"}}}]}
        ]
    });
    assert!(run(predicate.clone(), json!({"m": "GET", "p": "/public"})));
    assert!(!run(predicate, json!({"m": "GET", "p": "/admin/x"})));
}

#[test]
fn canonical_json_sorts_keys() {
    let a = Value::from(json!({"b": 1, "a": 2}));
    let b = Value::from(json!({"a": 2, "b": 1}));
    assert_eq!(predicate_engine::canonical_json(&a), predicate_engine::canonical_json(&b));
}

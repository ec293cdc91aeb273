//! A Mountebank-compatible request-predicate evaluation engine.
//!
//! The evaluator is a pure function of `(predicate, request, config)`: no
//! shared state, no I/O, no caching of predicates across calls. See
//! [`evaluate`] for the single entry point.

mod canonical;
mod config;
mod error;
mod evaluate;
mod inject;
mod logger;
mod matcher;
mod normalize;
mod operators;
mod selectors;
mod transforms;
mod value;

pub use canonical::canonical_json;
pub use config::{Encoding, EvalConfig, DEFAULT_REGEX_SIZE_LIMIT};
pub use error::{InjectionError, PredicateError, Result, ValidationError};
pub use evaluate::evaluate;
pub use inject::Injector;
#[cfg(feature = "inject-rhai")]
pub use inject::RhaiInjector;
pub use logger::{Logger, NullLogger, TracingLogger};
pub use operators::Operator;
pub use selectors::Selector;
pub use value::Value;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    fn run(predicate: serde_json::Value, request: serde_json::Value) -> bool {
        let predicate = Value::from(predicate);
        let request = Value::from(request);
        let mut state = Value::Null;
        evaluate(&predicate, &request, &EvalConfig::default(), &TracingLogger, &mut state).unwrap()
    }

    #[test]
    fn scenario_nested_json_body() {
        assert!(run(
            json!({"equals": {"body": {"name": "bob"}}}),
            json!({"body": "{\"name\":\"Bob\"}"}),
        ));
    }

    #[test]
    fn scenario_array_subset() {
        assert!(run(
            json!({"equals": {"headers": {"accept": ["application/json"]}}}),
            json!({"headers": {"accept": ["text/html", "application/json"]}}),
        ));
    }

    #[test]
    fn scenario_xpath_scalar_collapse() {
        assert!(run(
            json!({"equals": {"body": "hi"}, "xpath": {"selector": "//a"}}),
            json!({"body": "<doc><a>hi</a></doc>"}),
        ));
    }

    #[test]
    fn scenario_jsonpath_case_sensitive_keys() {
        assert!(run(
            json!({"equals": {"body": "Alice"}, "jsonpath": {"selector": "$.Name"}, "caseSensitive": true}),
            json!({"body": "{\"Name\":\"Alice\"}"}),
        ));
        assert!(run(
            json!({"equals": {"body": "Alice"}, "jsonpath": {"selector": "$.Name"}, "caseSensitive": false}),
            json!({"body": "{\"Name\":\"Alice\"}"}),
        ));
    }

    #[test]
    fn scenario_matches_preserves_case() {
        assert!(run(
            json!({"matches": {"path": "^/[Uu]sers$"}}),
            json!({"path": "/Users"}),
        ));
    }

    #[test]
    fn scenario_deep_equals_strict() {
        assert!(run(
            json!({"deepEquals": {"q": {"a": "1"}}}),
            json!({"q": {"a": 1, "b": 2}}),
        ));
        assert!(!run(
            json!({"deepEquals": {"q": {"a": "1", "b": "3"}}}),
            json!({"q": {"a": 1, "b": 2}}),
        ));
    }

    #[test]
    fn scenario_exists_false_on_array() {
        assert!(!run(json!({"exists": {"tags": false}}), json!({"tags": ["x"]})));
    }

    #[test]
    fn scenario_not_or_and_composition() {
        assert!(run(
            json!({"and": [{"equals": {"m": "GET"}}, {"not": {"contains": {"p": "admin"}}}]}),
            json!({"m": "GET", "p": "/public"}),
        ));
    }
}

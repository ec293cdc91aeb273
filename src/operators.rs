//! Leaf predicate operators (§4.5): `equals`, `contains`, `startsWith`,
//! `endsWith`, `exists`, `matches`, `deepEquals`. All route through the
//! same normalize-then-`matcher::test_predicate` pipeline; only the leaf
//! scalar comparator and a handful of normalization flags differ per
//! operator. Grounded on the teacher's `string_matcher::{StringMatcher,
//! CompiledStringMatcher}` enum shape and `CachedValue` helpers, reworked
//! to operate on freshly normalized strings per call instead of a
//! persisted `Compiled*` tree.

use regex::Regex;

use crate::config::EvalConfig;
use crate::error::{PredicateError, ValidationError};
use crate::matcher::{test_predicate, LeafFn, MatchContext};
use crate::normalize::{normalize, NormalizeOpts};
use crate::selectors::Selector;
use crate::transforms::{compile_regex, force_strings, TryJsonOpts};
use crate::value::Value;

/// The seven leaf operators (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Exists,
    Matches,
    DeepEquals,
}

impl Operator {
    pub fn key(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Exists => "exists",
            Operator::Matches => "matches",
            Operator::DeepEquals => "deepEquals",
        }
    }
}

/// Sibling config parsed off a predicate record (§3): `caseSensitive`,
/// `keyCaseSensitive`, `except`, and the optional selector.
#[derive(Debug, Clone)]
pub struct PredicateConfig {
    pub case_sensitive: bool,
    pub key_case_sensitive: bool,
    pub except: Option<String>,
    pub selector: Option<Selector>,
}

impl PredicateConfig {
    pub fn from_predicate(predicate: &[(String, Value)]) -> Result<Self, ValidationError> {
        let get = |k: &str| predicate.iter().find(|(key, _)| key == k).map(|(_, v)| v);

        let case_sensitive = get("caseSensitive")
            .map(|v| matches!(v, Value::Bool(true)))
            .unwrap_or(false);
        let key_case_sensitive = get("keyCaseSensitive")
            .map(|v| matches!(v, Value::Bool(true)))
            .unwrap_or(case_sensitive);
        let except = get("except").and_then(Value::as_str).map(str::to_string);

        let xpath = get("xpath").map(|v| parse_xpath_selector(v)).transpose()?;
        let jsonpath = get("jsonpath").map(|v| parse_jsonpath_selector(v)).transpose()?;
        let selector = match (xpath, jsonpath) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::new(
                    "predicate declares both xpath and jsonpath selectors",
                ))
            }
            (Some(x), None) => Some(x),
            (None, Some(j)) => Some(j),
            (None, None) => None,
        };

        Ok(PredicateConfig {
            case_sensitive,
            key_case_sensitive,
            except,
            selector,
        })
    }
}

fn parse_xpath_selector(v: &Value) -> Result<Selector, ValidationError> {
    let selector = v
        .get("selector")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("xpath config requires a `selector` string"))?
        .to_string();
    let ns = v
        .get("ns")
        .and_then(Value::as_record)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    Ok(Selector::XPath { selector, ns })
}

fn parse_jsonpath_selector(v: &Value) -> Result<Selector, ValidationError> {
    let selector = v
        .get("selector")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("jsonpath config requires a `selector` string"))?
        .to_string();
    Ok(Selector::JsonPath { selector })
}

/// Evaluate a leaf operator. `expected` is the operator's raw value (e.g.
/// `predicate.equals`); `actual` is the raw request record.
pub fn evaluate(
    operator: Operator,
    expected: &Value,
    actual: &Value,
    predicate_cfg: &PredicateConfig,
    eval_cfg: &EvalConfig,
) -> Result<bool, PredicateError> {
    if eval_cfg.is_base64() {
        if predicate_cfg.selector.is_some() {
            return Err(ValidationError::new(
                "xpath/jsonpath selectors are not supported in base64 mode",
            )
            .into());
        }
        if operator == Operator::Matches {
            return Err(ValidationError::new("matches is not supported in base64 mode").into());
        }
    }

    // `matches` forces case_sensitive:=true for value normalization so
    // regex metacharacters are never lower-cased, but the regex's own case
    // (in)sensitivity is still driven by the predicate's original flag.
    let normalize_case_sensitive = match operator {
        Operator::Matches => true,
        _ => predicate_cfg.case_sensitive,
    };

    let except_re: Option<Regex> = predicate_cfg
        .except
        .as_deref()
        .map(|pattern| compile_regex(pattern, predicate_cfg.case_sensitive, eval_cfg.regex_size_limit))
        .transpose()?;

    let should_force_strings = operator == Operator::DeepEquals;

    let (expected_prepped, actual_prepped) = if should_force_strings {
        (force_strings(expected), force_strings(actual))
    } else {
        (expected.clone(), actual.clone())
    };

    let expected_opts = NormalizeOpts {
        encoding: eval_cfg.encoding,
        with_selectors: false,
        should_force_strings,
        case_sensitive: normalize_case_sensitive,
        key_case_sensitive: predicate_cfg.key_case_sensitive,
        except: except_re.as_ref(),
        selector: None,
    };
    let actual_opts = NormalizeOpts {
        encoding: eval_cfg.encoding,
        with_selectors: true,
        should_force_strings,
        case_sensitive: normalize_case_sensitive,
        key_case_sensitive: predicate_cfg.key_case_sensitive,
        except: except_re.as_ref(),
        selector: predicate_cfg.selector.as_ref(),
    };

    let expected_norm = normalize(&expected_prepped, &expected_opts)?;
    let actual_norm = normalize(&actual_prepped, &actual_opts)?;

    let ctx = MatchContext {
        try_json_opts: TryJsonOpts {
            case_sensitive: normalize_case_sensitive,
            key_case_sensitive: predicate_cfg.key_case_sensitive,
            except: except_re.as_ref(),
            force_strings: should_force_strings,
        },
        operator_is_exists: operator == Operator::Exists,
    };

    let matches_regex_case_sensitive = predicate_cfg.case_sensitive;
    let leaf_fn: Box<LeafFn<'_>> = match operator {
        Operator::Equals | Operator::DeepEquals => {
            Box::new(|e: &Value, a: &Value| e.to_comparison_string() == a.to_comparison_string())
        }
        Operator::Contains => Box::new(|e: &Value, a: &Value| {
            a.to_comparison_string().contains(&e.to_comparison_string())
        }),
        Operator::StartsWith => Box::new(|e: &Value, a: &Value| {
            a.to_comparison_string().starts_with(&e.to_comparison_string())
        }),
        Operator::EndsWith => Box::new(|e: &Value, a: &Value| {
            a.to_comparison_string().ends_with(&e.to_comparison_string())
        }),
        Operator::Exists => Box::new(exists_leaf),
        Operator::Matches => {
            let size_limit = eval_cfg.regex_size_limit;
            Box::new(move |e: &Value, a: &Value| {
                match compile_regex(&e.to_comparison_string(), matches_regex_case_sensitive, size_limit) {
                    Ok(re) => re.is_match(&a.to_comparison_string()),
                    Err(_) => false,
                }
            })
        }
    };

    Ok(test_predicate(&expected_norm, Some(&actual_norm), &ctx, leaf_fn.as_ref()))
}

fn exists_leaf(expected: &Value, actual: &Value) -> bool {
    let want = matches!(expected, Value::Bool(true)) || expected.as_str() == Some("true");
    let actual_empty = actual.to_comparison_string().is_empty();
    if want {
        !actual_empty
    } else {
        actual_empty
    }
}

//! The `Value` tree the evaluator is polymorphic over.
//!
//! Predicates, requests, selector results, and normalized intermediates are
//! all represented with this one recursive type rather than as raw
//! `serde_json::Value`, so the matcher and normalizer never have to special
//! case `serde_json`'s `Map`/`Vec` distinction from anything else in the
//! pipeline.

use serde_json::{Map, Number};
use std::cmp::Ordering;

/// A scalar, sequence, or record in the predicate/request value tree.
///
/// Record key order is preserved (it is what a host originally sent) but is
/// never semantically significant except where a component explicitly says
/// otherwise (selectors, canonical JSON).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Record(Vec<(String, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Whether this value is "empty" for `exists` purposes: absent, null,
    /// an empty string, or an empty sequence/record.
    pub fn is_empty_for_exists(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Sequence(s) => s.is_empty(),
            Value::Record(r) => r.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    /// Look up a field on a `Record`. Returns `None` for non-records and
    /// missing keys alike — the matcher treats both as "undefined".
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render a scalar as the string the matcher's leaf comparators operate
    /// on. Only meaningful after normalization has reduced a leaf to one of
    /// these cases.
    pub fn to_comparison_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(_) | Value::Record(_) => {
                serde_json::to_string(&self.to_json()).unwrap_or_default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Record(fields) => {
                let mut map = Map::new();
                for (k, v) in fields {
                    map.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Record(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        v.to_json()
    }
}

/// Total order over value trees, used to make `Ord` for the array-sort
/// normalization transform (see `normalize::array_xform`). Not a general
/// `Ord` impl: two values that differ only in key order or record field
/// order compare equal here (canonical JSON collapses that), which is the
/// point — sorting must be stable across presentation-only differences.
pub fn canonical_cmp(a: &Value, b: &Value) -> Ordering {
    crate::canonical::canonical_json(a).cmp(&crate::canonical::canonical_json(b))
}

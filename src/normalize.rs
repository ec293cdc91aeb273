//! The normalizer (§4.3): recursively applies key, value, and array
//! transforms to a value tree in a fixed order. Grounded on the teacher's
//! `matcher::CachedValue`/`string_matcher::CompiledExcept` composition,
//! restructured as a pure recursive function with no persistent "compile"
//! step, since the spec's Non-goals forbid caching across `evaluate()`
//! calls. Step ordering and naming mirror oatf's `normalize.rs`.

use regex::Regex;
use std::collections::BTreeMap;

use crate::config::Encoding;
use crate::error::SelectorError;
use crate::selectors::Selector;
use crate::transforms::{base64_decode, except, lowercase, TryJsonOpts};
use crate::value::Value;

/// Per-predicate normalization options, derived from the predicate's
/// sibling config keys (§3) and the crate's `EvalConfig`.
pub struct NormalizeOpts<'a> {
    pub encoding: Encoding,
    /// True only for the actual side (§4.3).
    pub with_selectors: bool,
    /// True only when the enclosing operator is `deepEquals` (§4.5).
    pub should_force_strings: bool,
    pub case_sensitive: bool,
    pub key_case_sensitive: bool,
    pub except: Option<&'a Regex>,
    pub selector: Option<&'a Selector>,
}

impl<'a> NormalizeOpts<'a> {
    fn without_selector(&self) -> NormalizeOpts<'a> {
        NormalizeOpts {
            encoding: self.encoding,
            with_selectors: false,
            should_force_strings: self.should_force_strings,
            case_sensitive: self.case_sensitive,
            key_case_sensitive: self.key_case_sensitive,
            except: self.except,
            selector: None,
        }
    }

    fn try_json_opts(&self) -> TryJsonOpts<'_> {
        TryJsonOpts {
            case_sensitive: self.case_sensitive,
            key_case_sensitive: self.key_case_sensitive,
            except: self.except,
            force_strings: self.should_force_strings,
        }
    }
}

/// `normalize(value, cfg, opts) -> Value`. `should_force_strings` is
/// applied by the caller (`operators::deep_equals`) before this is called,
/// matching §4.5's "applies `force_strings` to both sides first" — this
/// function itself only folds keys/values/arrays.
pub fn normalize(value: &Value, opts: &NormalizeOpts<'_>) -> Result<Value, SelectorError> {
    transform_all(value, opts)
}

fn transform_all(value: &Value, opts: &NormalizeOpts<'_>) -> Result<Value, SelectorError> {
    match value {
        Value::Sequence(items) => {
            let mut transformed = items
                .iter()
                .map(|v| transform_all(v, opts))
                .collect::<Result<Vec<_>, _>>()?;
            transformed.sort_by(crate::value::canonical_cmp);
            Ok(Value::Sequence(transformed))
        }
        Value::Record(fields) => {
            let mut order: Vec<String> = Vec::new();
            let mut map: BTreeMap<String, Value> = BTreeMap::new();
            for (k, v) in fields {
                let folded_key = if opts.key_case_sensitive {
                    k.clone()
                } else {
                    lowercase(k)
                };
                let transformed_value = transform_all(v, opts)?;
                if !map.contains_key(&folded_key) {
                    order.push(folded_key.clone());
                }
                map.insert(folded_key, transformed_value);
            }
            Ok(Value::Record(
                order
                    .into_iter()
                    .map(|k| {
                        let v = map.remove(&k).expect("key pushed into order exists in map");
                        (k, v)
                    })
                    .collect(),
            ))
        }
        Value::String(s) => transform_string_leaf(s, opts),
        other => Ok(other.clone()),
    }
}

fn transform_string_leaf(s: &str, opts: &NormalizeOpts<'_>) -> Result<Value, SelectorError> {
    if opts.with_selectors {
        if let Some(selector) = opts.selector {
            let extracted = selector.apply(s, opts.case_sensitive, &opts.try_json_opts())?;
            return transform_all(&extracted, &opts.without_selector());
        }
    }

    let folded = except(s, opts.except);
    let folded = if opts.case_sensitive {
        folded
    } else {
        lowercase(&folded)
    };
    let folded = match opts.encoding {
        Encoding::Base64 => base64_decode(&folded),
        Encoding::Utf8 => folded,
    };
    Ok(Value::String(folded))
}

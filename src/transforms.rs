//! Scalar transforms (§4.1): `lowercase`, `except`, `base64_decode`,
//! `force_strings`, `try_json`. Each has signature `String -> String` (or
//! `Value -> Value` where the spec calls that out) and they are composed by
//! the normalizer in a fixed order; `try_json` is also called directly by
//! the JSONPath selector and by the matcher's JSON-in-string reach-through.

use base64::Engine as _;
use regex::{Regex, RegexBuilder};

use crate::error::RegexError;
use crate::value::Value;

/// Unicode-aware lower-case fold.
pub fn lowercase(s: &str) -> String {
    s.to_lowercase()
}

/// Compile `pattern` honoring the crate's regex size limit, case-folding
/// per `case_sensitive`.
pub fn compile_regex(pattern: &str, case_sensitive: bool, size_limit: usize) -> Result<Regex, RegexError> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .size_limit(size_limit)
        .build()
        .map_err(|source| RegexError {
            pattern: pattern.to_string(),
            source,
        })
}

/// Remove every occurrence of `pattern` (interpreted as a regex) from `s`.
/// `pattern: None` is identity.
pub fn except(s: &str, pattern: Option<&Regex>) -> String {
    match pattern {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

/// Decode `s` as standard base64, reinterpreting the bytes as UTF-8. Only
/// meaningful when `cfg.encoding == Base64`; invalid base64 or invalid
/// UTF-8 falls back to the original string rather than erroring, since a
/// non-base64 leaf simply isn't the encoded field the caller expected.
pub fn base64_decode(s: &str) -> String {
    match base64::engine::general_purpose::STANDARD.decode(s) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| s.to_string()),
        Err(_) => s.to_string(),
    }
}

/// Recursive coercion to strings, applied only by `deepEquals`.
pub fn force_strings(value: &Value) -> Value {
    match value {
        Value::Null => Value::string("null"),
        Value::Bool(b) => Value::string(if *b { "true" } else { "false" }),
        Value::Number(n) => Value::string(n.to_string()),
        Value::String(s) => Value::String(s.clone()),
        Value::Sequence(items) => Value::Sequence(items.iter().map(force_strings).collect()),
        Value::Record(fields) => Value::Record(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), force_strings(v)))
                .collect(),
        ),
    }
}

/// Options for re-parsing a string as JSON (§4.1 `try_json`, §9 "Lazy
/// re-parsing of JSON-in-string").
#[derive(Debug, Clone, Copy)]
pub struct TryJsonOpts<'a> {
    pub case_sensitive: bool,
    pub key_case_sensitive: bool,
    pub except: Option<&'a Regex>,
    /// Only the JSONPath selector path sets this; the matcher's
    /// JSON-in-string reach-through does not (§9).
    pub force_strings: bool,
}

/// Attempt to parse `s` as JSON. On success, apply key-lowercase,
/// value-except, and value-case transforms recursively (but never the
/// array-sort transform, which would invalidate indexed selectors like
/// `$..title[1]`). On parse failure, return the string unchanged.
pub fn try_json(s: &str, opts: &TryJsonOpts) -> Value {
    let parsed: serde_json::Value = match serde_json::from_str(s) {
        Ok(v) => v,
        Err(_) => return Value::string(s),
    };
    let mut value = Value::from(parsed);
    if opts.force_strings {
        value = force_strings(&value);
    }
    fold_value(&value, opts)
}

fn fold_value(value: &Value, opts: &TryJsonOpts) -> Value {
    match value {
        Value::String(s) => {
            let folded = except(s, opts.except);
            let folded = if opts.case_sensitive {
                folded
            } else {
                lowercase(&folded)
            };
            Value::String(folded)
        }
        Value::Sequence(items) => {
            Value::Sequence(items.iter().map(|v| fold_value(v, opts)).collect())
        }
        Value::Record(fields) => Value::Record(
            fields
                .iter()
                .map(|(k, v)| {
                    let key = if opts.key_case_sensitive {
                        k.clone()
                    } else {
                        lowercase(k)
                    };
                    (key, fold_value(v, opts))
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

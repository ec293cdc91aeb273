//! Selector sublanguage (§4.2): XPath and JSONPath extraction from the
//! actual side of a comparison, each collapsing to a scalar or a sequence.

pub mod jsonpath;
pub mod xpath;

use crate::error::SelectorError;
use crate::value::Value;

/// An XPath or JSONPath selector, as declared by a predicate's `xpath` or
/// `jsonpath` sibling key (§3).
#[derive(Debug, Clone)]
pub enum Selector {
    XPath {
        selector: String,
        ns: Vec<(String, String)>,
    },
    JsonPath {
        selector: String,
    },
}

impl Selector {
    /// Apply this selector to a raw string leaf of the actual value tree.
    /// `case_sensitive` controls whether the selector string (and XPath
    /// namespace bindings) are lower-cased before evaluation, per §4.2.
    /// JSONPath additionally re-parses `leaf` as JSON via `try_json` first,
    /// using `jsonpath_opts` for that re-parse's own key/value folding.
    pub fn apply(
        &self,
        leaf: &str,
        case_sensitive: bool,
        jsonpath_opts: &crate::transforms::TryJsonOpts<'_>,
    ) -> Result<Value, SelectorError> {
        match self {
            Selector::XPath { selector, ns } => {
                let (selector, ns) = if case_sensitive {
                    (selector.clone(), ns.clone())
                } else {
                    (
                        selector.to_lowercase(),
                        ns.iter()
                            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
                            .collect(),
                    )
                };
                xpath::evaluate(leaf, &selector, &ns)
            }
            Selector::JsonPath { selector } => {
                let selector = if case_sensitive {
                    selector.clone()
                } else {
                    selector.to_lowercase()
                };
                let parsed = crate::transforms::try_json(leaf, jsonpath_opts);
                jsonpath::evaluate(&parsed, &selector)
            }
        }
    }
}

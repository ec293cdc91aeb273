//! XPath selector evaluation (§4.2), grounded on the teacher's
//! `predicate::body_matcher::extract_xpath` but generalized to return every
//! matched node (not just the first) and to accept namespace bindings.

use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value as XPathValue};

use crate::error::{SelectorError, SelectorKind};
use crate::value::Value;

/// Evaluate `selector` against the XML text `body`, under namespace
/// bindings `ns`. Collapses to a single `String` when exactly one node
/// matches, to a `Sequence` of `String` otherwise; an empty match yields an
/// empty `Sequence`.
pub fn evaluate(body: &str, selector: &str, ns: &[(String, String)]) -> Result<Value, SelectorError> {
    let package = parser::parse(body).map_err(|e| SelectorError {
        kind: SelectorKind::XPath,
        selector: selector.to_string(),
        message: format!("XML parse error: {e}"),
    })?;
    let document = package.as_document();

    let factory = Factory::new();
    let xpath = factory
        .build(selector)
        .map_err(|e| SelectorError {
            kind: SelectorKind::XPath,
            selector: selector.to_string(),
            message: e.to_string(),
        })?
        .ok_or_else(|| SelectorError {
            kind: SelectorKind::XPath,
            selector: selector.to_string(),
            message: "empty XPath expression".to_string(),
        })?;

    let mut context = Context::new();
    for (prefix, uri) in ns {
        context.set_namespace(prefix, uri);
    }

    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| SelectorError {
            kind: SelectorKind::XPath,
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

    Ok(collapse(value))
}

fn collapse(value: XPathValue) -> Value {
    match value {
        XPathValue::String(s) => Value::Sequence(vec![Value::string(s)]).collapse_one(),
        XPathValue::Number(n) => {
            let rendered = if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                n.to_string()
            };
            Value::Sequence(vec![Value::string(rendered)]).collapse_one()
        }
        XPathValue::Boolean(b) => Value::Sequence(vec![Value::string(b.to_string())]).collapse_one(),
        XPathValue::Nodeset(nodes) => {
            let strings: Vec<Value> = nodes.iter().map(|n| Value::string(n.string_value())).collect();
            Value::Sequence(strings).collapse_one()
        }
    }
}

trait CollapseOne {
    fn collapse_one(self) -> Value;
}

impl CollapseOne for Value {
    fn collapse_one(self) -> Value {
        match self {
            Value::Sequence(mut items) if items.len() == 1 => items.remove(0),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_match_collapses_to_scalar() {
        let result = evaluate("<doc><a>hi</a></doc>", "//a", &[]).unwrap();
        assert_eq!(result.as_str(), Some("hi"));
    }

    #[test]
    fn multiple_matches_collapse_to_sequence() {
        let result = evaluate("<doc><a>1</a><a>2</a></doc>", "//a", &[]).unwrap();
        assert_eq!(result.as_sequence().unwrap().len(), 2);
    }

    #[test]
    fn no_match_yields_empty_sequence() {
        let result = evaluate("<doc></doc>", "//missing", &[]).unwrap();
        assert_eq!(result.as_sequence(), Some(&[][..]));
    }

    #[test]
    fn attribute_selection() {
        let result = evaluate("<doc id=\"7\"/>", "/doc/@id", &[]).unwrap();
        assert_eq!(result.as_str(), Some("7"));
    }

    #[test]
    fn namespace_binding() {
        let result = evaluate(
            "<ns:doc xmlns:ns=\"urn:test\"><ns:a>hi</ns:a></ns:doc>",
            "//ns:a",
            &[("ns".to_string(), "urn:test".to_string())],
        )
        .unwrap();
        assert_eq!(result.as_str(), Some("hi"));
    }
}

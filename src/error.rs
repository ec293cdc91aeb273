//! Error kinds surfaced by the evaluator (see §7 of the design notes).
//!
//! The top-level `PredicateError` keeps a hand-written `Display` rather than
//! a `thiserror` derive, since its text is operator-specific and reads more
//! naturally hand-composed; the small leaf kinds underneath it use
//! `thiserror` since they're plain message wrappers.

use std::fmt;

use crate::value::Value;

/// A regex failed to compile, or exceeded the configured size limit.
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct RegexError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A selector (XPath or JSONPath) expression failed to parse or evaluate.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} selector `{selector}`: {message}")]
pub struct SelectorError {
    pub kind: SelectorKind,
    pub selector: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    XPath,
    JsonPath,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::XPath => write!(f, "xpath"),
            SelectorKind::JsonPath => write!(f, "jsonpath"),
        }
    }
}

/// Why a predicate was rejected before (or instead of) being evaluated.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
    /// A rendering of the offending predicate fragment, for diagnostics.
    pub source: Option<Value>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: Value) -> Self {
        ValidationError {
            message: message.into(),
            source: Some(source),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid predicate: {}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source.to_json())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Failure inside a user `inject` script.
#[derive(Debug, Clone)]
pub struct InjectionError {
    pub message: String,
    pub source_text: String,
    pub data: Option<Value>,
}

impl InjectionError {
    pub fn new(message: impl Into<String>, source_text: impl Into<String>) -> Self {
        InjectionError {
            message: message.into(),
            source_text: source_text.into(),
            data: None,
        }
    }
}

impl fmt::Display for InjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "injection failed: {} (source: {})",
            self.message, self.source_text
        )
    }
}

impl std::error::Error for InjectionError {}

/// The evaluator's top-level error type.
#[derive(Debug, Clone)]
pub enum PredicateError {
    Validation(ValidationError),
    Injection(InjectionError),
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateError::Validation(e) => write!(f, "{e}"),
            PredicateError::Injection(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PredicateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PredicateError::Validation(e) => Some(e),
            PredicateError::Injection(e) => Some(e),
        }
    }
}

impl From<ValidationError> for PredicateError {
    fn from(e: ValidationError) -> Self {
        PredicateError::Validation(e)
    }
}

impl From<InjectionError> for PredicateError {
    fn from(e: InjectionError) -> Self {
        PredicateError::Injection(e)
    }
}

impl From<RegexError> for PredicateError {
    fn from(e: RegexError) -> Self {
        PredicateError::Validation(ValidationError::new(e.to_string()))
    }
}

impl From<SelectorError> for PredicateError {
    fn from(e: SelectorError) -> Self {
        PredicateError::Validation(ValidationError::new(e.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, PredicateError>;

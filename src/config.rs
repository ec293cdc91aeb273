//! Crate-level configuration (§4.10): knobs that belong to the hosting
//! environment rather than to any single predicate.

/// String encoding of request bodies fed into the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Base64,
}

/// Default compiled-program size limit `regex` itself uses (10 MiB), kept
/// as a named constant so `EvalConfig::default()` and callers agree on it.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub encoding: Encoding,
    pub inject_enabled: bool,
    pub regex_size_limit: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            encoding: Encoding::Utf8,
            inject_enabled: false,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl EvalConfig {
    pub fn is_base64(&self) -> bool {
        matches!(self.encoding, Encoding::Base64)
    }
}

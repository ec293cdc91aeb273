//! `inject` (§4.6, §6): the user-code escape hatch. Grounded on the
//! teacher's `scripting::rhai_engine::RhaiEngine` (`Engine`/`AST`/`Scope`,
//! compile-then-run), repurposed from fault-injection scripting into the
//! `Injector` extension point this crate exposes.

use crate::config::EvalConfig;
use crate::error::{InjectionError, PredicateError, Result, ValidationError};
use crate::logger::Logger;
use crate::value::Value;

/// The extension point for executing `inject` source (§6). The crate ships
/// `RhaiInjector` as the default, feature-gated behind `inject-rhai`; hosts
/// that need different sandboxing semantics implement this themselves.
pub trait Injector {
    fn invoke(
        &self,
        source: &str,
        scope: &Value,
        logger: &dyn Logger,
        imposter_state: &mut Value,
    ) -> std::result::Result<bool, String>;
}

#[cfg(feature = "inject-rhai")]
mod rhai_injector {
    use super::*;
    use rhai::serde::{from_dynamic, to_dynamic};
    use rhai::{Engine, Scope};

    /// Default `Injector`, backed by the [Rhai](https://rhai.rs) scripting
    /// VM — synchronous, deterministic, non-reentrant, and already a
    /// dependency elsewhere in the ambient stack for scripted fault
    /// injection.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RhaiInjector;

    impl Injector for RhaiInjector {
        fn invoke(
            &self,
            source: &str,
            scope: &Value,
            _logger: &dyn Logger,
            imposter_state: &mut Value,
        ) -> std::result::Result<bool, String> {
            let engine = Engine::new();
            let ast = engine.compile(source).map_err(|e| e.to_string())?;

            let mut rhai_scope = Scope::new();
            let request_dynamic = to_dynamic(scope.to_json()).map_err(|e| e.to_string())?;
            let imposter_dynamic = to_dynamic(imposter_state.to_json()).map_err(|e| e.to_string())?;
            rhai_scope.push("request", request_dynamic);
            rhai_scope.push("imposterState", imposter_dynamic);

            let result: rhai::Dynamic = engine
                .eval_ast_with_scope(&mut rhai_scope, &ast)
                .map_err(|e| e.to_string())?;

            if let Some(updated) = rhai_scope.get_value::<rhai::Dynamic>("imposterState") {
                if let Ok(json) = from_dynamic::<serde_json::Value>(&updated) {
                    *imposter_state = Value::from(json);
                }
            }

            Ok(result.as_bool().unwrap_or(!result.is_unit()))
        }
    }
}

#[cfg(feature = "inject-rhai")]
pub use rhai_injector::RhaiInjector;

/// Run an `inject` predicate. `scope` is a deep copy of the request;
/// `request.isDryRun == true` short-circuits to `true` without executing
/// user code (§4.6).
pub fn evaluate_inject(
    source: &Value,
    request: &Value,
    cfg: &EvalConfig,
    logger: &dyn Logger,
    imposter_state: &mut Value,
) -> Result<bool> {
    let source = source
        .as_str()
        .ok_or_else(|| ValidationError::with_source("inject requires a string source", source.clone()))?;

    if !cfg.inject_enabled {
        return Err(ValidationError::new("inject is disabled by this evaluator's configuration").into());
    }

    let is_dry_run = request
        .get("isDryRun")
        .map(|v| matches!(v, Value::Bool(true)))
        .unwrap_or(false);
    if is_dry_run {
        return Ok(true);
    }

    #[cfg(feature = "inject-rhai")]
    let injector = RhaiInjector;
    #[cfg(not(feature = "inject-rhai"))]
    let injector = NoInjector;

    injector
        .invoke(source, request, logger, imposter_state)
        .map_err(|message| {
            logger.error(&format!("inject failed: {message}"));
            PredicateError::Injection(InjectionError::new(message, source))
        })
}

#[cfg(not(feature = "inject-rhai"))]
struct NoInjector;

#[cfg(not(feature = "inject-rhai"))]
impl Injector for NoInjector {
    fn invoke(
        &self,
        _source: &str,
        _scope: &Value,
        _logger: &dyn Logger,
        _imposter_state: &mut Value,
    ) -> std::result::Result<bool, String> {
        Err("inject support requires the `inject-rhai` feature (or a host-supplied Injector)".to_string())
    }
}

#[cfg(all(test, feature = "inject-rhai"))]
mod tests {
    use super::*;
    use crate::logger::NullLogger;
    use serde_json::json;

    #[test]
    fn dry_run_short_circuits() {
        let source = Value::string("true");
        let request = Value::from(json!({"isDryRun": true}));
        let cfg = EvalConfig {
            inject_enabled: true,
            ..EvalConfig::default()
        };
        let mut state = Value::Null;
        let out = evaluate_inject(&source, &request, &cfg, &NullLogger, &mut state).unwrap();
        assert!(out);
    }

    #[test]
    fn disabled_by_config_fails_fast() {
        let source = Value::string("true");
        let request = Value::from(json!({}));
        let cfg = EvalConfig::default();
        let mut state = Value::Null;
        let err = evaluate_inject(&source, &request, &cfg, &NullLogger, &mut state).unwrap_err();
        assert!(matches!(err, PredicateError::Validation(_)));
    }

    #[test]
    fn executes_rhai_source() {
        let source = Value::string("request.m == \"GET\"");
        let request = Value::from(json!({"m": "GET"}));
        let cfg = EvalConfig {
            inject_enabled: true,
            ..EvalConfig::default()
        };
        let mut state = Value::Null;
        let out = evaluate_inject(&source, &request, &cfg, &NullLogger, &mut state).unwrap();
        assert!(out);
    }
}

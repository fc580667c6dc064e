use std::sync::Arc;

use rhai::{Dynamic, Scope, INT};
use sp_core::{Configuration, Payload, TransactionManager, Value};

use crate::bridge::value_to_dynamic;
use crate::handles::{ConfigHandle, ScriptContext, ScriptLogger, TmHandle};

/// The only variables a phase script can see.
pub const BINDING_NAMES: [&str; 5] = ["id", "ctx", "log", "tm", "cfg"];

/// Variable environment for one script invocation (or one cached interpreter).
#[derive(Clone)]
pub struct Binding {
    pub id: i64,
    pub ctx: Dynamic,
    pub log: ScriptLogger,
    pub tm: Option<TmHandle>,
    pub cfg: ConfigHandle,
}

impl Binding {
    pub fn new(
        id: i64,
        payload: &Payload,
        log: ScriptLogger,
        tm: Option<Arc<dyn TransactionManager>>,
        cfg: Arc<Configuration>,
    ) -> Self {
        let ctx = match payload {
            Payload::Context(context) => Dynamic::from(ScriptContext::new(context)),
            Payload::Opaque(json) => value_to_dynamic(&Value::from(json.clone())),
        };
        Self {
            id,
            ctx,
            log,
            tm: tm.map(TmHandle::new),
            cfg: ConfigHandle::new(cfg),
        }
    }

    pub fn into_scope(self) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant("id", self.id as INT);
        scope.push_constant_dynamic("ctx", self.ctx);
        scope.push_constant("log", self.log);
        match self.tm {
            Some(tm) => scope.push_constant("tm", tm),
            None => scope.push_constant_dynamic("tm", Dynamic::UNIT),
        };
        scope.push_constant("cfg", self.cfg);
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sp_core::{Context, TracingLogSink};

    fn binding(payload: &Payload) -> Binding {
        Binding::new(
            7,
            payload,
            ScriptLogger::new("binding-test", Arc::new(TracingLogSink)),
            None,
            Arc::new(Configuration::new()),
        )
    }

    #[test]
    fn scope_exposes_exactly_the_binding_names() {
        let scope = binding(&Payload::from(Context::new())).into_scope();
        let names = scope.iter().map(|(name, _, _)| name.to_string()).collect::<Vec<_>>();
        assert_eq!(names, BINDING_NAMES.to_vec());
        assert!(scope.iter().all(|(_, constant, _)| constant));
        assert_eq!(scope.get_value::<INT>("id"), Some(7));
        assert!(scope.get_value::<ScriptContext>("ctx").is_some());
        assert!(scope.get_value::<Dynamic>("tm").map(|tm| tm.is_unit()).unwrap_or(false));
    }

    #[test]
    fn opaque_payload_is_bound_as_plain_value() {
        let payload = Payload::from(serde_json::json!({"pan": "4111"}));
        let scope = binding(&payload).into_scope();
        let ctx = scope.get_value::<rhai::Map>("ctx").expect("opaque payload is a map");
        assert_eq!(ctx.get("pan").map(|v| v.to_string()), Some("4111".to_string()));
    }
}

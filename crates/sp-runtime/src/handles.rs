use std::sync::Arc;

use rhai::{Dynamic, Engine, EvalAltResult, Position, INT};
use sp_core::{Configuration, Context, LogLevel, LogSink, TransactionManager, WeakContext};

use crate::bridge::{dynamic_to_value, value_to_dynamic};

fn runtime_error(message: impl Into<String>) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(message.into()),
        Position::NONE,
    ))
}

/// `ctx` as seen by scripts. Holds the context weakly so a cached interpreter never
/// keeps its own transaction context alive.
#[derive(Clone, Debug)]
pub struct ScriptContext {
    context: WeakContext,
}

impl ScriptContext {
    pub fn new(context: &Context) -> Self {
        Self {
            context: context.downgrade(),
        }
    }

    fn live(&self) -> Result<Context, Box<EvalAltResult>> {
        self.context
            .upgrade()
            .ok_or_else(|| runtime_error("transaction context is no longer alive"))
    }

    fn get(&mut self, key: &str) -> Result<Dynamic, Box<EvalAltResult>> {
        Ok(self
            .live()?
            .get(key)
            .map(|value| value_to_dynamic(&value))
            .unwrap_or(Dynamic::UNIT))
    }

    fn put(&mut self, key: &str, value: Dynamic) -> Result<(), Box<EvalAltResult>> {
        let value = dynamic_to_value(value).map_err(|error| runtime_error(error.message))?;
        self.live()?.put(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<Dynamic, Box<EvalAltResult>> {
        Ok(self
            .live()?
            .remove(key)
            .map(|value| value_to_dynamic(&value))
            .unwrap_or(Dynamic::UNIT))
    }

    fn has(&mut self, key: &str) -> Result<bool, Box<EvalAltResult>> {
        Ok(self.live()?.contains_key(key))
    }

    fn len(&mut self) -> Result<INT, Box<EvalAltResult>> {
        Ok(self.live()?.len() as INT)
    }
}

/// `log` as seen by scripts; every line is tagged with the participant realm.
#[derive(Clone)]
pub struct ScriptLogger {
    realm: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl ScriptLogger {
    pub fn new(realm: impl Into<Arc<str>>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            realm: realm.into(),
            sink,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn write(&self, level: LogLevel, message: &str) {
        self.sink.log(level, &self.realm, message);
    }
}

/// `tm` as seen by scripts.
#[derive(Clone)]
pub struct TmHandle {
    manager: Arc<dyn TransactionManager>,
}

impl TmHandle {
    pub fn new(manager: Arc<dyn TransactionManager>) -> Self {
        Self { manager }
    }
}

/// `cfg` as seen by scripts.
#[derive(Clone, Debug)]
pub struct ConfigHandle {
    cfg: Arc<Configuration>,
}

impl ConfigHandle {
    pub fn new(cfg: Arc<Configuration>) -> Self {
        Self { cfg }
    }
}

pub(crate) fn register_handles(engine: &mut Engine) {
    engine
        .register_type_with_name::<ScriptContext>("Context")
        .register_fn("get", ScriptContext::get)
        .register_fn("put", ScriptContext::put)
        .register_fn("remove", ScriptContext::remove)
        .register_fn("has", ScriptContext::has)
        .register_fn("len", ScriptContext::len);

    engine.register_type_with_name::<ScriptLogger>("Logger");
    for (name, level) in [
        ("debug", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("error", LogLevel::Error),
    ] {
        engine.register_fn(name, move |logger: &mut ScriptLogger, message: Dynamic| {
            logger.write(level, &message.to_string());
        });
    }

    engine
        .register_type_with_name::<TmHandle>("TransactionManager")
        .register_fn("name", |tm: &mut TmHandle| tm.manager.name().to_string())
        .register_fn("outstanding_transactions", |tm: &mut TmHandle| {
            tm.manager.outstanding_transactions() as INT
        });

    engine
        .register_type_with_name::<ConfigHandle>("Configuration")
        .register_fn("get", |cfg: &mut ConfigHandle, name: &str| {
            cfg.cfg
                .get(name)
                .map(|value| Dynamic::from(value.to_string()))
                .unwrap_or(Dynamic::UNIT)
        })
        .register_fn("get", |cfg: &mut ConfigHandle, name: &str, default: &str| {
            cfg.cfg.get_or(name, default).to_string()
        })
        .register_fn("get_bool", |cfg: &mut ConfigHandle, name: &str, default: bool| {
            cfg.cfg.get_bool(name, default)
        })
        .register_fn("get_int", |cfg: &mut ConfigHandle, name: &str, default: INT| {
            cfg.cfg.get_int(name, default as i64) as INT
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rhai::Scope;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(LogLevel, String, String)>>,
    }

    impl LogSink for RecordingSink {
        fn log(&self, level: LogLevel, realm: &str, message: &str) {
            self.lines
                .lock()
                .expect("lock")
                .push((level, realm.to_string(), message.to_string()));
        }
    }

    struct FixedTm;

    impl TransactionManager for FixedTm {
        fn name(&self) -> &str {
            "txnmgr"
        }

        fn outstanding_transactions(&self) -> i64 {
            3
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new();
        register_handles(&mut engine);
        engine
    }

    #[test]
    fn context_handle_reads_and_writes_the_host_context() {
        let context = Context::new();
        context.put("amount", 100_i64);
        let mut scope = Scope::new();
        scope.push("ctx", ScriptContext::new(&context));

        let amount = engine()
            .eval_with_scope::<INT>(
                &mut scope,
                r#"ctx.put("status", "ok"); ctx.put("list", [1, 2]); ctx.remove("missing"); ctx.get("amount") + ctx.len()"#,
            )
            .expect("script should run");
        assert_eq!(amount, 103);
        assert_eq!(context.get("status").and_then(|v| v.as_str().map(str::to_string)), Some("ok".to_string()));
        assert!(context.contains_key("list"));
    }

    #[test]
    fn context_handle_fails_after_context_is_dropped() {
        let context = Context::new();
        let mut scope = Scope::new();
        scope.push("ctx", ScriptContext::new(&context));
        drop(context);
        let error = engine()
            .eval_with_scope::<Dynamic>(&mut scope, r#"ctx.has("x")"#)
            .expect_err("dropped context should fail");
        assert!(error.to_string().contains("no longer alive"));
    }

    #[test]
    fn logger_routes_levels_with_realm() {
        let sink = Arc::new(RecordingSink::default());
        let mut scope = Scope::new();
        scope.push("log", ScriptLogger::new("realm-a", sink.clone()));
        engine()
            .run_with_scope(&mut scope, r#"log.info("hello"); log.error(42);"#)
            .expect("script should run");
        let lines = sink.lines.lock().expect("lock");
        assert_eq!(
            *lines,
            vec![
                (LogLevel::Info, "realm-a".to_string(), "hello".to_string()),
                (LogLevel::Error, "realm-a".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn tm_and_cfg_handles_expose_read_only_views() {
        let cfg = Arc::new(Configuration::new().with("limit", "500").with("strict", "yes"));
        let mut scope = Scope::new();
        scope.push("tm", TmHandle::new(Arc::new(FixedTm)));
        scope.push("cfg", ConfigHandle::new(cfg));
        let summary = engine()
            .eval_with_scope::<String>(
                &mut scope,
                r#"`${tm.name()}:${tm.outstanding_transactions()}:${cfg.get_int("limit", 0)}:${cfg.get_bool("strict", false)}:${cfg.get("mode", "fast")}:${cfg.get("nope") == ()}`"#,
            )
            .expect("script should run");
        assert_eq!(summary, "txnmgr:3:500:true:fast:true");
    }
}

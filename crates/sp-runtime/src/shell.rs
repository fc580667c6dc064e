use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rhai::{Dynamic, Engine, Scope};
use sp_core::ParticipantError;

use crate::binding::Binding;

/// Reusable interpreter that evaluates source text against a binding fixed at creation.
///
/// Top-level variables a script declares stay in the shell's scope, so later phases of
/// the same transaction can read what earlier ones left behind.
pub struct ScriptShell {
    engine: Arc<Engine>,
    scope: Mutex<Scope<'static>>,
}

impl ScriptShell {
    pub fn new(engine: Arc<Engine>, binding: Binding) -> Self {
        Self {
            engine,
            scope: Mutex::new(binding.into_scope()),
        }
    }

    pub fn evaluate(&self, source: &str, origin: &str) -> Result<Dynamic, ParticipantError> {
        let mut ast = self.engine.compile(source).map_err(|error| {
            ParticipantError::execution(
                "EXEC_EVAL_ERROR",
                format!("Rhai code for '{}' does not compile: {}", origin, error),
            )
        })?;
        ast.set_source(origin);

        let mut scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        self.engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|error| {
                ParticipantError::execution(
                    "EXEC_EVAL_ERROR",
                    format!("Rhai code for '{}' failed: {}", origin, error),
                )
            })
    }

    /// Reads `path` fresh on every call, so edits take effect on the next evaluation.
    pub fn evaluate_file(&self, path: &Path) -> Result<Dynamic, ParticipantError> {
        let source = fs::read_to_string(path).map_err(|error| {
            ParticipantError::execution(
                "EXEC_SCRIPT_READ_ERROR",
                format!("Can't read '{}': {}", path.display(), error),
            )
        })?;
        self.evaluate(&source, &path.to_string_lossy())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};

    use rhai::INT;
    use sp_core::{Configuration, Context, Payload, TracingLogSink};

    use crate::engine::new_script_engine;
    use crate::handles::ScriptLogger;

    fn shell(id: i64) -> ScriptShell {
        let binding = Binding::new(
            id,
            &Payload::from(Context::new()),
            ScriptLogger::new("shell-test", Arc::new(TracingLogSink)),
            None,
            Arc::new(Configuration::new()),
        );
        ScriptShell::new(Arc::new(new_script_engine()), binding)
    }

    #[test]
    fn top_level_variables_persist_between_evaluations() {
        let shell = shell(11);
        shell
            .evaluate("let seen = id * 2;", "prepare")
            .expect("first evaluation");
        assert!(shell.has_variable("seen"));
        let value = shell
            .evaluate("seen + 1", "commit")
            .expect("second evaluation");
        assert_eq!(value.as_int().expect("integer result"), 23 as INT);
    }

    #[test]
    fn binding_names_are_read_only() {
        let error = shell(1)
            .evaluate("id = 2;", "prepare")
            .expect_err("constants cannot be reassigned");
        assert_eq!(error.code, "EXEC_EVAL_ERROR");
        assert!(!error.is_configuration());
    }

    #[test]
    fn evaluate_file_rereads_the_file_each_time() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("sp-runtime-shell-{}.rhai", nanos));
        let shell = shell(5);

        fs::write(&path, "id + 1").expect("write script");
        let first = shell.evaluate_file(&path).expect("first read");
        fs::write(&path, "id + 2").expect("rewrite script");
        let second = shell.evaluate_file(&path).expect("second read");
        assert_eq!(first.as_int().expect("int"), 6);
        assert_eq!(second.as_int().expect("int"), 7);

        fs::remove_file(&path).expect("remove script");
        let error = shell.evaluate_file(&path).expect_err("missing file should fail");
        assert_eq!(error.code, "EXEC_SCRIPT_READ_ERROR");
    }
}

use std::sync::Arc;

use rhai::{Engine, AST};
use sp_core::ParticipantError;

/// Turns script source into reusable units with an engine built once at configuration time.
#[derive(Clone)]
pub struct ScriptCompiler {
    engine: Arc<Engine>,
}

impl ScriptCompiler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Compiles `source`; `origin` (file path or element name) and `realm` only feed
    /// diagnostics.
    pub fn compile(
        &self,
        source: &str,
        origin: &str,
        realm: &str,
    ) -> Result<Arc<AST>, ParticipantError> {
        let mut ast = self.engine.compile(source).map_err(|error| {
            ParticipantError::config(
                "CONFIG_SCRIPT_COMPILE_ERROR",
                format!(
                    "Rhai code for '{}' in '{}' does not compile: {}",
                    origin, realm, error
                ),
            )
        })?;

        if is_definition_only(&ast) {
            return Err(ParticipantError::config(
                "CONFIG_SCRIPT_NOT_RUNNABLE",
                format!(
                    "Rhai code for '{}' in '{}' must be a simple script, not a function library.",
                    origin, realm
                ),
            ));
        }

        ast.set_source(origin);
        tracing::debug!(realm, origin, "compiled phase script");
        Ok(Arc::new(ast))
    }
}

/// A unit that only declares functions has no body to run.
fn is_definition_only(ast: &AST) -> bool {
    ast.statements().is_empty() && ast.iter_functions().next().is_some()
}

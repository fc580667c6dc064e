use std::sync::Arc;

use rhai::{Dynamic, Engine};
use sp_compiler::ScriptSpec;
use sp_core::{
    Configuration, ExecutionMode, LogSink, ParticipantError, ParticipantId, Payload, Phase,
    TransactionManager,
};

use crate::binding::Binding;
use crate::handles::ScriptLogger;
use crate::shell::ScriptShell;

/// Runs resolved phase scripts for one participant.
pub struct ScriptExecutor {
    engine: Arc<Engine>,
    mode: ExecutionMode,
    owner: ParticipantId,
    logger: ScriptLogger,
    cfg: Arc<Configuration>,
    tm: Option<Arc<dyn TransactionManager>>,
}

impl ScriptExecutor {
    pub fn new(
        engine: Arc<Engine>,
        mode: ExecutionMode,
        owner: ParticipantId,
        realm: &str,
        log_sink: Arc<dyn LogSink>,
        cfg: Arc<Configuration>,
    ) -> Self {
        Self {
            engine,
            mode,
            owner,
            logger: ScriptLogger::new(realm, log_sink),
            cfg,
            tm: None,
        }
    }

    pub fn set_transaction_manager(&mut self, tm: Arc<dyn TransactionManager>) {
        self.tm = Some(tm);
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn binding(&self, id: i64, payload: &Payload) -> Binding {
        Binding::new(
            id,
            payload,
            self.logger.clone(),
            self.tm.clone(),
            self.cfg.clone(),
        )
    }

    /// Runs `spec` and returns its raw result; `None` when the phase has no script.
    pub fn execute(
        &self,
        phase: Phase,
        spec: &ScriptSpec,
        id: i64,
        payload: &Payload,
    ) -> Result<Option<Dynamic>, ParticipantError> {
        let result = match (self.mode, spec) {
            (_, ScriptSpec::Empty) => return Ok(None),
            (ExecutionMode::Compiled, ScriptSpec::CompiledUnit(ast)) => {
                let mut scope = self.binding(id, payload).into_scope();
                self.engine
                    .eval_ast_with_scope::<Dynamic>(&mut scope, ast)
                    .map_err(|error| {
                        ParticipantError::execution(
                            "EXEC_EVAL_ERROR",
                            format!("Rhai code for '{}' failed: {}", phase, error),
                        )
                    })
            }
            (ExecutionMode::Interpreted, ScriptSpec::InlineText(source)) => {
                self.shell(id, payload).evaluate(source, phase.element_name())
            }
            (ExecutionMode::Interpreted, ScriptSpec::FileRef(path)) => {
                self.shell(id, payload).evaluate_file(path)
            }
            (mode, spec) => Err(ParticipantError::execution(
                "EXEC_SPEC_MODE_MISMATCH",
                format!("{} script cannot run in {:?} mode.", spec.kind(), mode),
            )),
        };
        result.map(Some).map_err(|error| error.with_phase(phase))
    }

    /// The interpreter cached on the context for this participant, or a one-off
    /// interpreter when the payload cannot carry per-participant state.
    pub fn shell(&self, id: i64, payload: &Payload) -> Arc<ScriptShell> {
        match payload.context() {
            Some(context) => context.get_or_attach_with(self.owner, || {
                tracing::debug!(
                    realm = self.logger.realm(),
                    owner = %self.owner,
                    id,
                    "creating interpreter for transaction context"
                );
                ScriptShell::new(self.engine.clone(), self.binding(id, payload))
            }),
            None => Arc::new(ScriptShell::new(
                self.engine.clone(),
                self.binding(id, payload),
            )),
        }
    }
}

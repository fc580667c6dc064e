mod outcome;

pub use outcome::outcome_from_result;

use std::path::PathBuf;
use std::sync::Arc;

use sp_compiler::{ScriptCompiler, ScriptResolver, ScriptSpec};
use sp_core::{
    AbortParticipant, ExecutionMode, LogLevel, LogSink, Outcome, ParticipantError,
    ParticipantId, Payload, Phase, TracingLogSink, TransactionManager, TransactionParticipant,
};
use sp_parser::{parse_participant_config, ParticipantConfig};
use sp_runtime::{new_script_engine, ScriptExecutor};

#[derive(Clone, Default)]
pub struct ParticipantOptions {
    /// Receives participant diagnostics and script `log` output; defaults to `tracing`.
    pub log_sink: Option<Arc<dyn LogSink>>,
    /// Directory that relative `src` paths are resolved against.
    pub base_dir: Option<PathBuf>,
}

struct PhaseScripts {
    prepare: ScriptSpec,
    prepare_for_abort: ScriptSpec,
    commit: ScriptSpec,
    abort: ScriptSpec,
}

impl PhaseScripts {
    fn get(&self, phase: Phase) -> &ScriptSpec {
        match phase {
            Phase::Prepare => &self.prepare,
            Phase::PrepareForAbort => &self.prepare_for_abort,
            Phase::Commit => &self.commit,
            Phase::Abort => &self.abort,
        }
    }
}

/// Transaction participant whose phases are Rhai scripts supplied by configuration.
///
/// ```xml
/// <participant realm="rhai-test">
///   <property name="compiled" value="false"/>
///   <prepare src="deploy/prepare.rhai"/>
///   <commit><![CDATA[ log.info(`committed ${id}`); ]]></commit>
/// </participant>
/// ```
pub struct ScriptParticipant {
    id: ParticipantId,
    realm: String,
    scripts: PhaseScripts,
    executor: ScriptExecutor,
    log_sink: Arc<dyn LogSink>,
}

impl ScriptParticipant {
    pub fn from_xml(source: &str, options: ParticipantOptions) -> Result<Self, ParticipantError> {
        Self::new(parse_participant_config(source)?, options)
    }

    pub fn new(
        config: ParticipantConfig,
        options: ParticipantOptions,
    ) -> Result<Self, ParticipantError> {
        let id = ParticipantId::next();
        let realm = config.realm.clone().unwrap_or_else(|| id.to_string());
        let log_sink = options
            .log_sink
            .unwrap_or_else(|| Arc::new(TracingLogSink));
        let mode = ExecutionMode::from_compiled_flag(config.compiled());

        if config.script(Phase::Prepare).is_none() {
            log_sink.log(
                LogLevel::Warn,
                &realm,
                "ScriptParticipant without 'prepare' element.",
            );
        }

        let engine = Arc::new(new_script_engine());
        let compiler = ScriptCompiler::new(engine.clone());
        let resolver = ScriptResolver {
            mode,
            compiler: &compiler,
            base_dir: options.base_dir.as_deref(),
            realm: &realm,
        };
        let scripts = PhaseScripts {
            prepare: resolver.resolve(config.script(Phase::Prepare))?,
            prepare_for_abort: resolver.resolve(config.script(Phase::PrepareForAbort))?,
            commit: resolver.resolve(config.script(Phase::Commit))?,
            abort: resolver.resolve(config.script(Phase::Abort))?,
        };

        let executor = ScriptExecutor::new(
            engine,
            mode,
            id,
            &realm,
            log_sink.clone(),
            Arc::new(config.properties),
        );
        tracing::debug!(realm = %realm, ?mode, "participant configured");

        Ok(Self {
            id,
            realm,
            scripts,
            executor,
            log_sink,
        })
    }

    pub fn set_transaction_manager(&mut self, tm: Arc<dyn TransactionManager>) {
        self.executor.set_transaction_manager(tm);
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn mode(&self) -> ExecutionMode {
        self.executor.mode()
    }

    pub fn script(&self, phase: Phase) -> &ScriptSpec {
        self.scripts.get(phase)
    }

    /// Shared body of `prepare` and `prepare_for_abort`.
    fn run_for_outcome(&self, phase: Phase, id: i64, payload: &Payload) -> Outcome {
        let raw = match self.executor.execute(phase, self.script(phase), id, payload) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Outcome::NOTHING_TO_DO,
            Err(error) => return self.report(phase, id, error),
        };
        match outcome_from_result(raw) {
            Ok(outcome) => outcome,
            Err(error) => self.report(phase, id, error.with_phase(phase)),
        }
    }

    /// Shared body of `commit` and `abort`; failures are logged and dropped.
    fn run_for_effect(&self, phase: Phase, id: i64, payload: &Payload) {
        if let Err(error) = self.executor.execute(phase, self.script(phase), id, payload) {
            self.report(phase, id, error);
        }
    }

    fn report(&self, phase: Phase, id: i64, error: ParticipantError) -> Outcome {
        self.log_sink.log(
            LogLevel::Error,
            &self.realm,
            &format!("{} failed for transaction {}: {}", phase, id, error),
        );
        Outcome::ABORTED
    }
}

impl TransactionParticipant for ScriptParticipant {
    fn prepare(&self, id: i64, payload: &Payload) -> Outcome {
        self.run_for_outcome(Phase::Prepare, id, payload)
    }

    fn commit(&self, id: i64, payload: &Payload) {
        self.run_for_effect(Phase::Commit, id, payload);
    }

    fn abort(&self, id: i64, payload: &Payload) {
        self.run_for_effect(Phase::Abort, id, payload);
    }
}

impl AbortParticipant for ScriptParticipant {
    fn prepare_for_abort(&self, id: i64, payload: &Payload) -> Outcome {
        self.run_for_outcome(Phase::PrepareForAbort, id, payload)
    }
}

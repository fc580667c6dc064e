use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use sp_api::{ParticipantOptions, ScriptParticipant};
use sp_core::{
    AbortParticipant, Context, Outcome, ParticipantError, Payload, Phase, TransactionParticipant,
    Value,
};

mod cli_args;
mod error_map;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, RunArgs};
pub(crate) use error_map::{
    emit_error, map_cli_config_read, map_cli_context_invalid, map_cli_context_read,
    map_cli_report,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionReport {
    realm: String,
    transaction_id: i64,
    phase: Phase,
    outcome: Outcome,
    flags: Vec<&'static str>,
    completion: Phase,
    context: BTreeMap<String, Value>,
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, ParticipantError> {
    match cli.command {
        Mode::Check(args) => run_check(args),
        Mode::Run(args) => run_transaction(args),
    }
}

fn run_check(args: CheckArgs) -> Result<i32, ParticipantError> {
    let participant = load_participant(&args.config)?;
    println!("RESULT:OK");
    println!("REALM:{}", participant.realm());
    println!("MODE:{:?}", participant.mode());
    for phase in Phase::ALL {
        println!("SCRIPT:{}:{}", phase, participant.script(phase).kind());
    }
    Ok(0)
}

fn run_transaction(args: RunArgs) -> Result<i32, ParticipantError> {
    let participant = load_participant(&args.config)?;
    let context = Context::new();
    if let Some(path) = &args.context {
        for (key, value) in read_context_seed(Path::new(path))? {
            context.put(key, value);
        }
    }

    let report = drive_transaction(&participant, args.id, context, args.abort);
    println!("RESULT:OK");
    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(map_cli_report)?
    );
    Ok(0)
}

fn load_participant(config: &str) -> Result<ScriptParticipant, ParticipantError> {
    let path = Path::new(config);
    let source = fs::read_to_string(path).map_err(map_cli_config_read)?;
    ScriptParticipant::from_xml(
        &source,
        ParticipantOptions {
            log_sink: None,
            base_dir: path.parent().map(Path::to_path_buf),
        },
    )
}

fn read_context_seed(path: &Path) -> Result<BTreeMap<String, Value>, ParticipantError> {
    let raw = fs::read_to_string(path).map_err(map_cli_context_read)?;
    serde_json::from_str(&raw).map_err(map_cli_context_invalid)
}

/// Phase that finishes a transaction after its prepare-like phase returned `outcome`.
pub(crate) fn completion_phase(aborting: bool, outcome: Outcome) -> Phase {
    if !aborting && outcome.is_prepared() {
        Phase::Commit
    } else {
        Phase::Abort
    }
}

pub(crate) fn drive_transaction(
    participant: &ScriptParticipant,
    id: i64,
    context: Context,
    aborting: bool,
) -> TransactionReport {
    let payload = Payload::from(context.clone());
    let (phase, outcome) = if aborting {
        (
            Phase::PrepareForAbort,
            participant.prepare_for_abort(id, &payload),
        )
    } else {
        (Phase::Prepare, participant.prepare(id, &payload))
    };
    tracing::info!(realm = participant.realm(), id, %outcome, "{} finished", phase);

    let completion = completion_phase(aborting, outcome);
    match completion {
        Phase::Commit => participant.commit(id, &payload),
        _ => participant.abort(id, &payload),
    }

    TransactionReport {
        realm: participant.realm().to_string(),
        transaction_id: id,
        phase,
        outcome,
        flags: outcome.flag_names(),
        completion,
        context: context.snapshot(),
    }
}

use std::fmt;

use crate::context::Payload;
use crate::types::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Logging collaborator supplied by the host.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, realm: &str, message: &str);
}

/// Forwards participant and script diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, realm: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(realm, "{message}"),
            LogLevel::Info => tracing::info!(realm, "{message}"),
            LogLevel::Warn => tracing::warn!(realm, "{message}"),
            LogLevel::Error => tracing::error!(realm, "{message}"),
        }
    }
}

/// The subset of the transaction manager that scripts may observe through `tm`.
pub trait TransactionManager: Send + Sync {
    fn name(&self) -> &str;
    fn outstanding_transactions(&self) -> i64;
}

/// Lifecycle calls a transaction manager makes on each participant.
pub trait TransactionParticipant: Send + Sync {
    fn prepare(&self, id: i64, payload: &Payload) -> Outcome;
    fn commit(&self, id: i64, payload: &Payload);
    fn abort(&self, id: i64, payload: &Payload);
}

/// Participants that also want a say when the transaction is already aborting.
pub trait AbortParticipant: TransactionParticipant {
    fn prepare_for_abort(&self, id: i64, payload: &Payload) -> Outcome;
}

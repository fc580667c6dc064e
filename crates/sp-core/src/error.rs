use thiserror::Error;

use crate::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while building a participant; setup aborts.
    Configuration,
    /// Raised while running a phase script; never escapes a lifecycle call.
    Execution,
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ParticipantError {
    pub code: String,
    pub message: String,
    pub kind: ErrorKind,
    pub phase: Option<Phase>,
}

impl ParticipantError {
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: ErrorKind::Configuration,
            phase: None,
        }
    }

    pub fn execution(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: ErrorKind::Execution,
            phase: None,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_code_and_message() {
        let error = ParticipantError::config("CONFIG_SCRIPT_UNREADABLE", "Can't read 'x.rhai'");
        assert_eq!(error.to_string(), "CONFIG_SCRIPT_UNREADABLE: Can't read 'x.rhai'");
        assert!(error.is_configuration());
        assert_eq!(error.phase, None);
    }

    #[test]
    fn with_phase_tags_execution_errors() {
        let error = ParticipantError::execution("EXEC_EVAL_ERROR", "boom").with_phase(Phase::Commit);
        assert_eq!(error.kind, ErrorKind::Execution);
        assert_eq!(error.phase, Some(Phase::Commit));
    }
}

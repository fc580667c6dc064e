use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Prepare,
    PrepareForAbort,
    Commit,
    Abort,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Prepare,
        Phase::PrepareForAbort,
        Phase::Commit,
        Phase::Abort,
    ];

    /// Element name used in participant configuration.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::PrepareForAbort => "prepare-for-abort",
            Self::Commit => "commit",
            Self::Abort => "abort",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.element_name() == name)
    }

    pub fn produces_outcome(self) -> bool {
        matches!(self, Self::Prepare | Self::PrepareForAbort)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Sources are compiled once at configuration time and run in a fresh scope per call.
    #[default]
    Compiled,
    /// Sources are re-evaluated on every call through a per-context interpreter.
    Interpreted,
}

impl ExecutionMode {
    pub fn from_compiled_flag(compiled: bool) -> Self {
        if compiled {
            Self::Compiled
        } else {
            Self::Interpreted
        }
    }
}

/// Prepare-phase result bitmask understood by the transaction manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome(i32);

impl Outcome {
    pub const ABORTED: Outcome = Outcome(0);
    pub const PREPARED: Outcome = Outcome(1);
    pub const RETRY: Outcome = Outcome(2);
    pub const PAUSE: Outcome = Outcome(4);
    pub const NO_JOIN: Outcome = Outcome(0x40);
    pub const READONLY: Outcome = Outcome(0x80);

    pub const NAMED: [(&'static str, Outcome); 6] = [
        ("ABORTED", Outcome::ABORTED),
        ("PREPARED", Outcome::PREPARED),
        ("RETRY", Outcome::RETRY),
        ("PAUSE", Outcome::PAUSE),
        ("NO_JOIN", Outcome::NO_JOIN),
        ("READONLY", Outcome::READONLY),
    ];

    /// Returned for phases with no script: nothing to contribute, nothing to roll back.
    pub const NOTHING_TO_DO: Outcome =
        Outcome(Outcome::PREPARED.0 | Outcome::NO_JOIN.0 | Outcome::READONLY.0);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, flag: Outcome) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    pub fn is_prepared(self) -> bool {
        self.contains(Self::PREPARED)
    }

    /// Names of the non-zero flags set in this bitmask.
    pub fn flag_names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for Outcome {
    type Output = Outcome;

    fn bitor(self, rhs: Outcome) -> Outcome {
        Outcome(self.0 | rhs.0)
    }
}

impl BitOrAssign for Outcome {
    fn bitor_assign(&mut self, rhs: Outcome) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Outcome {
    type Output = Outcome;

    fn bitand(self, rhs: Outcome) -> Outcome {
        Outcome(self.0 & rhs.0)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.flag_names();
        if names.is_empty() {
            write!(f, "ABORTED({})", self.0)
        } else {
            write!(f, "{}({})", names.join("|"), self.0)
        }
    }
}

static NEXT_PARTICIPANT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a participant instance; keys its per-context state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u64);

impl ParticipantId {
    pub fn next() -> Self {
        Self(NEXT_PARTICIPANT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant-{}", self.0)
    }
}

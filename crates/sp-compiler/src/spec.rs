use std::path::PathBuf;
use std::sync::Arc;

use rhai::AST;

/// Resolved script for one lifecycle phase; fixed once configuration completes.
#[derive(Debug, Clone)]
pub enum ScriptSpec {
    /// No script configured for the phase.
    Empty,
    /// Literal source evaluated on every call (interpreted mode).
    InlineText(String),
    /// File re-read and evaluated on every call (interpreted mode).
    FileRef(PathBuf),
    /// Precompiled unit run in a fresh scope per call (compiled mode).
    CompiledUnit(Arc<AST>),
}

impl ScriptSpec {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InlineText(_) => "inline-text",
            Self::FileRef(_) => "file-ref",
            Self::CompiledUnit(_) => "compiled-unit",
        }
    }
}

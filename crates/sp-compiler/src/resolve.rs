use std::fs;
use std::path::{Path, PathBuf};

use sp_core::{ExecutionMode, ParticipantError};
use sp_parser::ScriptRef;

use crate::compile::ScriptCompiler;
use crate::spec::ScriptSpec;

/// Resolves configured script references into [`ScriptSpec`]s for one participant.
pub struct ScriptResolver<'a> {
    pub mode: ExecutionMode,
    pub compiler: &'a ScriptCompiler,
    pub base_dir: Option<&'a Path>,
    pub realm: &'a str,
}

impl ScriptResolver<'_> {
    pub fn resolve(&self, script: Option<&ScriptRef>) -> Result<ScriptSpec, ParticipantError> {
        let Some(script) = script else {
            return Ok(ScriptSpec::Empty);
        };

        if let Some(src) = &script.src {
            let path = self.resolve_path(src);
            ensure_readable(&path, src)?;
            return match self.mode {
                ExecutionMode::Interpreted => Ok(ScriptSpec::FileRef(path)),
                ExecutionMode::Compiled => {
                    let source = fs::read_to_string(&path).map_err(|error| {
                        ParticipantError::config(
                            "CONFIG_SCRIPT_UNREADABLE",
                            format!("Can't read '{}': {}", src, error),
                        )
                    })?;
                    self.compiler
                        .compile(&source, src, self.realm)
                        .map(ScriptSpec::CompiledUnit)
                }
            };
        }

        match self.mode {
            ExecutionMode::Interpreted => Ok(ScriptSpec::InlineText(script.text.clone())),
            ExecutionMode::Compiled => self
                .compiler
                .compile(&script.text, &script.element, self.realm)
                .map(ScriptSpec::CompiledUnit),
        }
    }

    fn resolve_path(&self, src: &str) -> PathBuf {
        let path = PathBuf::from(src);
        match self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

fn ensure_readable(path: &Path, src: &str) -> Result<(), ParticipantError> {
    let readable = fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
        && fs::File::open(path).is_ok();
    if readable {
        Ok(())
    } else {
        Err(ParticipantError::config(
            "CONFIG_SCRIPT_UNREADABLE",
            format!("Can't read '{}'", src),
        ))
    }
}

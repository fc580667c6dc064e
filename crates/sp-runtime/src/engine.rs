use rhai::{Engine, Module, INT};
use sp_core::Outcome;

use crate::handles::register_handles;

/// Engine shared by every phase of a participant: compiles in compiled mode, evaluates in
/// both. Built once at configuration time and read-only afterwards.
pub fn new_script_engine() -> Engine {
    let mut engine = Engine::new();
    register_handles(&mut engine);

    let mut outcome = Module::new();
    for (name, flag) in Outcome::NAMED {
        outcome.set_var(name, flag.bits() as INT);
    }
    engine.register_static_module("outcome", outcome.into());

    engine.on_print(|text| tracing::info!(target: "script", "{text}"));
    engine.on_debug(|text, source, position| {
        tracing::debug!(target: "script", source = source.unwrap_or_default(), %position, "{text}")
    });
    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constants_are_reachable_as_module_paths() {
        let value = new_script_engine()
            .eval::<INT>("outcome::PREPARED | outcome::NO_JOIN | outcome::READONLY")
            .expect("constants should resolve");
        assert_eq!(value as i32, Outcome::NOTHING_TO_DO.bits());
    }

    #[test]
    fn outcome_constants_do_not_leak_as_variables() {
        let error = new_script_engine()
            .eval::<INT>("PREPARED")
            .expect_err("bare constant name is not a variable");
        assert!(error.to_string().contains("PREPARED"));
    }
}

mod binding;
mod bridge;
mod engine;
mod executor;
mod handles;
mod shell;

pub use binding::{Binding, BINDING_NAMES};
pub use bridge::{dynamic_to_value, value_to_dynamic};
pub use engine::new_script_engine;
pub use executor::ScriptExecutor;
pub use handles::{ConfigHandle, ScriptContext, ScriptLogger, TmHandle};
pub use shell::ScriptShell;

mod compile;
mod resolve;
mod spec;

pub use compile::ScriptCompiler;
pub use resolve::ScriptResolver;
pub use spec::ScriptSpec;

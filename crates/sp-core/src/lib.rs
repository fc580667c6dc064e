pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod types;
pub mod value;

pub use config::Configuration;
pub use context::{Context, Payload, WeakContext};
pub use error::{ErrorKind, ParticipantError};
pub use host::*;
pub use types::*;
pub use value::Value;

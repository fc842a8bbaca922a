mod delegate;
mod engine;
pub mod environment;
pub mod template;

pub use self::delegate::{CommandDelegateRunner, DelegateRunner};
pub use self::engine::OverrideEngine;
pub use self::environment::{DelegateEnvironment, FrozenEnvironment};

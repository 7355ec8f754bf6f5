//! Godown - command-execution core of a Redis-style key-value store
//!
//! Godown is designed with strong cohesion and loose coupling principles:
//! - `store` owns typed values, their TTLs and the storage contract
//! - `commands` implements every command against that contract only
//! - `dispatch` routes a command name to its implementation
//! - wire framing and connection handling are left to the embedding server

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod store;
pub mod telemetry;

/// Re-export commonly used types
pub use commands::{Command, CommandRegistry, CommandResult, Reply};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{CommandError, StorageError};
pub use store::{Key, Kind, MemoryStorage, Storage, Value};

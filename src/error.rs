//! Error types shared by the storage layer and the commands
//!
//! Every command failure is returned as data through `CommandError`.
//! Callers can tell argument errors, type mismatches and backend faults apart
//! by variant, which is what client libraries need to decide on retries.

use thiserror::Error;

/// Failure reported by a storage backend
///
/// Commands never inspect or retry these, they hand them back unchanged
/// inside `CommandError::Storage`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A shard lock was poisoned by a panicking writer
    #[error("storage lock poisoned: {0}")]
    Poisoned(String),

    /// Any other backend fault (I/O, corruption, ...)
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Error half of a command result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Argument count outside the command's signature
    #[error("wrong number of arguments")]
    WrongArgsNumber,

    /// The key holds a value of another kind
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongTypeOp,

    /// A required argument failed parsing or range validation
    #[error("{0}")]
    InvalidArgument(String),

    /// No command is registered under this name
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CommandError {
    /// Build an `InvalidArgument` error from a message
    pub fn invalid(msg: impl Into<String>) -> Self {
        CommandError::InvalidArgument(msg.into())
    }

    /// Only backend faults are worth retrying; argument and type errors
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CommandError::Storage(_))
    }
}

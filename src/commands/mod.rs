//! Command execution module
//!
//! Provides a unified interface for all commands through the Command trait.
//! Each command family lives in its own file for high cohesion.

mod registry;

// Command implementations
mod bitmap;
mod hash;
mod key;
mod list;
mod server;
mod string;
mod ttl;

pub use registry::CommandRegistry;

use crate::error::CommandError;
use crate::store::{Key, Mutation, Storage, Value};
use bytes::Bytes;

/// Success payload of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status reply such as OK or PONG
    SimpleString(String),

    Integer(i64),

    /// Binary-safe string
    Bulk(Bytes),

    /// Missing value
    Nil,

    /// List of binary-safe strings
    Array(Vec<Bytes>),
}

impl Reply {
    /// The canonical OK status
    pub fn ok() -> Self {
        Reply::SimpleString("OK".to_string())
    }

    pub fn simple_string(s: impl Into<String>) -> Self {
        Reply::SimpleString(s.into())
    }

    pub fn integer(i: i64) -> Self {
        Reply::Integer(i)
    }

    pub fn bulk(b: impl Into<Bytes>) -> Self {
        Reply::Bulk(b.into())
    }

    /// Bulk reply, or Nil when there is nothing
    pub fn bulk_or_nil(b: Option<Bytes>) -> Self {
        b.map_or(Reply::Nil, Reply::Bulk)
    }

    pub fn array(items: Vec<Bytes>) -> Self {
        Reply::Array(items)
    }
}

/// Outcome of every command: a reply or an error, never both
pub type CommandResult = Result<Reply, CommandError>;

/// Command execution trait
///
/// Commands are stateless. The storage is lent for the duration of one
/// `execute` call and commands must not keep anything from it afterwards.
///
/// Every implementation validates in the same order: argument count,
/// argument parsing, storage lookup, kind check, then the computation.
pub trait Command: Send + Sync {
    /// Uppercase token used for dispatch
    fn name(&self) -> &'static str;

    /// Usage line followed by a one-sentence description
    fn help(&self) -> &'static str;

    /// Execute the command against `storage`
    ///
    /// `args` excludes the command name itself.
    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult;
}

/// Fail unless exactly `n` arguments were given
pub(crate) fn expect_args(args: &[&str], n: usize) -> Result<(), CommandError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(CommandError::WrongArgsNumber)
    }
}

/// Fail unless at least `n` arguments were given
pub(crate) fn expect_min_args(args: &[&str], n: usize) -> Result<(), CommandError> {
    if args.len() >= n {
        Ok(())
    } else {
        Err(CommandError::WrongArgsNumber)
    }
}

/// Convert a raw argument into a key (or any binary-safe payload)
pub(crate) fn to_bytes(arg: &str) -> Bytes {
    Bytes::copy_from_slice(arg.as_bytes())
}

/// Parse a signed integer argument, failing with `msg`
pub(crate) fn parse_integer(arg: &str, msg: &str) -> Result<i64, CommandError> {
    arg.parse::<i64>().map_err(|_| CommandError::invalid(msg))
}

/// Run a read-modify-write on `key` and return what the closure produced
///
/// The closure decides both the command's outcome and what happens to the
/// stored value. A failing closure leaves the value untouched.
pub(crate) fn mutate<T>(
    storage: &dyn Storage,
    key: &Key,
    mut f: impl FnMut(Option<&mut Value>) -> Result<(T, Mutation), CommandError>,
) -> Result<T, CommandError> {
    let mut outcome = None;

    storage.update(key, &mut |current| match f(current) {
        Ok((out, mutation)) => {
            outcome = Some(Ok(out));
            mutation
        }
        Err(e) => {
            outcome = Some(Err(e));
            Mutation::Keep
        }
    })?;

    outcome.unwrap_or_else(|| {
        Err(crate::error::StorageError::Backend("update callback was not invoked".to_string()).into())
    })
}

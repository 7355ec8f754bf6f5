//! TTL commands (EXPIRE, TTL, PERSIST)

use super::{expect_args, mutate, parse_integer, to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::{Mutation, Storage};
use std::time::{Duration, SystemTime};

/// EXPIRE command - Set a timeout on a key
///
/// Syntax: EXPIRE key seconds
///
/// A non-positive timeout deletes the key right away.
pub struct ExpireCommand;

impl Command for ExpireCommand {
    fn name(&self) -> &'static str {
        "EXPIRE"
    }

    fn help(&self) -> &'static str {
        "Usage: EXPIRE key seconds\n\
         Set a timeout on key. After the timeout has expired, the key will automatically be deleted."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;
        let seconds = parse_integer(args[1], "invalid seconds")?;

        let expire_at = match seconds {
            s if s <= 0 => None,
            s => Some(
                SystemTime::now()
                    .checked_add(Duration::from_secs(s.unsigned_abs()))
                    .ok_or_else(|| CommandError::invalid("invalid seconds"))?,
            ),
        };

        let set = mutate(storage, &to_bytes(args[0]), |current| match (current, expire_at) {
            (None, _) => Ok((false, Mutation::Keep)),
            (Some(_), None) => Ok((true, Mutation::Remove)),
            (Some(value), Some(at)) => {
                value.set_ttl(at);
                Ok((true, Mutation::Keep))
            }
        })?;

        Ok(Reply::integer(i64::from(set)))
    }
}

/// TTL command - Get the time to live for a key
///
/// Syntax: TTL key
///
/// Returns:
/// - The TTL in seconds
/// - -1 if the key exists but has no expiration
/// - -2 if the key does not exist
pub struct TtlCommand;

impl Command for TtlCommand {
    fn name(&self) -> &'static str {
        "TTL"
    }

    fn help(&self) -> &'static str {
        "Usage: TTL key\n\
         Returns the remaining time to live of a key that has a timeout."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let ttl = storage
            .get(&to_bytes(args[0]))?
            .map_or(-2, |value| value.ttl_seconds(SystemTime::now()));

        Ok(Reply::integer(ttl))
    }
}

/// PERSIST command - Remove the timeout of a key
///
/// Syntax: PERSIST key
pub struct PersistCommand;

impl Command for PersistCommand {
    fn name(&self) -> &'static str {
        "PERSIST"
    }

    fn help(&self) -> &'static str {
        "Usage: PERSIST key\n\
         Remove the existing timeout on key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let cleared = mutate(storage, &to_bytes(args[0]), |current| {
            Ok((current.map_or(false, |value| value.clear_ttl()), Mutation::Keep))
        })?;

        Ok(Reply::integer(i64::from(cleared)))
    }
}

//! Map commands (HSET, HGET, HDEL, HKEYS, HVALS)

use super::{expect_args, expect_min_args, mutate, to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::{Mutation, Storage, Value};
use bytes::Bytes;
use std::collections::BTreeMap;

/// HSET command - Set a field in a map
///
/// Syntax: HSET key field value
///
/// Returns 1 if the field is new, 0 if it was overwritten.
pub struct HSetCommand;

impl Command for HSetCommand {
    fn name(&self) -> &'static str {
        "HSET"
    }

    fn help(&self) -> &'static str {
        "Usage: HSET key field value\n\
         Sets field in the map stored at key to value."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 3)?;
        let field = to_bytes(args[1]);
        let val = to_bytes(args[2]);

        let created = mutate(storage, &to_bytes(args[0]), |current| match current {
            Some(value) => {
                let map = value.as_map_mut().ok_or(CommandError::WrongTypeOp)?;
                let created = map.insert(field.clone(), val.clone()).is_none();
                Ok((created, Mutation::Keep))
            }
            None => Ok((true, Mutation::Replace(Value::map([(field.clone(), val.clone())])))),
        })?;

        Ok(Reply::integer(i64::from(created)))
    }
}

/// HGET command - Get the value of a map field
///
/// Syntax: HGET key field
pub struct HGetCommand;

impl Command for HGetCommand {
    fn name(&self) -> &'static str {
        "HGET"
    }

    fn help(&self) -> &'static str {
        "Usage: HGET key field\n\
         Returns the value associated with field in the map stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;

        let value = match storage.get(&to_bytes(args[0]))? {
            Some(v) => v,
            None => return Ok(Reply::Nil),
        };
        let map = value.as_map().ok_or(CommandError::WrongTypeOp)?;

        Ok(Reply::bulk_or_nil(map.get(args[1].as_bytes()).cloned()))
    }
}

/// HDEL command - Delete one or more map fields
///
/// Syntax: HDEL key field [field ...]
pub struct HDelCommand;

impl Command for HDelCommand {
    fn name(&self) -> &'static str {
        "HDEL"
    }

    fn help(&self) -> &'static str {
        "Usage: HDEL key field [field ...]\n\
         Removes the specified fields from the map stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_min_args(args, 2)?;
        let fields = &args[1..];

        let removed = mutate(storage, &to_bytes(args[0]), |current| {
            let value = match current {
                Some(value) => value,
                None => return Ok((0, Mutation::Keep)),
            };
            let map = value.as_map_mut().ok_or(CommandError::WrongTypeOp)?;

            let removed = fields
                .iter()
                .filter(|f| map.remove(f.as_bytes()).is_some())
                .count();
            let mutation = if map.is_empty() { Mutation::Remove } else { Mutation::Keep };

            Ok((removed, mutation))
        })?;

        Ok(Reply::integer(removed as i64))
    }
}

/// Read a map and project it, Nil-safe for missing keys
fn project(
    storage: &dyn Storage,
    args: &[&str],
    f: impl Fn(&BTreeMap<Bytes, Bytes>) -> Vec<Bytes>,
) -> CommandResult {
    expect_args(args, 1)?;

    let items = match storage.get(&to_bytes(args[0]))? {
        Some(value) => f(value.as_map().ok_or(CommandError::WrongTypeOp)?),
        None => Vec::new(),
    };

    Ok(Reply::array(items))
}

/// HKEYS command - All fields of a map
///
/// Syntax: HKEYS key
pub struct HKeysCommand;

impl Command for HKeysCommand {
    fn name(&self) -> &'static str {
        "HKEYS"
    }

    fn help(&self) -> &'static str {
        "Usage: HKEYS key\n\
         Returns all field names in the map stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        project(storage, args, |map| map.keys().cloned().collect())
    }
}

/// HVALS command - All values of a map
///
/// Syntax: HVALS key
pub struct HValsCommand;

impl Command for HValsCommand {
    fn name(&self) -> &'static str {
        "HVALS"
    }

    fn help(&self) -> &'static str {
        "Usage: HVALS key\n\
         Returns all values in the map stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        project(storage, args, |map| map.values().cloned().collect())
    }
}

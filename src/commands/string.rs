//! String commands (SET, GET, APPEND, STRLEN)

use super::{expect_args, mutate, to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::{Mutation, Storage, Value};
use bytes::{Bytes, BytesMut};

/// SET command - Set a key to a string value
///
/// Syntax: SET key value
///
/// Replaces any previous value whatever its kind, and drops its TTL.
pub struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &'static str {
        "SET"
    }

    fn help(&self) -> &'static str {
        "Usage: SET key value\n\
         Set key to hold the string value."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;

        storage.put(to_bytes(args[0]), Value::string(to_bytes(args[1])))?;

        Ok(Reply::ok())
    }
}

/// GET command - Get the string value of a key
///
/// Syntax: GET key
pub struct GetCommand;

impl Command for GetCommand {
    fn name(&self) -> &'static str {
        "GET"
    }

    fn help(&self) -> &'static str {
        "Usage: GET key\n\
         Get the value by key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        match storage.get(&to_bytes(args[0]))? {
            Some(value) => {
                let bytes = value.as_string().ok_or(CommandError::WrongTypeOp)?;
                Ok(Reply::bulk(bytes.clone()))
            }
            None => Ok(Reply::Nil),
        }
    }
}

/// APPEND command - Append to a string, creating it if needed
///
/// Syntax: APPEND key value
///
/// Returns the length of the string after the append.
pub struct AppendCommand;

impl Command for AppendCommand {
    fn name(&self) -> &'static str {
        "APPEND"
    }

    fn help(&self) -> &'static str {
        "Usage: APPEND key value\n\
         Appends the value at the end of the string stored at key, creating it when absent."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;
        let suffix = args[1].as_bytes();

        let len = mutate(storage, &to_bytes(args[0]), |current| match current {
            Some(value) => {
                let existing = value.as_string_mut().ok_or(CommandError::WrongTypeOp)?;
                let mut buf = BytesMut::with_capacity(existing.len() + suffix.len());
                buf.extend_from_slice(existing);
                buf.extend_from_slice(suffix);
                *existing = buf.freeze();
                Ok((existing.len(), Mutation::Keep))
            }
            None => Ok((
                suffix.len(),
                Mutation::Replace(Value::string(Bytes::copy_from_slice(suffix))),
            )),
        })?;

        Ok(Reply::integer(len as i64))
    }
}

/// STRLEN command - Length of a string value
///
/// Syntax: STRLEN key
pub struct StrLenCommand;

impl Command for StrLenCommand {
    fn name(&self) -> &'static str {
        "STRLEN"
    }

    fn help(&self) -> &'static str {
        "Usage: STRLEN key\n\
         Returns the length of the string value stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let len = match storage.get(&to_bytes(args[0]))? {
            Some(value) => value.as_string().ok_or(CommandError::WrongTypeOp)?.len(),
            None => 0,
        };

        Ok(Reply::integer(len as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_set_get() {
        let storage = MemoryStorage::new();

        let result = SetCommand.execute(&storage, &["mykey", "myvalue"]);
        assert_eq!(result, Ok(Reply::ok()));

        let result = GetCommand.execute(&storage, &["mykey"]);
        assert_eq!(result, Ok(Reply::bulk("myvalue")));
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = MemoryStorage::new();
        assert_eq!(GetCommand.execute(&storage, &["nonexistent"]), Ok(Reply::Nil));
    }

    #[test]
    fn test_set_replaces_other_kinds_and_ttl() {
        let storage = MemoryStorage::from_values([(
            "k",
            Value::bitmap(vec![1]).with_ttl(SystemTime::now() + Duration::from_secs(60)),
        )]);

        SetCommand.execute(&storage, &["k", "v"]).unwrap();

        let value = storage.get(&Bytes::from("k")).unwrap().unwrap();
        assert_eq!(value, Value::string("v"));
        assert_eq!(value.ttl(), None);
    }

    #[test]
    fn test_get_wrong_type() {
        let storage = MemoryStorage::from_values([("bm", Value::bitmap(vec![1]))]);
        assert_eq!(GetCommand.execute(&storage, &["bm"]), Err(CommandError::WrongTypeOp));
    }

    #[test]
    fn test_arity() {
        let storage = MemoryStorage::new();
        assert_eq!(SetCommand.execute(&storage, &["k"]), Err(CommandError::WrongArgsNumber));
        assert_eq!(GetCommand.execute(&storage, &[]), Err(CommandError::WrongArgsNumber));
        assert_eq!(AppendCommand.execute(&storage, &["k", "a", "b"]), Err(CommandError::WrongArgsNumber));
        assert_eq!(StrLenCommand.execute(&storage, &[]), Err(CommandError::WrongArgsNumber));
    }

    #[test]
    fn test_append_and_strlen() {
        let storage = MemoryStorage::new();

        assert_eq!(AppendCommand.execute(&storage, &["k", "Hello"]), Ok(Reply::integer(5)));
        assert_eq!(AppendCommand.execute(&storage, &["k", " World"]), Ok(Reply::integer(11)));
        assert_eq!(GetCommand.execute(&storage, &["k"]), Ok(Reply::bulk("Hello World")));
        assert_eq!(StrLenCommand.execute(&storage, &["k"]), Ok(Reply::integer(11)));
        assert_eq!(StrLenCommand.execute(&storage, &["missing"]), Ok(Reply::integer(0)));
    }

    #[test]
    fn test_append_wrong_type() {
        let storage = MemoryStorage::from_values([("l", Value::list(["a"]))]);
        assert_eq!(AppendCommand.execute(&storage, &["l", "x"]), Err(CommandError::WrongTypeOp));
        assert_eq!(StrLenCommand.execute(&storage, &["l"]), Err(CommandError::WrongTypeOp));
    }
}

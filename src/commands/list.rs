//! List commands (LPUSH, RPUSH, LPOP, RPOP, LLEN, LINDEX, LRANGE, LREM)
//!
//! A list that becomes empty is removed from the storage.

use super::{expect_args, expect_min_args, mutate, parse_integer, to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::{Mutation, Storage, Value};
use bytes::Bytes;
use std::collections::VecDeque;

#[derive(Clone, Copy)]
enum End {
    Head,
    Tail,
}

fn push(storage: &dyn Storage, args: &[&str], end: End) -> CommandResult {
    expect_min_args(args, 2)?;
    let items: Vec<Bytes> = args[1..].iter().map(|a| to_bytes(a)).collect();

    let push_all = |list: &mut VecDeque<Bytes>| {
        for item in &items {
            match end {
                End::Head => list.push_front(item.clone()),
                End::Tail => list.push_back(item.clone()),
            }
        }
        list.len()
    };

    let len = mutate(storage, &to_bytes(args[0]), |current| match current {
        Some(value) => {
            let list = value.as_list_mut().ok_or(CommandError::WrongTypeOp)?;
            Ok((push_all(list), Mutation::Keep))
        }
        None => {
            let mut list = VecDeque::with_capacity(items.len());
            let len = push_all(&mut list);
            Ok((len, Mutation::Replace(Value::list(list))))
        }
    })?;

    Ok(Reply::integer(len as i64))
}

fn pop(storage: &dyn Storage, args: &[&str], end: End) -> CommandResult {
    expect_args(args, 1)?;

    let item = mutate(storage, &to_bytes(args[0]), |current| {
        let value = match current {
            Some(value) => value,
            None => return Ok((None, Mutation::Keep)),
        };
        let list = value.as_list_mut().ok_or(CommandError::WrongTypeOp)?;

        let item = match end {
            End::Head => list.pop_front(),
            End::Tail => list.pop_back(),
        };
        let mutation = if list.is_empty() { Mutation::Remove } else { Mutation::Keep };

        Ok((item, mutation))
    })?;

    Ok(Reply::bulk_or_nil(item))
}

/// Resolve a possibly negative index against a list of `len` items
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index.checked_add(len)? } else { index };

    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// LPUSH command - Prepend one or multiple values to a list
///
/// Syntax: LPUSH key value [value ...]
pub struct LPushCommand;

impl Command for LPushCommand {
    fn name(&self) -> &'static str {
        "LPUSH"
    }

    fn help(&self) -> &'static str {
        "Usage: LPUSH key value [value ...]\n\
         Prepend one or multiple values to a list."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        push(storage, args, End::Head)
    }
}

/// RPUSH command - Append one or multiple values to a list
///
/// Syntax: RPUSH key value [value ...]
pub struct RPushCommand;

impl Command for RPushCommand {
    fn name(&self) -> &'static str {
        "RPUSH"
    }

    fn help(&self) -> &'static str {
        "Usage: RPUSH key value [value ...]\n\
         Append one or multiple values to a list."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        push(storage, args, End::Tail)
    }
}

/// LPOP command - Remove and return the first element of a list
///
/// Syntax: LPOP key
pub struct LPopCommand;

impl Command for LPopCommand {
    fn name(&self) -> &'static str {
        "LPOP"
    }

    fn help(&self) -> &'static str {
        "Usage: LPOP key\n\
         Removes and returns the first element of the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        pop(storage, args, End::Head)
    }
}

/// RPOP command - Remove and return the last element of a list
///
/// Syntax: RPOP key
pub struct RPopCommand;

impl Command for RPopCommand {
    fn name(&self) -> &'static str {
        "RPOP"
    }

    fn help(&self) -> &'static str {
        "Usage: RPOP key\n\
         Removes and returns the last element of the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        pop(storage, args, End::Tail)
    }
}

/// LLEN command - Get the length of a list
///
/// Syntax: LLEN key
pub struct LLenCommand;

impl Command for LLenCommand {
    fn name(&self) -> &'static str {
        "LLEN"
    }

    fn help(&self) -> &'static str {
        "Usage: LLEN key\n\
         Returns the length of the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let len = match storage.get(&to_bytes(args[0]))? {
            Some(value) => value.as_list().ok_or(CommandError::WrongTypeOp)?.len(),
            None => 0,
        };

        Ok(Reply::integer(len as i64))
    }
}

/// LINDEX command - Get an element by index
///
/// Syntax: LINDEX key index
///
/// Negative indices count from the tail (-1 is the last element).
pub struct LIndexCommand;

impl Command for LIndexCommand {
    fn name(&self) -> &'static str {
        "LINDEX"
    }

    fn help(&self) -> &'static str {
        "Usage: LINDEX key index\n\
         Returns the element at index in the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;
        let index = parse_integer(args[1], "invalid index")?;

        let value = match storage.get(&to_bytes(args[0]))? {
            Some(v) => v,
            None => return Ok(Reply::Nil),
        };
        let list = value.as_list().ok_or(CommandError::WrongTypeOp)?;

        let item = resolve_index(index, list.len()).and_then(|i| list.get(i)).cloned();
        Ok(Reply::bulk_or_nil(item))
    }
}

/// LRANGE command - Get a range of elements from a list
///
/// Syntax: LRANGE key start stop
///
/// Both bounds are inclusive and may be negative.
pub struct LRangeCommand;

impl Command for LRangeCommand {
    fn name(&self) -> &'static str {
        "LRANGE"
    }

    fn help(&self) -> &'static str {
        "Usage: LRANGE key start stop\n\
         Returns the specified elements of the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 3)?;
        let start = parse_integer(args[1], "invalid start index")?;
        let stop = parse_integer(args[2], "invalid stop index")?;

        let value = match storage.get(&to_bytes(args[0]))? {
            Some(v) => v,
            None => return Ok(Reply::array(vec![])),
        };
        let list = value.as_list().ok_or(CommandError::WrongTypeOp)?;

        let len = list.len() as i64;
        let start = if start < 0 { (start + len).max(0) } else { start };
        let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

        if start > stop || start >= len {
            return Ok(Reply::array(vec![]));
        }

        let items = list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect();

        Ok(Reply::array(items))
    }
}

/// LREM command - Remove elements equal to a value
///
/// Syntax: LREM key count value
///
/// count > 0 removes from head to tail, count < 0 from tail to head,
/// count = 0 removes every occurrence.
pub struct LRemCommand;

impl Command for LRemCommand {
    fn name(&self) -> &'static str {
        "LREM"
    }

    fn help(&self) -> &'static str {
        "Usage: LREM key count value\n\
         Removes the first count occurrences of elements equal to value from the list stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 3)?;
        let count = parse_integer(args[1], "invalid count")?;
        let needle = args[2].as_bytes();

        let removed = mutate(storage, &to_bytes(args[0]), |current| {
            let value = match current {
                Some(value) => value,
                None => return Ok((0, Mutation::Keep)),
            };
            let list = value.as_list_mut().ok_or(CommandError::WrongTypeOp)?;

            let limit = match count {
                0 => usize::MAX,
                n => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
            };
            let total = list.iter().filter(|item| item[..] == *needle).count();
            let hits = total.min(limit);
            // Matches numbered 1..=skip survive; a negative count removes from the tail
            let skip = if count < 0 { total - hits } else { 0 };

            let mut seen = 0;
            list.retain(|item| {
                if item[..] != *needle {
                    return true;
                }
                seen += 1;
                seen <= skip || seen > skip + hits
            });

            let mutation = if list.is_empty() { Mutation::Remove } else { Mutation::Keep };
            Ok((hits, mutation))
        })?;

        Ok(Reply::integer(removed as i64))
    }
}

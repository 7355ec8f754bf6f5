//! Bitmap commands (GETBIT, SETBIT, BITCOUNT)
//!
//! A missing or expired key reads as an all-zero bitmap of unbounded
//! length, and so does any offset past the stored words.

use super::{expect_args, mutate, to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::{Mutation, Storage, Value};

/// Largest offset SETBIT will materialize (a 512MB bitmap)
pub const MAX_SETBIT_OFFSET: u64 = (1 << 32) - 1;

/// Parse a bit offset: plain decimal digits only, no sign
fn parse_offset(arg: &str) -> Result<u64, CommandError> {
    if !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::invalid("invalid offset"));
    }
    arg.parse::<u64>()
        .map_err(|_| CommandError::invalid("invalid offset"))
}

/// GETBIT command - Read a single bit
///
/// Syntax: GETBIT key offset
pub struct GetBitCommand;

impl Command for GetBitCommand {
    fn name(&self) -> &'static str {
        "GETBIT"
    }

    fn help(&self) -> &'static str {
        "Usage: GETBIT key offset\n\
         Returns the bit value at offset in the string value stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 2)?;
        let offset = parse_offset(args[1])?;

        let value = match storage.get(&to_bytes(args[0]))? {
            Some(v) => v,
            None => return Ok(Reply::integer(0)),
        };

        let bitmap = value.as_bitmap().ok_or(CommandError::WrongTypeOp)?;

        Ok(Reply::integer(i64::from(bitmap.get(offset))))
    }
}

/// SETBIT command - Set or clear a single bit, growing the bitmap as needed
///
/// Syntax: SETBIT key offset value
///
/// Returns the previous bit value.
pub struct SetBitCommand;

impl Command for SetBitCommand {
    fn name(&self) -> &'static str {
        "SETBIT"
    }

    fn help(&self) -> &'static str {
        "Usage: SETBIT key offset value\n\
         Sets or clears the bit at offset in the string value stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 3)?;

        let offset = parse_offset(args[1])?;
        if offset > MAX_SETBIT_OFFSET {
            return Err(CommandError::invalid("invalid offset"));
        }

        let bit = match args[2] {
            "0" => false,
            "1" => true,
            _ => return Err(CommandError::invalid("invalid value")),
        };

        let write_bit = |value: &mut Value| -> Result<bool, CommandError> {
            value
                .as_bitmap_mut()
                .ok_or(CommandError::WrongTypeOp)?
                .set(offset, bit)
                .ok_or_else(|| CommandError::invalid("invalid offset"))
        };

        let previous = mutate(storage, &to_bytes(args[0]), |current| match current {
            Some(value) => Ok((write_bit(value)?, Mutation::Keep)),
            None => {
                let mut value = Value::empty_bitmap();
                let previous = write_bit(&mut value)?;
                Ok((previous, Mutation::Replace(value)))
            }
        })?;

        Ok(Reply::integer(i64::from(previous)))
    }
}

/// BITCOUNT command - Count set bits
///
/// Syntax: BITCOUNT key
pub struct BitCountCommand;

impl Command for BitCountCommand {
    fn name(&self) -> &'static str {
        "BITCOUNT"
    }

    fn help(&self) -> &'static str {
        "Usage: BITCOUNT key\n\
         Returns the number of set bits in the bitmap stored at key."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let value = match storage.get(&to_bytes(args[0]))? {
            Some(v) => v,
            None => return Ok(Reply::integer(0)),
        };

        let bitmap = value.as_bitmap().ok_or(CommandError::WrongTypeOp)?;
        let count = i64::try_from(bitmap.count_ones()).unwrap_or(i64::MAX);

        Ok(Reply::integer(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::store::mock::MockStorage;
    use crate::store::MemoryStorage;
    use bytes::Bytes;
    use std::time::{Duration, SystemTime};

    fn fixture() -> MemoryStorage {
        let expired = Value::bitmap(vec![1 << 10]).with_ttl(SystemTime::now() - Duration::from_secs(1));

        MemoryStorage::from_values([
            ("string", Value::string("string")),
            ("bitmap", Value::bitmap(vec![1 << 5])),
            ("bitmap_with_big_offset", Value::bitmap(vec![0, 3])),
            ("expired_bitmap", expired),
        ])
    }

    fn invalid_offset() -> CommandError {
        CommandError::invalid("invalid offset")
    }

    #[test]
    fn test_getbit_name_and_help() {
        let cmd = GetBitCommand;
        assert_eq!(cmd.name(), "GETBIT");
        assert_eq!(
            cmd.help(),
            "Usage: GETBIT key offset\nReturns the bit value at offset in the string value stored at key."
        );
    }

    #[test]
    fn test_getbit_execute() {
        let storage = fixture();
        let cmd = GetBitCommand;

        let cases: Vec<(&str, Vec<&str>, CommandResult)> = vec![
            ("set_bit", vec!["bitmap", "5"], Ok(Reply::integer(1))),
            ("unset_bit", vec!["bitmap", "10"], Ok(Reply::integer(0))),
            ("big_offset/1", vec!["bitmap_with_big_offset", "64"], Ok(Reply::integer(1))),
            ("big_offset/2", vec!["bitmap_with_big_offset", "65"], Ok(Reply::integer(1))),
            ("big_offset/3", vec!["bitmap_with_big_offset", "1000"], Ok(Reply::integer(0))),
            ("huge_offset", vec!["bitmap", "18446744073709551615"], Ok(Reply::integer(0))),
            ("key_not_exists", vec!["key_not_exists", "0"], Ok(Reply::integer(0))),
            ("expired_key", vec!["expired_bitmap", "10"], Ok(Reply::integer(0))),
            ("wrong_type_op", vec!["string", "1"], Err(CommandError::WrongTypeOp)),
            ("wrong_number_of_args/1", vec!["key1"], Err(CommandError::WrongArgsNumber)),
            ("wrong_number_of_args/2", vec![], Err(CommandError::WrongArgsNumber)),
            ("wrong_number_of_args/3", vec!["bitmap", "1", "2"], Err(CommandError::WrongArgsNumber)),
            ("negative_offset", vec!["bitmap", "-1"], Err(invalid_offset())),
            ("offset_not_integer", vec!["bitmap", "string"], Err(invalid_offset())),
        ];

        for (name, args, want) in cases {
            assert_eq!(cmd.execute(&storage, &args), want, "case {}", name);
        }
    }

    #[test]
    fn test_getbit_storage_error_is_propagated() {
        let fault = StorageError::Backend("error".to_string());
        let storage = MockStorage::returning(Err(fault.clone()));

        let result = GetBitCommand.execute(&storage, &["key", "10"]);
        assert_eq!(result, Err(CommandError::Storage(fault)));
    }

    #[test]
    fn test_getbit_validates_before_storage() {
        let storage = MockStorage::new();
        let cmd = GetBitCommand;

        assert_eq!(cmd.execute(&storage, &[]), Err(CommandError::WrongArgsNumber));
        assert_eq!(cmd.execute(&storage, &["key"]), Err(CommandError::WrongArgsNumber));
        assert_eq!(cmd.execute(&storage, &["key", "-3"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["key", "1e3"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["key", "+5"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["key", " 5"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["key", ""]), Err(invalid_offset()));
        assert_eq!(storage.calls(), 0);

        assert_eq!(cmd.execute(&storage, &["key", "3"]), Ok(Reply::integer(0)));
        assert_eq!(storage.calls(), 1);
    }

    #[test]
    fn test_getbit_matches_every_word_bit() {
        let words = vec![0xDEAD_BEEF_0123_4567u64, 0, u64::MAX, 1 << 63];
        let storage = MemoryStorage::from_values([("bm", Value::bitmap(words.clone()))]);
        let cmd = GetBitCommand;

        for offset in 0..(words.len() as u64 * 64 + 64) {
            let expected = words
                .get((offset / 64) as usize)
                .map_or(0, |w| ((w >> (offset % 64)) & 1) as i64);
            let arg = offset.to_string();
            assert_eq!(cmd.execute(&storage, &["bm", arg.as_str()]), Ok(Reply::integer(expected)));
        }
    }

    #[test]
    fn test_setbit_creates_and_grows() {
        let storage = MemoryStorage::new();
        let cmd = SetBitCommand;

        assert_eq!(cmd.execute(&storage, &["bm", "70", "1"]), Ok(Reply::integer(0)));
        assert_eq!(cmd.execute(&storage, &["bm", "70", "1"]), Ok(Reply::integer(1)));
        assert_eq!(cmd.execute(&storage, &["bm", "3", "1"]), Ok(Reply::integer(0)));

        let value = storage.get(&Bytes::from("bm")).unwrap().unwrap();
        assert_eq!(value.as_bitmap().unwrap().words(), &[1 << 3, 1 << 6]);

        assert_eq!(GetBitCommand.execute(&storage, &["bm", "70"]), Ok(Reply::integer(1)));
        assert_eq!(cmd.execute(&storage, &["bm", "70", "0"]), Ok(Reply::integer(1)));
        assert_eq!(GetBitCommand.execute(&storage, &["bm", "70"]), Ok(Reply::integer(0)));
    }

    #[test]
    fn test_setbit_keeps_ttl() {
        let expire_at = SystemTime::now() + Duration::from_secs(60);
        let storage = MemoryStorage::from_values([("bm", Value::bitmap(vec![]).with_ttl(expire_at))]);

        SetBitCommand.execute(&storage, &["bm", "1", "1"]).unwrap();

        let value = storage.get(&Bytes::from("bm")).unwrap().unwrap();
        assert_eq!(value.ttl(), Some(expire_at));
    }

    #[test]
    fn test_setbit_on_expired_key_starts_fresh() {
        let storage = fixture();

        assert_eq!(
            SetBitCommand.execute(&storage, &["expired_bitmap", "1", "1"]),
            Ok(Reply::integer(0))
        );
        let value = storage.get(&Bytes::from("expired_bitmap")).unwrap().unwrap();
        assert_eq!(value.as_bitmap().unwrap().words(), &[0b10]);
        assert_eq!(value.ttl(), None);
    }

    #[test]
    fn test_setbit_errors() {
        let storage = fixture();
        let cmd = SetBitCommand;

        assert_eq!(cmd.execute(&storage, &["bm", "1"]), Err(CommandError::WrongArgsNumber));
        assert_eq!(cmd.execute(&storage, &["bm", "-1", "1"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["bm", "+1", "1"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["bm", "4294967296", "1"]), Err(invalid_offset()));
        assert_eq!(cmd.execute(&storage, &["bm", "1", "2"]), Err(CommandError::invalid("invalid value")));
        assert_eq!(cmd.execute(&storage, &["string", "1", "1"]), Err(CommandError::WrongTypeOp));

        // A failed SETBIT leaves the string untouched
        assert_eq!(
            storage.get(&Bytes::from("string")).unwrap(),
            Some(Value::string("string"))
        );
    }

    #[test]
    fn test_bitcount() {
        let storage = fixture();
        let cmd = BitCountCommand;

        assert_eq!(cmd.execute(&storage, &["bitmap_with_big_offset"]), Ok(Reply::integer(2)));
        assert_eq!(cmd.execute(&storage, &["expired_bitmap"]), Ok(Reply::integer(0)));
        assert_eq!(cmd.execute(&storage, &["missing"]), Ok(Reply::integer(0)));
        assert_eq!(cmd.execute(&storage, &["string"]), Err(CommandError::WrongTypeOp));
        assert_eq!(cmd.execute(&storage, &[]), Err(CommandError::WrongArgsNumber));
    }
}

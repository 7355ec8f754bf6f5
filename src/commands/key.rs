//! Key commands (DEL, TYPE, KEYS)

use super::{expect_args, expect_min_args, to_bytes, Command, CommandResult, Reply};
use crate::store::Storage;

/// DEL command - Delete one or more keys
///
/// Syntax: DEL key [key ...]
pub struct DelCommand;

impl Command for DelCommand {
    fn name(&self) -> &'static str {
        "DEL"
    }

    fn help(&self) -> &'static str {
        "Usage: DEL key [key ...]\n\
         Delete the given keys, returning how many existed."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_min_args(args, 1)?;

        let mut deleted = 0;
        for arg in args {
            if storage.delete(&to_bytes(arg))? {
                deleted += 1;
            }
        }

        Ok(Reply::integer(deleted))
    }
}

/// TYPE command - Report the kind of the value at a key
///
/// Syntax: TYPE key
pub struct TypeCommand;

impl Command for TypeCommand {
    fn name(&self) -> &'static str {
        "TYPE"
    }

    fn help(&self) -> &'static str {
        "Usage: TYPE key\n\
         Returns the type of the value stored at key, or none."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;

        let kind = storage
            .get(&to_bytes(args[0]))?
            .map_or("none", |value| value.kind().name());

        Ok(Reply::simple_string(kind))
    }
}

/// KEYS command - Find all keys matching a glob pattern
///
/// Syntax: KEYS pattern
///
/// Supported patterns:
/// - * : any sequence, including empty
/// - ? : any single byte
/// - [abc], [a-z], [^a] : byte classes, optionally negated
/// - \x : the literal x
pub struct KeysCommand;

impl Command for KeysCommand {
    fn name(&self) -> &'static str {
        "KEYS"
    }

    fn help(&self) -> &'static str {
        "Usage: KEYS pattern\n\
         Find all keys matching the given pattern."
    }

    fn execute(&self, storage: &dyn Storage, args: &[&str]) -> CommandResult {
        expect_args(args, 1)?;
        let pattern = args[0].as_bytes();

        let mut keys: Vec<_> = storage
            .keys()?
            .into_iter()
            .filter(|key| glob_match(pattern, key))
            .collect();
        keys.sort();

        Ok(Reply::array(keys))
    }
}

/// Match `text` against a glob `pattern`
///
/// Iterative: on a mismatch it backtracks only to the most recent `*`,
/// so the work is bounded by pattern length times text length.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // (pattern index after the last star, text index that star resumes from)
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if pattern.get(p) == Some(&b'*') {
            p += 1;
            star = Some((p, t));
            continue;
        }

        if p < pattern.len() {
            let (accepted, width) = match_token(&pattern[p..], text[t]);
            if accepted {
                p += width;
                t += 1;
                continue;
            }
        }

        match star {
            Some((resume_p, resume_t)) => {
                p = resume_p;
                t = resume_t + 1;
                star = Some((resume_p, t));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}

/// Test one byte against the token at the head of `pattern`
///
/// Returns whether the byte is accepted and how many pattern bytes the
/// token spans. `pattern` must not start with '*'.
fn match_token(pattern: &[u8], c: u8) -> (bool, usize) {
    match pattern {
        [b'?', ..] => (true, 1),
        [b'[', rest @ ..] => match parse_class(rest) {
            Some((class, negated, after)) => {
                (class_contains(class, c) != negated, pattern.len() - after.len())
            }
            // Unterminated class: '[' is a literal
            None => (c == b'[', 1),
        },
        [b'\\', escaped, ..] => (*escaped == c, 2),
        [p, ..] => (*p == c, 1),
        [] => (false, 0),
    }
}

/// Split a class body off the pattern (the part after '[')
///
/// Returns (class body, negated, pattern after ']').
fn parse_class(pattern: &[u8]) -> Option<(&[u8], bool, &[u8])> {
    let (negated, body) = match pattern.first() {
        Some(b'^') => (true, &pattern[1..]),
        _ => (false, pattern),
    };

    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 2,
            b']' => return Some((&body[..i], negated, &body[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

fn class_contains(class: &[u8], c: u8) -> bool {
    let mut i = 0;
    while i < class.len() {
        let lo = if class[i] == b'\\' && i + 1 < class.len() {
            i += 1;
            class[i]
        } else {
            class[i]
        };

        if i + 2 < class.len() && class[i + 1] == b'-' {
            let hi = class[i + 2];
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            if (lo..=hi).contains(&c) {
                return true;
            }
            i += 3;
        } else {
            if lo == c {
                return true;
            }
            i += 1;
        }
    }
    false
}
